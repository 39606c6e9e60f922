//! # Interaction Hub
//!
//! Service facade owning one registry, its dispatcher and its reaper.
//!
//! ## Lifecycle
//!
//! 1. `InteractionHub::builder()...build()` creates the registry and
//!    dispatcher; nothing runs in the background yet.
//! 2. `start_reaper()` spawns the sweep task on the current tokio runtime.
//! 3. `shutdown().await` stops the reaper. Registered elements stay in
//!    place and can still be dispatched or swept manually.

use crate::adapters::RayonWorkerPool;
use crate::config::HubConfig;
use crate::dispatcher::{DispatchReport, Dispatcher, Submission};
use crate::errors::RuntimeError;
use crate::reaper::{ExpiryReaper, ReaperHandle, SweepReport};
use crate::registry::ElementRegistry;
use ix_core::{
    CallbackError, ComponentId, ElementDirectory, ElementId, Interactable, InteractionContext,
    InteractiveForm, InteractiveMessage, Outcome, SystemTimeSource, TimeSource, WorkerPool,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;

/// Builder for [`InteractionHub`].
pub struct InteractionHubBuilder {
    config: HubConfig,
    pool: Option<Arc<dyn WorkerPool>>,
    time_source: Option<Arc<dyn TimeSource>>,
}

impl InteractionHubBuilder {
    pub fn config(mut self, config: HubConfig) -> Self {
        self.config = config;
        self
    }

    /// Worker pool for dispatch scans. Defaults to a rayon pool sized by
    /// `HubConfig::worker_threads`.
    pub fn worker_pool(mut self, pool: Arc<dyn WorkerPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Clock for expiry checks and hub-created elements. Defaults to the
    /// system clock.
    pub fn time_source(mut self, time_source: Arc<dyn TimeSource>) -> Self {
        self.time_source = Some(time_source);
        self
    }

    pub fn build(self) -> Result<InteractionHub, RuntimeError> {
        self.config.validate()?;

        let pool = match self.pool {
            Some(pool) => pool,
            None => Arc::new(RayonWorkerPool::new(self.config.worker_threads)?),
        };
        let time_source = self
            .time_source
            .unwrap_or_else(|| Arc::new(SystemTimeSource));

        let registry = Arc::new(ElementRegistry::new());
        let dispatcher = Dispatcher::new(
            Arc::clone(&registry),
            pool,
            self.config.drop_automated,
        );
        let reaper = Arc::new(ExpiryReaper::new(
            Arc::clone(&registry),
            Arc::clone(&time_source),
        ));

        info!(
            pool = dispatcher.pool_name(),
            sweep_interval_ms = self.config.sweep_interval.as_millis() as u64,
            drop_automated = self.config.drop_automated,
            "Interaction hub created"
        );

        Ok(InteractionHub {
            config: self.config,
            registry,
            dispatcher,
            reaper,
            reaper_handle: Mutex::new(None),
            time_source,
        })
    }
}

/// Registry service: registration, dispatch and expiry for one set of
/// elements.
pub struct InteractionHub {
    config: HubConfig,
    registry: Arc<ElementRegistry>,
    dispatcher: Dispatcher,
    reaper: Arc<ExpiryReaper>,
    reaper_handle: Mutex<Option<ReaperHandle>>,
    time_source: Arc<dyn TimeSource>,
}

impl InteractionHub {
    pub fn builder() -> InteractionHubBuilder {
        InteractionHubBuilder {
            config: HubConfig::default(),
            pool: None,
            time_source: None,
        }
    }

    /// Hub with default configuration and the default rayon pool.
    pub fn new() -> Result<Self, RuntimeError> {
        Self::builder().build()
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<ElementRegistry> {
        &self.registry
    }

    /// Clock used for expiry checks and hub-created elements.
    pub fn time_source(&self) -> &Arc<dyn TimeSource> {
        &self.time_source
    }

    /// A message element stamped by the hub's clock and using the
    /// configured aggregation policy.
    pub fn message(&self) -> InteractiveMessage {
        InteractiveMessage::with_time_source(self.time_source.as_ref())
            .with_aggregation(self.config.aggregation)
    }

    /// A form element answering `form_id`, stamped by the hub's clock.
    pub fn form<F>(&self, form_id: impl Into<ComponentId>, handler: F) -> InteractiveForm
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        InteractiveForm::with_time_source(self.time_source.as_ref(), form_id, handler)
    }

    /// Register `element`, keeping a typed handle for later mutation.
    pub fn register_element<E>(&self, element: E) -> Arc<E>
    where
        E: Interactable + 'static,
    {
        let element = Arc::new(element);
        self.registry.add(element.clone());
        element
    }

    /// A closure that registers `element` when invoked, for hosts that
    /// register only after the outbound send has completed.
    pub fn register_on_completion(
        &self,
        element: Arc<dyn Interactable>,
    ) -> impl FnOnce() -> ElementId + Send + 'static {
        let registry = Arc::clone(&self.registry);
        move || registry.add(element)
    }

    /// Pre-filter and schedule `ctx` on the worker pool.
    pub fn submit(&self, ctx: InteractionContext) -> Result<Submission, RuntimeError> {
        self.dispatcher.submit(ctx)
    }

    /// Scan for `ctx` on the calling thread.
    pub fn dispatch_now(&self, ctx: &InteractionContext) -> DispatchReport {
        self.dispatcher.dispatch_now(ctx)
    }

    /// Run one expiry sweep on the calling thread.
    pub fn sweep_now(&self) -> SweepReport {
        self.reaper.sweep()
    }

    /// Spawn the periodic reaper on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// - `ReaperAlreadyRunning` if started twice without `shutdown`
    /// - `NoAsyncRuntime` outside a tokio runtime
    pub fn start_reaper(&self) -> Result<(), RuntimeError> {
        let mut slot = self.reaper_handle.lock();
        if slot.as_ref().is_some_and(|h| !h.is_finished()) {
            return Err(RuntimeError::ReaperAlreadyRunning);
        }

        let handle = Arc::clone(&self.reaper).spawn(self.config.sweep_interval)?;
        *slot = Some(handle);
        Ok(())
    }

    pub fn is_reaper_running(&self) -> bool {
        self.reaper_handle
            .lock()
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Stop the reaper if running. Idempotent.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let handle = self.reaper_handle.lock().take();
        match handle {
            Some(handle) => {
                info!("Stopping interaction hub");
                handle.stop().await
            }
            None => Ok(()),
        }
    }
}

impl ElementDirectory for InteractionHub {
    fn register(&self, element: Arc<dyn Interactable>) -> ElementId {
        self.registry.add(element)
    }

    #[allow(deprecated)]
    fn force_remove(&self, id: &ElementId) -> bool {
        self.registry.remove_unsafe(id)
    }

    fn list_active(&self) -> Vec<Arc<dyn Interactable>> {
        self.registry.snapshot()
    }
}
