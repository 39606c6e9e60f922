//! # Expiry Reaper
//!
//! Periodic sweep evicting expired elements and firing their expiry
//! callbacks. Each sweep is one critical section over the registry:
//! eviction and callback execution both happen while the scan lock is held.
//!
//! The background task is started explicitly ([`ExpiryReaper::spawn`]) and
//! stopped explicitly ([`ReaperHandle::stop`]).

use crate::errors::RuntimeError;
use crate::registry::ElementRegistry;
use ix_core::{CallbackReport, ElementId, TimeSource};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Result of one sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Evicted elements, in registry order.
    pub evicted: Vec<ElementId>,
    /// Expiry callbacks invoked across all evicted elements.
    pub callbacks_invoked: usize,
    /// Expiry callbacks that failed or panicked.
    pub callback_failures: usize,
}

/// Sweeps a registry against a clock.
pub struct ExpiryReaper {
    registry: Arc<ElementRegistry>,
    time_source: Arc<dyn TimeSource>,
}

impl ExpiryReaper {
    pub fn new(registry: Arc<ElementRegistry>, time_source: Arc<dyn TimeSource>) -> Self {
        Self {
            registry,
            time_source,
        }
    }

    /// Run one sweep now.
    pub fn sweep(&self) -> SweepReport {
        let _scan = self.registry.lock_scan();
        let now = self.time_source.now();

        let expired = self.registry.evict_where(|e| e.is_expired(now));
        if expired.is_empty() {
            return SweepReport::default();
        }

        let mut callbacks = CallbackReport::default();
        let mut evicted = Vec::with_capacity(expired.len());
        for element in &expired {
            debug!(element_id = %element.id(), variant = element.variant(), "Element expired");
            callbacks.merge(element.run_expiry_callbacks());
            evicted.push(element.id());
        }

        let report = SweepReport {
            evicted,
            callbacks_invoked: callbacks.invoked,
            callback_failures: callbacks.failures.len(),
        };
        debug!(
            evicted = report.evicted.len(),
            callback_failures = report.callback_failures,
            remaining = self.registry.len(),
            "Expiry sweep complete"
        );
        report
    }

    /// Start sweeping every `interval` on the current tokio runtime.
    ///
    /// The first sweep happens one full `interval` after spawning.
    ///
    /// # Errors
    ///
    /// `NoAsyncRuntime` when called outside a tokio runtime.
    pub fn spawn(self: Arc<Self>, interval: Duration) -> Result<ReaperHandle, RuntimeError> {
        let handle = tokio::runtime::Handle::try_current()
            .map_err(|e| RuntimeError::NoAsyncRuntime(e.to_string()))?;
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let join = handle.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            info!(interval_ms = interval.as_millis() as u64, "Expiry reaper started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let reaper = Arc::clone(&self);
                        if let Err(e) = tokio::task::spawn_blocking(move || reaper.sweep()).await {
                            warn!(error = %e, "Expiry sweep aborted");
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Expiry reaper received shutdown signal");
                        break;
                    }
                }
            }
        });

        Ok(ReaperHandle { shutdown_tx, join })
    }
}

/// Handle to a running reaper task.
#[derive(Debug)]
pub struct ReaperHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ReaperHandle {
    /// Signal the task to stop and wait for it. An in-progress sweep
    /// completes first.
    pub async fn stop(self) -> Result<(), RuntimeError> {
        // Send fails only if the task already exited; join reports why.
        let _ = self.shutdown_tx.send(true);
        self.join
            .await
            .map_err(|e| RuntimeError::ReaperTask(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }
}
