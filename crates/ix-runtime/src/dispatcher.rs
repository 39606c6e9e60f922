//! # Dispatcher
//!
//! Routes inbound notifications to registered elements.
//!
//! ## Flow
//!
//! ```text
//! submit(ctx)
//!   │  pre-filter: missing or automated originator → dropped
//!   ▼
//! WorkerPool::execute(job)
//!   │
//!   ▼  (worker thread, scan lock held)
//! for element in registry snapshot (insertion order):
//!     NotProcessed → next element
//!     Ignore       → stop, registry untouched
//!     Keep         → stop, element retained
//!     Remove       → evict element, stop
//! ```
//!
//! At most one element consumes a notification: the first one in
//! insertion order whose outcome is not `NotProcessed`.

use crate::errors::RuntimeError;
use crate::registry::ElementRegistry;
use ix_core::domain::callbacks::panic_message;
use ix_core::{ElementId, InteractionContext, InteractionKind, Outcome, WorkerPool};
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Why a notification was dropped before scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// The transport delivered no originator.
    MissingOriginator,
    /// The originator is an automated sender.
    AutomatedOriginator,
}

/// Result of [`Dispatcher::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Accepted by the worker pool.
    Scheduled,
    /// Filtered out; never reached the registry.
    Dropped(DropReason),
}

/// Result of one first-match scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    pub kind: InteractionKind,
    /// `NotProcessed` when no element consumed the notification.
    pub outcome: Outcome,
    /// The element that stopped the scan, if any.
    pub consumed_by: Option<ElementId>,
    /// Number of elements offered the notification.
    pub offered: usize,
    /// Whether the consuming element was evicted.
    pub evicted: bool,
}

/// Schedules notification processing and runs the registry scan.
pub struct Dispatcher {
    registry: Arc<ElementRegistry>,
    pool: Arc<dyn WorkerPool>,
    drop_automated: bool,
}

impl Dispatcher {
    pub fn new(registry: Arc<ElementRegistry>, pool: Arc<dyn WorkerPool>, drop_automated: bool) -> Self {
        Self {
            registry,
            pool,
            drop_automated,
        }
    }

    /// Pre-filter `ctx` and schedule its scan on the worker pool.
    ///
    /// # Errors
    ///
    /// `RuntimeError::Pool` when the pool refuses the job.
    pub fn submit(&self, ctx: InteractionContext) -> Result<Submission, RuntimeError> {
        if let Some(reason) = self.drop_reason(&ctx) {
            trace!(kind = %ctx.kind(), ?reason, "Notification dropped");
            return Ok(Submission::Dropped(reason));
        }

        let registry = Arc::clone(&self.registry);
        self.pool.execute(Box::new(move || {
            scan(&registry, &ctx);
        }))?;

        Ok(Submission::Scheduled)
    }

    /// Run the scan for `ctx` on the calling thread, skipping the
    /// pre-filter and the worker pool.
    pub fn dispatch_now(&self, ctx: &InteractionContext) -> DispatchReport {
        scan(&self.registry, ctx)
    }

    pub fn pool_name(&self) -> &'static str {
        self.pool.name()
    }

    fn drop_reason(&self, ctx: &InteractionContext) -> Option<DropReason> {
        match ctx.originator_opt() {
            None => Some(DropReason::MissingOriginator),
            Some(o) if o.automated && self.drop_automated => Some(DropReason::AutomatedOriginator),
            Some(_) => None,
        }
    }
}

/// First-match-wins scan over `registry` for `ctx`.
///
/// Holds the registry's scan lock for the whole scan. A panic escaping an
/// element is contained and treated as `Ignore`.
pub fn scan(registry: &ElementRegistry, ctx: &InteractionContext) -> DispatchReport {
    let _scan = registry.lock_scan();
    let elements = registry.snapshot();

    let mut report = DispatchReport {
        kind: ctx.kind(),
        outcome: Outcome::NotProcessed,
        consumed_by: None,
        offered: 0,
        evicted: false,
    };

    for element in &elements {
        report.offered += 1;

        let outcome = match catch_unwind(AssertUnwindSafe(|| element.process(ctx))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                error!(
                    element_id = %element.id(),
                    variant = element.variant(),
                    panic = %panic_message(payload.as_ref()),
                    "Element panicked while processing, stopping scan"
                );
                Outcome::Ignore
            }
        };

        if !outcome.stops_scan() {
            continue;
        }

        report.outcome = outcome;
        report.consumed_by = Some(element.id());
        if outcome.evicts() {
            report.evicted = registry.evict(&element.id());
        }
        break;
    }

    debug!(
        kind = %report.kind,
        outcome = %report.outcome,
        offered = report.offered,
        consumed_by = ?report.consumed_by,
        "Dispatch scan complete"
    );
    report
}
