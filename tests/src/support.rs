//! Shared fixtures.

use ix_core::{
    InteractionContext, InteractionError, ManualTimeSource, Membership, Originator, Reply,
    ReplySink, RoleId, ScopeId, Timestamp, UserId,
};
use ix_runtime::{InlineWorkerPool, InteractionHub};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Captures replies instead of sending them anywhere.
#[derive(Default)]
pub struct RecordingSink {
    replies: Mutex<Vec<Reply>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replies(&self) -> Vec<Reply> {
        self.replies.lock().clone()
    }
}

impl ReplySink for RecordingSink {
    fn send(&self, reply: Reply) -> Result<(), InteractionError> {
        self.replies.lock().push(reply);
        Ok(())
    }
}

pub fn user(id: u64) -> Originator {
    Originator::user(UserId(id))
}

pub fn member(id: u64, scope: u64, roles: &[u64]) -> Originator {
    Originator::user(UserId(id)).with_membership(Membership::new(
        ScopeId(scope),
        roles.iter().copied().map(RoleId),
    ))
}

pub fn click_by(component_id: &str, user_id: u64) -> InteractionContext {
    InteractionContext::click(component_id).with_originator(user(user_id))
}

/// Hub running scans inline on a manual clock starting at `start_ms`.
pub fn inline_hub(start_ms: u64) -> (InteractionHub, Arc<ManualTimeSource>) {
    let clock = Arc::new(ManualTimeSource::new(Timestamp::from_millis(start_ms)));
    let hub = InteractionHub::builder()
        .worker_pool(Arc::new(InlineWorkerPool))
        .time_source(clock.clone())
        .build()
        .expect("inline hub");
    (hub, clock)
}

/// Poll `condition` until it holds or `timeout` elapses.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
