//! # Driven Ports (Outbound SPI)
//!
//! Interfaces the host application provides to the engine.

use crate::domain::errors::InteractionError;
use crate::domain::notification::Reply;
use crate::domain::Timestamp;
use thiserror::Error;

/// Abstract clock used for element creation stamps and expiry checks.
///
/// Enables deterministic testing by injecting a controllable time source.
pub trait TimeSource: Send + Sync {
    /// Current time in milliseconds since the epoch.
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        let millis = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Timestamp::from_millis(millis)
    }
}

/// Manually driven time source for tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct ManualTimeSource {
    millis: std::sync::atomic::AtomicU64,
}

#[cfg(any(test, feature = "test-utils"))]
impl ManualTimeSource {
    pub fn new(start: Timestamp) -> Self {
        Self {
            millis: std::sync::atomic::AtomicU64::new(start.as_millis()),
        }
    }

    pub fn advance(&self, duration: std::time::Duration) {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self.millis
            .fetch_add(millis, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn set(&self, at: Timestamp) {
        self.millis
            .store(at.as_millis(), std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl TimeSource for ManualTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.millis.load(std::sync::atomic::Ordering::SeqCst))
    }
}

/// Outbound reply/acknowledgement capability attached to a notification.
///
/// Owned by the transport layer; the engine only forwards replies built by
/// handlers and denial callbacks.
pub trait ReplySink: Send + Sync {
    /// Deliver `reply` to the originator of the notification.
    fn send(&self, reply: Reply) -> Result<(), InteractionError>;
}

/// Unit of work scheduled on a [`WorkerPool`].
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Errors from scheduling work.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The pool no longer accepts work.
    #[error("worker pool is closed")]
    Closed,

    /// The pool refused the job.
    #[error("worker pool rejected job: {0}")]
    Rejected(String),
}

/// Executor that runs dispatch work off the notification-delivering thread.
///
/// Pool size is the implementor's concern; a single-threaded pool is valid.
pub trait WorkerPool: Send + Sync {
    /// Schedule `job`. Returns once the job is accepted, not once it ran.
    fn execute(&self, job: Job) -> Result<(), PoolError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}
