//! Runtime error types.

use ix_core::PoolError;
use thiserror::Error;

/// Errors from the registry runtime and hub lifecycle.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// `start_reaper` called while a reaper is already running.
    #[error("expiry reaper is already running")]
    ReaperAlreadyRunning,

    /// The operation needs a tokio runtime and none is current.
    #[error("no tokio runtime available: {0}")]
    NoAsyncRuntime(String),

    /// The worker pool refused a dispatch job.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// A configuration value is malformed or out of range.
    #[error("invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },

    /// The reaper task ended abnormally.
    #[error("reaper task failed: {0}")]
    ReaperTask(String),
}
