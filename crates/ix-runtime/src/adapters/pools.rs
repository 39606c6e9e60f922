//! Worker pool adapters.
//!
//! | Adapter             | Runs jobs on                          |
//! |---------------------|---------------------------------------|
//! | `InlineWorkerPool`  | the submitting thread                 |
//! | `TokioWorkerPool`   | tokio's blocking thread pool          |
//! | `RayonWorkerPool`   | a dedicated rayon thread pool         |

use crate::errors::RuntimeError;
use ix_core::{Job, PoolError, WorkerPool};
use tokio::runtime::Handle;
use tracing::info;

/// Runs each job synchronously on the caller's thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineWorkerPool;

impl WorkerPool for InlineWorkerPool {
    fn execute(&self, job: Job) -> Result<(), PoolError> {
        job();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}

/// Runs jobs via `spawn_blocking` on a captured tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioWorkerPool {
    handle: Handle,
}

impl TokioWorkerPool {
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Capture the current runtime.
    ///
    /// # Errors
    ///
    /// `NoAsyncRuntime` outside a tokio runtime.
    pub fn current() -> Result<Self, RuntimeError> {
        Handle::try_current()
            .map(Self::new)
            .map_err(|e| RuntimeError::NoAsyncRuntime(e.to_string()))
    }
}

impl WorkerPool for TokioWorkerPool {
    fn execute(&self, job: Job) -> Result<(), PoolError> {
        // Detached: completion is observed through the registry, not the handle.
        drop(self.handle.spawn_blocking(job));
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tokio"
    }
}

/// Runs jobs on a dedicated rayon thread pool.
pub struct RayonWorkerPool {
    pool: rayon::ThreadPool,
}

impl RayonWorkerPool {
    /// Build a pool with `threads` workers (a single thread is valid).
    pub fn new(threads: usize) -> Result<Self, RuntimeError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("ix-dispatch-{i}"))
            .build()
            .map_err(|e| RuntimeError::Pool(PoolError::Rejected(e.to_string())))?;
        info!(threads, "Dispatch thread pool started");
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl WorkerPool for RayonWorkerPool {
    fn execute(&self, job: Job) -> Result<(), PoolError> {
        self.pool.spawn(job);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "rayon"
    }
}

impl std::fmt::Debug for RayonWorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RayonWorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}
