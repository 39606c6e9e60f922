//! # Adapters
//!
//! Concrete [`WorkerPool`](ix_core::WorkerPool) implementations.

pub mod pools;

pub use pools::{InlineWorkerPool, RayonWorkerPool, TokioWorkerPool};
