//! # Ports Layer
//!
//! - `inbound`: the registration API hosts drive.
//! - `outbound`: what the engine requires from its host (clock, reply
//!   delivery, worker scheduling).

pub mod inbound;
pub mod outbound;

pub use inbound::ElementDirectory;
pub use outbound::{Job, PoolError, ReplySink, SystemTimeSource, TimeSource, WorkerPool};

#[cfg(any(test, feature = "test-utils"))]
pub use outbound::ManualTimeSource;
