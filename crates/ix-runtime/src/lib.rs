//! # Interactables Runtime
//!
//! Shared state and background work for interactive elements: the element
//! registry, the first-match dispatcher and the expiry reaper, wrapped by
//! the [`InteractionHub`] service.
//!
//! ## Architecture
//!
//! ```text
//!  transport ──► InteractionHub::submit(ctx)
//!                    │ pre-filter (originator present, not automated)
//!                    ▼
//!              WorkerPool::execute ──► scan(registry, ctx)
//!                                         │ scan lock held
//!                                         ▼
//!                               ┌───────────────────┐
//!                               │  ElementRegistry  │◄── register / list_active
//!                               └───────────────────┘
//!                                         ▲ scan lock held
//!                                         │
//!              tokio interval ──► ExpiryReaper::sweep
//! ```
//!
//! ## Modules
//!
//! | Module       | Contents                                            |
//! |--------------|-----------------------------------------------------|
//! | `registry`   | `ElementRegistry`, the two-lock element list        |
//! | `dispatcher` | `Dispatcher`, `scan`, `DispatchReport`              |
//! | `reaper`     | `ExpiryReaper`, `ReaperHandle`, `SweepReport`       |
//! | `adapters`   | inline, tokio and rayon `WorkerPool` implementations |
//! | `service`    | `InteractionHub` and its builder                    |
//! | `config`     | `HubConfig` with environment overrides              |
//!
//! ## Example
//!
//! ```
//! use ix_core::{InteractionContext, InteractionDescriptor, Originator, Outcome, UserId};
//! use ix_runtime::{InlineWorkerPool, InteractionHub};
//! use std::sync::Arc;
//!
//! let hub = InteractionHub::builder()
//!     .worker_pool(Arc::new(InlineWorkerPool))
//!     .build()
//!     .unwrap();
//!
//! let message = hub.register_element(hub.message());
//! let button = message
//!     .add_interaction(InteractionDescriptor::button(), |_| Ok(Outcome::Remove))
//!     .unwrap();
//!
//! let ctx = InteractionContext::click(button).with_originator(Originator::user(UserId(7)));
//! let report = hub.dispatch_now(&ctx);
//!
//! assert_eq!(report.outcome, Outcome::Remove);
//! assert!(hub.registry().is_empty());
//! ```

pub mod adapters;
pub mod config;
pub mod dispatcher;
pub mod errors;
pub mod reaper;
pub mod registry;
pub mod service;

pub use adapters::{InlineWorkerPool, RayonWorkerPool, TokioWorkerPool};
pub use config::{HubConfig, DEFAULT_SWEEP_INTERVAL};
pub use dispatcher::{scan, DispatchReport, Dispatcher, DropReason, Submission};
pub use errors::RuntimeError;
pub use reaper::{ExpiryReaper, ReaperHandle, SweepReport};
pub use registry::ElementRegistry;
pub use service::{InteractionHub, InteractionHubBuilder};
