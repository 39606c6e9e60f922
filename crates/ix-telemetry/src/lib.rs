//! # Interactables Telemetry
//!
//! Structured logging for hosts embedding the interactables runtime.
//! The library crates only emit `tracing` events; this crate installs the
//! subscriber that renders them.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ix_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     init_logging(&TelemetryConfig::from_env()).expect("logging");
//!     // ...
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `IX_LOG_LEVEL` / `RUST_LOG` | `info` | Filter directives |
//! | `IX_JSON_LOGS` | `false` | One JSON object per line |
//! | `IX_SERVICE_NAME` | `interactables` | `service` field on the startup event |
//!
//! ## Event Fields
//!
//! Runtime events carry `element_id`, `variant`, `kind` and `outcome`
//! fields where they apply, so JSON output can be filtered per element.

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, try_build_filter};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Invalid log filter {directives:?}: {reason}")]
    Filter { directives: String, reason: String },

    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}
