//! # Interactables Test Suite
//!
//! Unified test crate for cross-crate behaviour.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Fixtures shared by every scenario
//! └── integration/
//!     ├── access_control.rs   # Rule chains and denial callbacks
//!     ├── dispatch.rs         # First-match scans and aggregation
//!     ├── expiry.rs           # Reaper boundaries and lifecycle
//!     ├── forms.rs            # Single-shot form elements
//!     ├── concurrency.rs      # Parallel submission through real pools
//!     └── logging.rs          # Runtime under an installed subscriber
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ix-tests
//!
//! # By category
//! cargo test -p ix-tests integration::dispatch::
//!
//! # Benchmarks
//! cargo bench -p ix-tests
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod support;
