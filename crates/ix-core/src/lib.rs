//! # Interactive Elements: Core
//!
//! Domain model for short-lived interactive elements (buttons, select
//! options, menus, forms) that remote users act upon, and the contract the
//! registry and dispatcher in `ix-runtime` drive.
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture with:
//! - **Domain Layer:** notifications, outcomes, rule chain, callback runner,
//!   element variants
//! - **Ports Layer:** registration API (inbound) and the clock, reply sink
//!   and worker pool the host supplies (outbound)
//!
//! ## Processing an Element
//!
//! ```text
//! InteractionContext
//!        │
//!        ▼
//! ┌────────────────┐  denied   ┌──────────────────┐
//! │   Rule chain   │──────────►│ denial callbacks │──► Ignore
//! └───────┬────────┘           └──────────────────┘
//!         │ granted
//!         ▼
//! ┌────────────────┐  no match
//! │ variant.handle │──────────────────────────────────► NotProcessed
//! └───────┬────────┘
//!         │ match
//!         ▼
//!    handler(s) ──► Remove | Keep
//! ```
//!
//! ## Outcomes
//!
//! | Outcome        | Meaning for the dispatcher                 |
//! |----------------|--------------------------------------------|
//! | `Remove`       | consumed, evict the element, stop scanning |
//! | `Keep`         | consumed, keep the element, stop scanning  |
//! | `NotProcessed` | not addressed to this element, keep going  |
//! | `Ignore`       | access denied, stop scanning               |
//!
//! ## Example
//!
//! ```rust
//! use ix_core::{
//!     Interactable, InteractionContext, InteractionDescriptor, InteractiveMessage, Outcome,
//!     Originator, Rule, UserId,
//! };
//!
//! let message = InteractiveMessage::new().with_rule(Rule::allow_users([UserId(1)]));
//! let confirm = message
//!     .add_interaction(InteractionDescriptor::button(), |_| Ok(Outcome::Remove))
//!     .unwrap();
//!
//! let click = InteractionContext::click(confirm).with_originator(Originator::user(UserId(1)));
//! assert_eq!(message.process(&click), Outcome::Remove);
//! ```

pub mod domain;
pub mod ports;

// Re-export main types
pub use domain::{
    AccessDecision, Callback, CallbackError, CallbackFailure, CallbackReport, CallbackRunner,
    ComponentId, DeniedCallbacks, DescriptorKind, ElementCore, ElementId, GateScope, Handler,
    Interactable, InteractionContext, InteractionDescriptor, InteractionError, InteractionKind,
    InteractiveForm, InteractiveMessage, Membership, NotificationPayload, Originator, Outcome,
    OutcomeAggregation, Reply, RoleId, Rule, RuleVerdict, ScopeId, Timestamp, UserId,
    DEFAULT_EXPIRY, MAX_COMPONENTS_PER_KIND,
};
pub use domain::rules::{decide, evaluate};
pub use ports::{
    ElementDirectory, Job, PoolError, ReplySink, SystemTimeSource, TimeSource, WorkerPool,
};

#[cfg(any(test, feature = "test-utils"))]
pub use ports::ManualTimeSource;
