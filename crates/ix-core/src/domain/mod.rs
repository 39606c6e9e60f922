//! # Domain Layer
//!
//! Pure interaction logic: notifications, outcomes, the rule chain, the
//! callback runner and the element variants. No async runtime, no I/O.

pub mod callbacks;
pub mod element;
pub mod entities;
pub mod errors;
pub mod form;
pub mod message;
pub mod notification;
pub mod outcome;
pub mod rules;

pub use callbacks::{Callback, CallbackFailure, CallbackReport, CallbackRunner, DeniedCallbacks};
pub use element::{ElementCore, GateScope, Interactable, DEFAULT_EXPIRY};
pub use entities::{
    ComponentId, ElementId, Membership, Originator, RoleId, ScopeId, Timestamp, UserId,
};
pub use errors::{CallbackError, InteractionError, MAX_COMPONENTS_PER_KIND};
pub use form::InteractiveForm;
pub use message::{Handler, InteractionDescriptor, InteractiveMessage};
pub use notification::{
    DescriptorKind, InteractionContext, InteractionKind, NotificationPayload, Reply,
};
pub use outcome::{Outcome, OutcomeAggregation, RuleVerdict};
pub use rules::{AccessDecision, Rule};
