//! Error types for the interaction domain.
//!
//! Two families:
//! - [`InteractionError`]: caller misuse reported to the immediate caller
//!   (wrong notification capability, invalid descriptor set, reply failures).
//! - [`CallbackError`]: the explicit failure value of a rule, handler,
//!   expiry or denial callback. Never propagated past the rule chain or
//!   callback runner; collected and logged there instead.

use super::entities::ComponentId;
use super::notification::{DescriptorKind, InteractionKind};
use thiserror::Error;

/// Maximum number of buttons (and, separately, of select options) one
/// message-style element may declare.
pub const MAX_COMPONENTS_PER_KIND: usize = 25;

/// Errors surfaced to the caller of a domain operation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    /// The notification does not carry the requested capability.
    #[error("{kind} notification has no {capability}")]
    StateError {
        capability: &'static str,
        kind: InteractionKind,
    },

    /// The notification was delivered without an originator.
    #[error("notification has no originator")]
    MissingOriginator,

    /// A message cannot hold buttons and select options at the same time.
    #[error("cannot add {adding} interaction: element already holds {existing} interactions")]
    MixedComponents {
        adding: DescriptorKind,
        existing: DescriptorKind,
    },

    /// Per-kind component limit reached.
    #[error("cannot add {kind} interaction: limit of {limit} reached")]
    TooManyComponents { kind: DescriptorKind, limit: usize },

    /// Component identity tokens must be unique within one element.
    #[error("cannot add interaction: component {0} already registered on this element")]
    DuplicateComponent(ComponentId),

    /// The notification carries no reply sink.
    #[error("notification has no reply sink")]
    ReplyUnavailable,

    /// The reply sink rejected the reply.
    #[error("reply failed: {0}")]
    ReplyFailed(String),
}

/// Explicit failure returned by a rule, handler or callback.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CallbackError {
    /// The callback returned an error.
    #[error("callback failed: {message}")]
    Failed { message: String },

    /// The callback panicked; the panic was contained.
    #[error("callback panicked: {message}")]
    Panicked { message: String },
}

impl CallbackError {
    pub fn failed(message: impl Into<String>) -> Self {
        CallbackError::Failed {
            message: message.into(),
        }
    }
}

impl From<InteractionError> for CallbackError {
    fn from(err: InteractionError) -> Self {
        CallbackError::failed(err.to_string())
    }
}
