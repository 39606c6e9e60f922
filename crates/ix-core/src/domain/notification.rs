//! Inbound notifications and the context handed to rules and handlers.

use super::entities::{ComponentId, Originator};
use super::errors::InteractionError;
use crate::ports::outbound::ReplySink;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Kind tag of an inbound notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    /// A button was clicked.
    Click,
    /// A string menu was submitted with zero or more selected values.
    MenuSubmit,
    /// An entity menu was submitted with zero or more selected entities.
    EntitySubmit,
    /// A form was submitted.
    FormSubmit,
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InteractionKind::Click => "click",
            InteractionKind::MenuSubmit => "menu-submit",
            InteractionKind::EntitySubmit => "entity-submit",
            InteractionKind::FormSubmit => "form-submit",
        };
        f.write_str(s)
    }
}

/// Kind of an interaction descriptor held by a message-style element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptorKind {
    /// Matches a click by component identity.
    Button,
    /// Matches a menu submission whose selected values contain the token.
    SelectOption,
    /// Matches a menu submission by menu identity.
    SelectMenu,
    /// Matches an entity-menu submission by menu identity.
    EntityMenu,
}

impl DescriptorKind {
    /// The notification kind this descriptor can ever apply to.
    pub fn notification_kind(&self) -> InteractionKind {
        match self {
            DescriptorKind::Button => InteractionKind::Click,
            DescriptorKind::SelectOption | DescriptorKind::SelectMenu => {
                InteractionKind::MenuSubmit
            }
            DescriptorKind::EntityMenu => InteractionKind::EntitySubmit,
        }
    }
}

impl fmt::Display for DescriptorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DescriptorKind::Button => "button",
            DescriptorKind::SelectOption => "select-option",
            DescriptorKind::SelectMenu => "select-menu",
            DescriptorKind::EntityMenu => "entity-menu",
        };
        f.write_str(s)
    }
}

/// Kind-specific payload of an inbound notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotificationPayload {
    Click {
        component_id: ComponentId,
    },
    MenuSubmit {
        component_id: ComponentId,
        values: Vec<String>,
    },
    EntitySubmit {
        component_id: ComponentId,
        entity_ids: Vec<u64>,
    },
    FormSubmit {
        form_id: ComponentId,
        fields: BTreeMap<String, String>,
    },
}

impl NotificationPayload {
    pub fn kind(&self) -> InteractionKind {
        match self {
            NotificationPayload::Click { .. } => InteractionKind::Click,
            NotificationPayload::MenuSubmit { .. } => InteractionKind::MenuSubmit,
            NotificationPayload::EntitySubmit { .. } => InteractionKind::EntitySubmit,
            NotificationPayload::FormSubmit { .. } => InteractionKind::FormSubmit,
        }
    }
}

/// A reply sent back to the originator through the notification's sink.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub content: String,
    /// Visible only to the originator.
    pub ephemeral: bool,
}

impl Reply {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: false,
        }
    }

    pub fn ephemeral(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ephemeral: true,
        }
    }
}

/// One inbound notification as seen by rules, handlers and callbacks.
///
/// Cheap to clone; the reply sink is shared.
#[derive(Clone)]
pub struct InteractionContext {
    originator: Option<Originator>,
    payload: NotificationPayload,
    reply_sink: Option<Arc<dyn ReplySink>>,
}

impl InteractionContext {
    pub fn new(payload: NotificationPayload) -> Self {
        Self {
            originator: None,
            payload,
            reply_sink: None,
        }
    }

    /// Click on `component_id`.
    pub fn click(component_id: impl Into<ComponentId>) -> Self {
        Self::new(NotificationPayload::Click {
            component_id: component_id.into(),
        })
    }

    /// Submission of the string menu `component_id` with selected `values`.
    pub fn menu_submit<I, S>(component_id: impl Into<ComponentId>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(NotificationPayload::MenuSubmit {
            component_id: component_id.into(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Submission of the entity menu `component_id`.
    pub fn entity_submit(
        component_id: impl Into<ComponentId>,
        entity_ids: impl IntoIterator<Item = u64>,
    ) -> Self {
        Self::new(NotificationPayload::EntitySubmit {
            component_id: component_id.into(),
            entity_ids: entity_ids.into_iter().collect(),
        })
    }

    /// Submission of the form `form_id` with its field values.
    pub fn form_submit<I, K, V>(form_id: impl Into<ComponentId>, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(NotificationPayload::FormSubmit {
            form_id: form_id.into(),
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        })
    }

    pub fn with_originator(mut self, originator: Originator) -> Self {
        self.originator = Some(originator);
        self
    }

    pub fn with_reply_sink(mut self, sink: Arc<dyn ReplySink>) -> Self {
        self.reply_sink = Some(sink);
        self
    }

    pub fn kind(&self) -> InteractionKind {
        self.payload.kind()
    }

    pub fn payload(&self) -> &NotificationPayload {
        &self.payload
    }

    /// The sender, if the transport supplied one.
    pub fn originator_opt(&self) -> Option<&Originator> {
        self.originator.as_ref()
    }

    /// The sender.
    ///
    /// # Errors
    ///
    /// `MissingOriginator` when the notification was delivered without one.
    pub fn originator(&self) -> Result<&Originator, InteractionError> {
        self.originator
            .as_ref()
            .ok_or(InteractionError::MissingOriginator)
    }

    /// Identity of the clicked button or submitted menu.
    ///
    /// # Errors
    ///
    /// `StateError` for form submissions.
    pub fn component_id(&self) -> Result<&ComponentId, InteractionError> {
        match &self.payload {
            NotificationPayload::Click { component_id }
            | NotificationPayload::MenuSubmit { component_id, .. }
            | NotificationPayload::EntitySubmit { component_id, .. } => Ok(component_id),
            NotificationPayload::FormSubmit { .. } => Err(self.missing("component identity")),
        }
    }

    /// Values selected in a string menu submission.
    pub fn submitted_values(&self) -> Result<&[String], InteractionError> {
        match &self.payload {
            NotificationPayload::MenuSubmit { values, .. } => Ok(values),
            _ => Err(self.missing("submitted values")),
        }
    }

    /// Entities selected in an entity menu submission.
    pub fn entity_ids(&self) -> Result<&[u64], InteractionError> {
        match &self.payload {
            NotificationPayload::EntitySubmit { entity_ids, .. } => Ok(entity_ids),
            _ => Err(self.missing("selected entities")),
        }
    }

    /// Identity of the submitted form.
    pub fn form_id(&self) -> Result<&ComponentId, InteractionError> {
        match &self.payload {
            NotificationPayload::FormSubmit { form_id, .. } => Ok(form_id),
            _ => Err(self.missing("form identity")),
        }
    }

    /// Value of one submitted form field, `None` when the field is absent.
    pub fn form_field(&self, name: &str) -> Result<Option<&str>, InteractionError> {
        match &self.payload {
            NotificationPayload::FormSubmit { fields, .. } => {
                Ok(fields.get(name).map(String::as_str))
            }
            _ => Err(self.missing("form fields")),
        }
    }

    /// Answer the originator through the notification's reply sink.
    pub fn reply(&self, reply: Reply) -> Result<(), InteractionError> {
        let sink = self
            .reply_sink
            .as_ref()
            .ok_or(InteractionError::ReplyUnavailable)?;
        sink.send(reply)
    }

    pub fn has_reply_sink(&self) -> bool {
        self.reply_sink.is_some()
    }

    fn missing(&self, capability: &'static str) -> InteractionError {
        InteractionError::StateError {
            capability,
            kind: self.kind(),
        }
    }
}

impl fmt::Debug for InteractionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InteractionContext")
            .field("originator", &self.originator)
            .field("payload", &self.payload)
            .field("reply_sink", &self.reply_sink.is_some())
            .finish()
    }
}
