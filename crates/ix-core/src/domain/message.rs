//! Message-style element: a set of addressable components, each with its
//! own handler.

use super::callbacks::guarded;
use super::element::{ElementCore, Interactable};
use super::entities::{ComponentId, Timestamp};
use super::errors::{CallbackError, InteractionError, MAX_COMPONENTS_PER_KIND};
use super::notification::{DescriptorKind, InteractionContext, NotificationPayload};
use super::outcome::{Outcome, OutcomeAggregation};
use crate::ports::outbound::TimeSource;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error};

/// Handler invoked for a matching notification.
pub type Handler = Arc<dyn Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync>;

/// One addressable component of a message-style element.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct InteractionDescriptor {
    kind: DescriptorKind,
    component_id: ComponentId,
}

impl InteractionDescriptor {
    pub fn new(kind: DescriptorKind, component_id: impl Into<ComponentId>) -> Self {
        Self {
            kind,
            component_id: component_id.into(),
        }
    }

    /// Button with a generated identity.
    pub fn button() -> Self {
        Self::new(DescriptorKind::Button, ComponentId::generate())
    }

    /// Select option with a generated value token.
    pub fn select_option() -> Self {
        Self::new(DescriptorKind::SelectOption, ComponentId::generate())
    }

    /// String menu with a generated identity.
    pub fn select_menu() -> Self {
        Self::new(DescriptorKind::SelectMenu, ComponentId::generate())
    }

    /// Entity menu with a generated identity.
    pub fn entity_menu() -> Self {
        Self::new(DescriptorKind::EntityMenu, ComponentId::generate())
    }

    pub fn kind(&self) -> DescriptorKind {
        self.kind
    }

    pub fn component_id(&self) -> &ComponentId {
        &self.component_id
    }

    /// Whether `ctx` addresses this descriptor.
    ///
    /// Identity equality for buttons and menus; membership in the
    /// submitted value set for select options.
    pub fn is_applicable(&self, ctx: &InteractionContext) -> bool {
        match (self.kind, ctx.payload()) {
            (DescriptorKind::Button, NotificationPayload::Click { component_id }) => {
                *component_id == self.component_id
            }
            (DescriptorKind::SelectOption, NotificationPayload::MenuSubmit { values, .. }) => {
                values.iter().any(|v| v == self.component_id.as_str())
            }
            (DescriptorKind::SelectMenu, NotificationPayload::MenuSubmit { component_id, .. })
            | (DescriptorKind::EntityMenu, NotificationPayload::EntitySubmit { component_id, .. }) => {
                *component_id == self.component_id
            }
            _ => false,
        }
    }
}

#[derive(Clone)]
struct Entry {
    descriptor: InteractionDescriptor,
    handler: Handler,
}

/// Element holding an ordered set of descriptors and their handlers.
///
/// A notification may match several descriptors (e.g. several options
/// selected in one submission). All matching handlers run in insertion
/// order; their outcomes are combined by the configured
/// [`OutcomeAggregation`]. A failing or panicking handler counts as `Keep`.
pub struct InteractiveMessage {
    core: ElementCore,
    aggregation: OutcomeAggregation,
    entries: Mutex<Vec<Entry>>,
}

impl InteractiveMessage {
    pub fn new() -> Self {
        Self::with_core(ElementCore::new())
    }

    pub fn with_time_source(time_source: &dyn TimeSource) -> Self {
        Self::with_core(ElementCore::with_time_source(time_source))
    }

    pub fn stamped_at(created_at: Timestamp) -> Self {
        Self::with_core(ElementCore::stamped_at(created_at))
    }

    fn with_core(core: ElementCore) -> Self {
        Self {
            core,
            aggregation: OutcomeAggregation::default(),
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_aggregation(mut self, aggregation: OutcomeAggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Builder form of [`add_interaction`](Self::add_interaction).
    pub fn with_interaction<F>(
        self,
        descriptor: InteractionDescriptor,
        handler: F,
    ) -> Result<Self, InteractionError>
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        self.add_interaction(descriptor, handler)?;
        Ok(self)
    }

    /// Attach `handler` to `descriptor`, returning the descriptor's identity.
    ///
    /// # Errors
    ///
    /// - `DuplicateComponent` if the identity is already used on this element
    /// - `MixedComponents` when combining buttons with select options
    /// - `TooManyComponents` past 25 buttons or 25 select options
    pub fn add_interaction<F>(
        &self,
        descriptor: InteractionDescriptor,
        handler: F,
    ) -> Result<ComponentId, InteractionError>
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        let mut entries = self.entries.lock();
        validate(&entries, &descriptor)?;

        let component_id = descriptor.component_id.clone();
        debug!(
            element_id = %self.core.id(),
            kind = %descriptor.kind,
            component_id = %component_id,
            "Interaction added"
        );
        entries.push(Entry {
            descriptor,
            handler: Arc::new(handler),
        });
        Ok(component_id)
    }

    /// Detach the descriptor with `component_id`. Returns whether it existed.
    pub fn remove_interaction(&self, component_id: &ComponentId) -> bool {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|e| e.descriptor.component_id != *component_id);
        entries.len() != before
    }

    /// Descriptors in insertion order.
    pub fn descriptors(&self) -> Vec<InteractionDescriptor> {
        self.entries
            .lock()
            .iter()
            .map(|e| e.descriptor.clone())
            .collect()
    }

    pub fn aggregation(&self) -> OutcomeAggregation {
        self.aggregation
    }
}

impl Default for InteractiveMessage {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(entries: &[Entry], descriptor: &InteractionDescriptor) -> Result<(), InteractionError> {
    if entries
        .iter()
        .any(|e| e.descriptor.component_id == descriptor.component_id)
    {
        return Err(InteractionError::DuplicateComponent(
            descriptor.component_id.clone(),
        ));
    }

    let count = |kind: DescriptorKind| entries.iter().filter(|e| e.descriptor.kind == kind).count();
    let buttons = count(DescriptorKind::Button);
    let options = count(DescriptorKind::SelectOption);

    match descriptor.kind {
        DescriptorKind::Button if options > 0 => Err(InteractionError::MixedComponents {
            adding: DescriptorKind::Button,
            existing: DescriptorKind::SelectOption,
        }),
        DescriptorKind::SelectOption if buttons > 0 => Err(InteractionError::MixedComponents {
            adding: DescriptorKind::SelectOption,
            existing: DescriptorKind::Button,
        }),
        DescriptorKind::Button if buttons >= MAX_COMPONENTS_PER_KIND => {
            Err(InteractionError::TooManyComponents {
                kind: DescriptorKind::Button,
                limit: MAX_COMPONENTS_PER_KIND,
            })
        }
        DescriptorKind::SelectOption if options >= MAX_COMPONENTS_PER_KIND => {
            Err(InteractionError::TooManyComponents {
                kind: DescriptorKind::SelectOption,
                limit: MAX_COMPONENTS_PER_KIND,
            })
        }
        _ => Ok(()),
    }
}

impl Interactable for InteractiveMessage {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn targets(&self, ctx: &InteractionContext) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.descriptor.is_applicable(ctx))
    }

    fn handle(&self, ctx: &InteractionContext) -> Outcome {
        // Snapshot: handlers may add or remove interactions on this element.
        let entries: Vec<Entry> = self.entries.lock().clone();

        let mut aggregate = None;
        for entry in entries.iter().filter(|e| e.descriptor.is_applicable(ctx)) {
            let outcome = match guarded(|| (entry.handler)(ctx)) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(
                        element_id = %self.core.id(),
                        component_id = %entry.descriptor.component_id,
                        error = %err,
                        "Interaction handler failed"
                    );
                    Outcome::Keep
                }
            };
            aggregate = Some(self.aggregation.combine(aggregate, outcome));
        }

        aggregate.unwrap_or(Outcome::NotProcessed)
    }

    fn variant(&self) -> &'static str {
        "message"
    }
}
