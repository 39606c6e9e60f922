//! Single-shot form element.

use super::callbacks::guarded;
use super::element::{ElementCore, Interactable};
use super::entities::{ComponentId, Timestamp};
use super::errors::CallbackError;
use super::message::Handler;
use super::notification::{InteractionContext, NotificationPayload};
use super::outcome::Outcome;
use crate::ports::outbound::TimeSource;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// Element wrapping exactly one handler, matched by form identity.
///
/// Consumed by the first matching submission: any handler outcome other
/// than `NotProcessed` is reported as `Remove`, and a consumed form answers
/// `NotProcessed` from then on. A failing handler also consumes the form.
pub struct InteractiveForm {
    core: ElementCore,
    form_id: ComponentId,
    handler: Handler,
    consumed: AtomicBool,
}

impl InteractiveForm {
    /// Form with a generated identity.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        Self::with_parts(ElementCore::new(), ComponentId::generate(), Arc::new(handler))
    }

    /// Form answering submissions of `form_id`.
    pub fn with_form_id<F>(form_id: impl Into<ComponentId>, handler: F) -> Self
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        Self::with_parts(ElementCore::new(), form_id.into(), Arc::new(handler))
    }

    /// Form answering submissions of `form_id`, stamped from `time_source`.
    /// Pass the clock the reaper sweeps with.
    pub fn with_time_source<F>(
        time_source: &dyn TimeSource,
        form_id: impl Into<ComponentId>,
        handler: F,
    ) -> Self
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        Self::with_parts(
            ElementCore::with_time_source(time_source),
            form_id.into(),
            Arc::new(handler),
        )
    }

    /// Form answering submissions of `form_id`, created at `created_at`.
    pub fn with_form_id_at<F>(form_id: impl Into<ComponentId>, created_at: Timestamp, handler: F) -> Self
    where
        F: Fn(&InteractionContext) -> Result<Outcome, CallbackError> + Send + Sync + 'static,
    {
        Self::with_parts(ElementCore::stamped_at(created_at), form_id.into(), Arc::new(handler))
    }

    fn with_parts(core: ElementCore, form_id: ComponentId, handler: Handler) -> Self {
        Self {
            core,
            form_id,
            handler,
            consumed: AtomicBool::new(false),
        }
    }

    pub fn form_id(&self) -> &ComponentId {
        &self.form_id
    }

    pub fn is_consumed(&self) -> bool {
        self.consumed.load(Ordering::SeqCst)
    }

    fn matches(&self, ctx: &InteractionContext) -> bool {
        matches!(
            ctx.payload(),
            NotificationPayload::FormSubmit { form_id, .. } if *form_id == self.form_id
        )
    }
}

impl Interactable for InteractiveForm {
    fn core(&self) -> &ElementCore {
        &self.core
    }

    fn targets(&self, ctx: &InteractionContext) -> bool {
        !self.is_consumed() && self.matches(ctx)
    }

    fn handle(&self, ctx: &InteractionContext) -> Outcome {
        if !self.matches(ctx) {
            return Outcome::NotProcessed;
        }
        if self.consumed.swap(true, Ordering::SeqCst) {
            return Outcome::NotProcessed;
        }

        match guarded(|| (self.handler)(ctx)) {
            Ok(Outcome::NotProcessed) => {
                self.consumed.store(false, Ordering::SeqCst);
                Outcome::NotProcessed
            }
            Ok(outcome) => {
                debug!(element_id = %self.core.id(), form_id = %self.form_id, %outcome, "Form consumed");
                Outcome::Remove
            }
            Err(err) => {
                error!(
                    element_id = %self.core.id(),
                    form_id = %self.form_id,
                    error = %err,
                    "Form handler failed"
                );
                Outcome::Remove
            }
        }
    }

    fn variant(&self) -> &'static str {
        "form"
    }
}
