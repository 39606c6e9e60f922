//! # Interactive Element
//!
//! [`ElementCore`] carries the state every element shares: identity,
//! creation stamp, mutable expiry, and the independently guarded rule and
//! callback lists. [`Interactable`] is the contract the registry and
//! dispatcher drive; concrete variants implement [`Interactable::handle`]
//! and inherit the access gate from [`Interactable::process`].

use super::callbacks::{Callback, CallbackReport, CallbackRunner};
use super::entities::{ElementId, Timestamp};
use super::errors::CallbackError;
use super::notification::InteractionContext;
use super::outcome::Outcome;
use super::rules::{self, AccessDecision, Rule};
use crate::ports::outbound::{SystemTimeSource, TimeSource};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default lifetime of an element.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(5 * 60);

/// Which notifications pass through an element's access gate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GateScope {
    /// Every notification offered to the element is checked against its
    /// rules; a denial stops the dispatcher's scan.
    #[default]
    Every,
    /// Only notifications the element targets are checked; everything
    /// else is answered with `NotProcessed` before the rules run.
    Targeted,
}

/// State shared by every element variant.
pub struct ElementCore {
    id: ElementId,
    created_at: Timestamp,
    expiry_millis: AtomicU64,
    gate_scope: AtomicU8,
    rules: Mutex<Vec<Rule>>,
    expiry_callbacks: Mutex<Vec<Callback<()>>>,
    denied_callbacks: Mutex<Vec<Callback<InteractionContext>>>,
}

impl ElementCore {
    /// Create with a fresh id, stamped with the current wall-clock time.
    pub fn new() -> Self {
        Self::stamped_at(SystemTimeSource.now())
    }

    /// Create with a fresh id, stamped from `time_source`.
    pub fn with_time_source(time_source: &dyn TimeSource) -> Self {
        Self::stamped_at(time_source.now())
    }

    /// Create with a fresh id and an explicit creation stamp.
    pub fn stamped_at(created_at: Timestamp) -> Self {
        Self {
            id: ElementId::generate(),
            created_at,
            expiry_millis: AtomicU64::new(duration_millis(DEFAULT_EXPIRY)),
            gate_scope: AtomicU8::new(0),
            rules: Mutex::new(Vec::new()),
            expiry_callbacks: Mutex::new(Vec::new()),
            denied_callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn expiry(&self) -> Duration {
        Duration::from_millis(self.expiry_millis.load(Ordering::SeqCst))
    }

    /// Change the lifetime. Takes effect immediately: expiry is always
    /// measured from the creation stamp.
    pub fn set_expiry(&self, expiry: Duration) {
        self.expiry_millis
            .store(duration_millis(expiry), Ordering::SeqCst);
    }

    /// `now - created_at >= expiry`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now.elapsed_since(self.created_at) >= self.expiry()
    }

    pub fn gate_scope(&self) -> GateScope {
        match self.gate_scope.load(Ordering::SeqCst) {
            0 => GateScope::Every,
            _ => GateScope::Targeted,
        }
    }

    pub fn set_gate_scope(&self, scope: GateScope) {
        let raw = match scope {
            GateScope::Every => 0,
            GateScope::Targeted => 1,
        };
        self.gate_scope.store(raw, Ordering::SeqCst);
    }

    pub fn add_rule(&self, rule: Rule) {
        self.rules.lock().push(rule);
    }

    pub fn clear_rules(&self) {
        self.rules.lock().clear();
    }

    /// Snapshot of the rule chain in evaluation order.
    pub fn rules(&self) -> Vec<Rule> {
        self.rules.lock().clone()
    }

    pub fn add_expiry_callback(&self, callback: Callback<()>) {
        self.expiry_callbacks.lock().push(callback);
    }

    pub fn clear_expiry_callbacks(&self) {
        self.expiry_callbacks.lock().clear();
    }

    pub fn add_denied_callback(&self, callback: Callback<InteractionContext>) {
        self.denied_callbacks.lock().push(callback);
    }

    pub fn clear_denied_callbacks(&self) {
        self.denied_callbacks.lock().clear();
    }

    /// Run the rule chain against `ctx`.
    ///
    /// Evaluates a snapshot, so rules may mutate this element's lists.
    pub fn authorize(&self, ctx: &InteractionContext) -> AccessDecision {
        let rules = self.rules();
        rules::decide(&rules, ctx)
    }

    pub fn can_interact(&self, ctx: &InteractionContext) -> bool {
        self.authorize(ctx).is_granted()
    }

    /// Gate `ctx`; on refusal run the denial callbacks and return `false`.
    pub fn admit(&self, ctx: &InteractionContext) -> bool {
        let decision = self.authorize(ctx);
        if decision.is_granted() {
            return true;
        }

        debug!(element_id = %self.id, ?decision, "Interaction denied");
        self.run_denied_callbacks(ctx);
        false
    }

    pub fn run_denied_callbacks(&self, ctx: &InteractionContext) -> CallbackReport {
        let callbacks = self.denied_callbacks.lock().clone();
        CallbackRunner::run_all("denied", &callbacks, ctx)
    }

    pub fn run_expiry_callbacks(&self) -> CallbackReport {
        let callbacks = self.expiry_callbacks.lock().clone();
        CallbackRunner::run_all("expiry", &callbacks, &())
    }
}

impl Default for ElementCore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ElementCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementCore")
            .field("id", &self.id)
            .field("created_at", &self.created_at)
            .field("expiry", &self.expiry())
            .field("rules", &self.rules.lock().len())
            .finish()
    }
}

fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Contract between an element and the registry/dispatcher.
///
/// Implementors provide [`core`](Interactable::core),
/// [`targets`](Interactable::targets) and [`handle`](Interactable::handle);
/// the remaining methods are shared behaviour. Builder-style methods
/// (`with_*`) consume and return the concrete element type.
pub trait Interactable: Send + Sync {
    fn core(&self) -> &ElementCore;

    /// Whether `ctx` is addressed to this element at all.
    fn targets(&self, ctx: &InteractionContext) -> bool;

    /// Variant-specific matching and handler invocation. Only called once
    /// access has been granted.
    fn handle(&self, ctx: &InteractionContext) -> Outcome;

    /// Short variant name for logs.
    fn variant(&self) -> &'static str {
        "element"
    }

    /// Gate `ctx` through the rule chain, then delegate to
    /// [`handle`](Interactable::handle). Returns `Ignore` on denial after
    /// running the denial callbacks.
    fn process(&self, ctx: &InteractionContext) -> Outcome {
        let core = self.core();
        if core.gate_scope() == GateScope::Targeted && !self.targets(ctx) {
            return Outcome::NotProcessed;
        }
        if !core.admit(ctx) {
            return Outcome::Ignore;
        }
        self.handle(ctx)
    }

    fn id(&self) -> ElementId {
        self.core().id()
    }

    fn is_expired(&self, now: Timestamp) -> bool {
        self.core().is_expired(now)
    }

    fn can_interact(&self, ctx: &InteractionContext) -> bool {
        self.core().can_interact(ctx)
    }

    fn run_expiry_callbacks(&self) -> CallbackReport {
        self.core().run_expiry_callbacks()
    }

    fn with_expiry(self, expiry: Duration) -> Self
    where
        Self: Sized,
    {
        self.core().set_expiry(expiry);
        self
    }

    fn with_gate_scope(self, scope: GateScope) -> Self
    where
        Self: Sized,
    {
        self.core().set_gate_scope(scope);
        self
    }

    fn with_rule(self, rule: Rule) -> Self
    where
        Self: Sized,
    {
        self.core().add_rule(rule);
        self
    }

    fn on_expiry<F>(self, callback: F) -> Self
    where
        Self: Sized,
        F: Fn() -> Result<(), CallbackError> + Send + Sync + 'static,
    {
        self.core()
            .add_expiry_callback(Arc::new(move |_: &()| callback()));
        self
    }

    fn on_denied(self, callback: Callback<InteractionContext>) -> Self
    where
        Self: Sized,
    {
        self.core().add_denied_callback(callback);
        self
    }
}
