//! # Callback Runner
//!
//! Runs an ordered list of side-effecting callbacks with per-callback
//! failure isolation. Every callback returns an explicit
//! `Result<(), CallbackError>`; panics are caught and converted into
//! [`CallbackError::Panicked`]. The runner never stops early and hands the
//! collected failures back as a [`CallbackReport`].

use super::errors::CallbackError;
use super::notification::{InteractionContext, Reply};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// A shared callback taking `&A`.
///
/// Expiry callbacks use `A = ()`; denial callbacks receive the denied
/// [`InteractionContext`](super::notification::InteractionContext).
pub type Callback<A> = Arc<dyn Fn(&A) -> Result<(), CallbackError> + Send + Sync>;

/// One failed callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackFailure {
    /// Position in the callback list.
    pub index: usize,
    pub error: CallbackError,
}

/// Outcome of a [`CallbackRunner::run_all`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackReport {
    /// Number of callbacks invoked (always the full list).
    pub invoked: usize,
    pub failures: Vec<CallbackFailure>,
}

impl CallbackReport {
    pub fn succeeded(&self) -> usize {
        self.invoked - self.failures.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another report into this one, keeping failure indices local to
    /// their own pass.
    pub fn merge(&mut self, other: CallbackReport) {
        self.invoked += other.invoked;
        self.failures.extend(other.failures);
    }
}

/// Executes callback lists with failure isolation.
pub struct CallbackRunner;

impl CallbackRunner {
    /// Invoke every callback in order with `arg`.
    ///
    /// `label` names the list in logs (e.g. `"expiry"`, `"denied"`).
    pub fn run_all<A>(label: &'static str, callbacks: &[Callback<A>], arg: &A) -> CallbackReport {
        let mut report = CallbackReport {
            invoked: 0,
            failures: Vec::new(),
        };

        for (index, callback) in callbacks.iter().enumerate() {
            report.invoked += 1;
            if let Err(err) = guarded(|| callback(arg)) {
                error!(callback = label, index, error = %err, "Callback failed");
                report.failures.push(CallbackFailure { index, error: err });
            }
        }

        report
    }
}

/// Ready-made denial callbacks.
pub struct DeniedCallbacks;

impl DeniedCallbacks {
    /// Answer the denied originator with an ephemeral `content` reply.
    pub fn reply_ephemeral(content: impl Into<String>) -> Callback<InteractionContext> {
        let content = content.into();
        Arc::new(move |ctx: &InteractionContext| -> Result<(), CallbackError> {
            ctx.reply(Reply::ephemeral(content.clone()))?;
            Ok(())
        })
    }

    /// Answer the denied originator with a reply built from the context.
    pub fn reply_with<F>(build: F) -> Callback<InteractionContext>
    where
        F: Fn(&InteractionContext) -> Reply + Send + Sync + 'static,
    {
        Arc::new(move |ctx: &InteractionContext| -> Result<(), CallbackError> {
            ctx.reply(build(ctx))?;
            Ok(())
        })
    }
}

/// Run `f`, converting a panic into [`CallbackError::Panicked`].
pub(crate) fn guarded<T>(f: impl FnOnce() -> Result<T, CallbackError>) -> Result<T, CallbackError> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(CallbackError::Panicked {
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
