//! # Rule Chain Evaluator
//!
//! Ordered access rules gating an element. Evaluation semantics:
//!
//! | Chain state                     | Decision                      |
//! |---------------------------------|-------------------------------|
//! | empty                           | granted (default-open)        |
//! | first non-neutral is `Allow`    | granted                       |
//! | first non-neutral is `Deny`     | refused                       |
//! | only `Neutral` verdicts         | refused (default-closed)      |
//! | a rule fails or panics          | refused, later rules skipped  |

use super::callbacks::guarded;
use super::entities::{RoleId, UserId};
use super::errors::CallbackError;
use super::notification::InteractionContext;
use super::outcome::RuleVerdict;
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::error;

type RuleFn = dyn Fn(&InteractionContext) -> Result<RuleVerdict, CallbackError> + Send + Sync;

/// A single named access rule.
#[derive(Clone)]
pub struct Rule {
    name: Cow<'static, str>,
    check: Arc<RuleFn>,
}

impl Rule {
    pub fn new<F>(name: impl Into<Cow<'static, str>>, check: F) -> Self
    where
        F: Fn(&InteractionContext) -> Result<RuleVerdict, CallbackError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// An anonymous rule.
    pub fn from_fn<F>(check: F) -> Self
    where
        F: Fn(&InteractionContext) -> Result<RuleVerdict, CallbackError> + Send + Sync + 'static,
    {
        Self::new("custom", check)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate this rule, containing panics.
    pub fn check(&self, ctx: &InteractionContext) -> Result<RuleVerdict, CallbackError> {
        guarded(|| (self.check)(ctx))
    }

    /// `Allow` for the listed users, `Neutral` for everyone else.
    pub fn allow_users(users: impl IntoIterator<Item = UserId>) -> Self {
        let users: HashSet<UserId> = users.into_iter().collect();
        Self::new("allow_users", move |ctx| {
            Ok(match ctx.originator_opt() {
                Some(o) if users.contains(&o.user_id) => RuleVerdict::Allow,
                _ => RuleVerdict::Neutral,
            })
        })
    }

    /// `Deny` for the listed users, `Neutral` for everyone else.
    pub fn deny_users(users: impl IntoIterator<Item = UserId>) -> Self {
        let users: HashSet<UserId> = users.into_iter().collect();
        Self::new("deny_users", move |ctx| {
            Ok(match ctx.originator_opt() {
                Some(o) if users.contains(&o.user_id) => RuleVerdict::Deny,
                _ => RuleVerdict::Neutral,
            })
        })
    }

    /// `Allow` for members holding any listed role.
    ///
    /// `Neutral` outside a membership scope or when no role matches.
    pub fn allow_roles(roles: impl IntoIterator<Item = RoleId>) -> Self {
        let roles: HashSet<RoleId> = roles.into_iter().collect();
        Self::new("allow_roles", move |ctx| {
            let Some(membership) = ctx.originator_opt().and_then(|o| o.membership.as_ref())
            else {
                return Ok(RuleVerdict::Neutral);
            };
            if membership.roles.iter().any(|r| roles.contains(r)) {
                Ok(RuleVerdict::Allow)
            } else {
                Ok(RuleVerdict::Neutral)
            }
        })
    }

    /// `Deny` for members holding any listed role.
    ///
    /// Members holding none of the roles are *allowed*, which ends the
    /// chain. Place this rule last when combining it with other rules.
    /// `Neutral` outside a membership scope.
    pub fn deny_roles(roles: impl IntoIterator<Item = RoleId>) -> Self {
        let roles: HashSet<RoleId> = roles.into_iter().collect();
        Self::new("deny_roles", move |ctx| {
            let Some(membership) = ctx.originator_opt().and_then(|o| o.membership.as_ref())
            else {
                return Ok(RuleVerdict::Neutral);
            };
            if membership.roles.iter().any(|r| roles.contains(r)) {
                Ok(RuleVerdict::Deny)
            } else {
                Ok(RuleVerdict::Allow)
            }
        })
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Detailed result of running a rule chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    /// No rules attached.
    Open,
    /// Rule at `rule` returned `Allow`.
    Allowed { rule: usize },
    /// Rule at `rule` returned `Deny`.
    Denied { rule: usize },
    /// Every rule returned `Neutral`.
    Exhausted,
    /// Rule at `rule` failed; treated as a denial.
    Failed { rule: usize, error: CallbackError },
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Open | AccessDecision::Allowed { .. })
    }
}

/// Run `rules` in order against `ctx` and report how the chain ended.
pub fn decide(rules: &[Rule], ctx: &InteractionContext) -> AccessDecision {
    if rules.is_empty() {
        return AccessDecision::Open;
    }

    for (index, rule) in rules.iter().enumerate() {
        match rule.check(ctx) {
            Ok(RuleVerdict::Allow) => return AccessDecision::Allowed { rule: index },
            Ok(RuleVerdict::Deny) => return AccessDecision::Denied { rule: index },
            Ok(RuleVerdict::Neutral) => continue,
            Err(err) => {
                error!(
                    rule_index = index,
                    rule = rule.name(),
                    error = %err,
                    "Access rule failed, denying interaction"
                );
                return AccessDecision::Failed {
                    rule: index,
                    error: err,
                };
            }
        }
    }

    AccessDecision::Exhausted
}

/// `true` when `rules` grant access for `ctx`.
pub fn evaluate(rules: &[Rule], ctx: &InteractionContext) -> bool {
    decide(rules, ctx).is_granted()
}
