//! Core identity types for interactive elements and their originators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Process-unique identifier of a registered element.
///
/// Generated once at element creation (UUID v4) and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity token of one selectable unit (button, option, menu, form).
///
/// Tokens created through [`ComponentId::generate`] are random and
/// collision-resistant; hosts that already own a token (e.g. a form id
/// echoed back by the transport) wrap it with [`ComponentId::new`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Wrap a host-provided token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generate a random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Borrow the token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for ComponentId {
    fn from(token: String) -> Self {
        Self(token)
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create from milliseconds since the epoch.
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds since the epoch.
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`, zero if `earlier` is in the future.
    pub fn elapsed_since(&self, earlier: Timestamp) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    /// Shift forward by `duration`, saturating at `u64::MAX`.
    pub fn saturating_add(&self, duration: Duration) -> Self {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }
}

/// Sender identifier as assigned by the host platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub u64);

/// Role identifier within a membership scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoleId(pub u64);

/// Scope (e.g. a community or server) the originator acted within.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ScopeId(pub u64);

/// Membership of an originator inside a scope, with the roles held there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub scope_id: ScopeId,
    pub roles: Vec<RoleId>,
}

impl Membership {
    pub fn new(scope_id: ScopeId, roles: impl IntoIterator<Item = RoleId>) -> Self {
        Self {
            scope_id,
            roles: roles.into_iter().collect(),
        }
    }

    pub fn has_role(&self, role: RoleId) -> bool {
        self.roles.contains(&role)
    }
}

/// The sender of an inbound notification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Originator {
    pub user_id: UserId,
    /// Set for bots, webhooks and other non-human senders.
    pub automated: bool,
    /// Present only when the action happened inside a scope.
    pub membership: Option<Membership>,
}

impl Originator {
    /// A human sender acting outside any scope.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            automated: false,
            membership: None,
        }
    }

    /// An automated sender.
    pub fn automated(user_id: UserId) -> Self {
        Self {
            user_id,
            automated: true,
            membership: None,
        }
    }

    pub fn with_membership(mut self, membership: Membership) -> Self {
        self.membership = Some(membership);
        self
    }
}
