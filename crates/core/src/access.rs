//! Actors and capabilities.
//!
//! The engine never authenticates anyone. The identity provider resolves the
//! caller into an [`Actor`] and a [`PermissionChecker`] answers capability
//! questions about it.

use std::collections::BTreeSet;
use std::fmt;

use haulbook_shared::types::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A named permission required by an engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Record free-form ledger transactions.
    CreateTransaction,
    /// Create, import, and amend client accounts.
    EditClient,
    /// Change float settings and petty cash categories.
    ManageSettings,
    /// Create invoices.
    ManageInvoices,
    /// Record petty cash movements.
    RecordPettyCash,
    /// Approve or reject pending petty cash entries.
    ApprovePettyCash,
    /// Lock petty cash entries.
    LockPettyCash,
    /// Create notifications by hand.
    ManageNotifications,
    /// Trigger an alert evaluation.
    RunAlerts,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::CreateTransaction,
        Self::EditClient,
        Self::ManageSettings,
        Self::ManageInvoices,
        Self::RecordPettyCash,
        Self::ApprovePettyCash,
        Self::LockPettyCash,
        Self::ManageNotifications,
        Self::RunAlerts,
    ];

    /// Returns the wire name of the capability.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateTransaction => "create-transaction",
            Self::EditClient => "edit-client",
            Self::ManageSettings => "manage-settings",
            Self::ManageInvoices => "manage-invoices",
            Self::RecordPettyCash => "record-petty-cash",
            Self::ApprovePettyCash => "approve-petty-cash",
            Self::LockPettyCash => "lock-petty-cash",
            Self::ManageNotifications => "manage-notifications",
            Self::RunAlerts => "run-alerts",
        }
    }

    /// Parses a capability from its wire name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse role supplied alongside the capability set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Read-only access.
    Viewer = 0,
    /// Day-to-day bookkeeping staff.
    Clerk = 1,
    /// Finance staff who sign off on petty cash.
    Approver = 2,
    /// Holds every capability.
    Admin = 3,
}

impl UserRole {
    /// Parse a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "viewer" => Some(Self::Viewer),
            "clerk" => Some(Self::Clerk),
            "approver" => Some(Self::Approver),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Viewer => "viewer",
            Self::Clerk => "clerk",
            Self::Approver => "approver",
            Self::Admin => "admin",
        }
    }
}

/// The caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Acting user.
    pub user_id: UserId,
    /// Role reported by the identity provider.
    pub role: UserRole,
    /// Capabilities granted to this actor.
    pub capabilities: BTreeSet<Capability>,
}

impl Actor {
    /// Creates an actor with an explicit capability set.
    #[must_use]
    pub fn new(
        user_id: impl Into<UserId>,
        role: UserRole,
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            capabilities: capabilities.into_iter().collect(),
        }
    }

    /// The in-process actor used by scheduled jobs.
    #[must_use]
    pub fn system() -> Self {
        Self::new(Uuid::nil(), UserRole::Admin, [Capability::RunAlerts])
    }

    /// Returns the raw user id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.user_id.into_inner()
    }
}

/// Answers whether an actor holds a capability.
#[cfg_attr(test, mockall::automock)]
pub trait PermissionChecker: Send + Sync {
    /// Returns true if `actor` may exercise `capability`.
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool;
}

/// Grants exactly what the identity provider put on the actor; admins hold everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantedCapabilities;

impl PermissionChecker for GrantedCapabilities {
    fn has_capability(&self, actor: &Actor, capability: Capability) -> bool {
        actor.role == UserRole::Admin || actor.capabilities.contains(&capability)
    }
}

/// Raised when a capability check fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Actor {actor} lacks capability {capability}")]
pub struct AccessDenied {
    /// The actor that was refused.
    pub actor: UserId,
    /// The capability that was missing.
    pub capability: Capability,
}

/// Fails with [`AccessDenied`] unless `checker` grants `capability` to `actor`.
pub fn require(
    checker: &dyn PermissionChecker,
    actor: &Actor,
    capability: Capability,
) -> Result<(), AccessDenied> {
    if checker.has_capability(actor, capability) {
        Ok(())
    } else {
        tracing::warn!(actor = %actor.user_id, capability = %capability, "Capability check failed");
        Err(AccessDenied {
            actor: actor.user_id,
            capability,
        })
    }
}
