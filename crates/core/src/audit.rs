//! Audit trail records.
//!
//! Audit records are append-only and written in the same database
//! transaction as the change they describe.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// The kind of entity an audit record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntity {
    /// Client account.
    Client,
    /// Petty cash entry.
    PettyCashEntry,
    /// Float settings version.
    FloatSettings,
    /// Petty cash category.
    Category,
}

impl AuditEntity {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::PettyCashEntry => "petty_cash_entry",
            Self::FloatSettings => "float_settings",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for AuditEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Entity kind.
    pub entity: AuditEntity,
    /// Entity id.
    pub entity_id: Uuid,
    /// Who made the change.
    pub actor_id: Uuid,
    /// Verb, e.g. `update` or `approve`.
    pub action: &'static str,
    /// Human-readable description of the change.
    pub summary: String,
}

impl AuditEvent {
    /// Creates an audit event.
    #[must_use]
    pub fn new(
        entity: AuditEntity,
        entity_id: Uuid,
        actor_id: Uuid,
        action: &'static str,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            entity_id,
            actor_id,
            action,
            summary: summary.into(),
        }
    }
}
