//! Notification types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// The float dropped below its replenishment threshold.
    FloatBelowReplenishment,
    /// An invoice is past its due date.
    InvoiceOverdue,
    /// A petty cash entry has waited too long for approval.
    PendingApprovalStale,
    /// Created by hand.
    Manual,
}

impl NotificationKind {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FloatBelowReplenishment => "float_below_replenishment",
            Self::InvoiceOverdue => "invoice_overdue",
            Self::PendingApprovalStale => "pending_approval_stale",
            Self::Manual => "manual",
        }
    }

    /// Parses a stored kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "float_below_replenishment" => Some(Self::FloatBelowReplenishment),
            "invoice_overdue" => Some(Self::InvoiceOverdue),
            "pending_approval_stale" => Some(Self::PendingApprovalStale),
            "manual" => Some(Self::Manual),
            _ => None,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who receives a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "user_id", rename_all = "lowercase")]
pub enum Recipient {
    /// One user.
    User(Uuid),
    /// Every user.
    Broadcast,
}

impl Recipient {
    /// Returns the target user, or `None` for a broadcast.
    #[must_use]
    pub const fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::User(id) => Some(*id),
            Self::Broadcast => None,
        }
    }
}

/// A notification ready to append.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewNotification {
    /// Recipient.
    pub recipient: Recipient,
    /// Kind.
    pub kind: NotificationKind,
    /// Short headline.
    pub title: String,
    /// Structured detail.
    pub payload: serde_json::Value,
}

/// Raw fields for manual creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationInput {
    /// Target user; omit with `broadcast: true` to reach everyone.
    pub user_id: Option<Uuid>,
    /// Send to every user.
    #[serde(default)]
    pub broadcast: bool,
    /// Kind, defaults to `manual`.
    pub kind: Option<String>,
    /// Headline.
    pub title: Option<String>,
    /// Structured detail.
    pub payload: Option<serde_json::Value>,
}
