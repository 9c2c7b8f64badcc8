//! Petty cash domain types.

use chrono::{DateTime, NaiveDate, Utc};
use haulbook_shared::types::RawAmount;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Direction of a petty cash movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Cash added to the float.
    In,
    /// Cash paid out of the float.
    Out,
}

impl EntryType {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }

    /// Parses an entry type.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "in" => Some(Self::In),
            "out" => Some(Self::Out),
            _ => None,
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Approval state of a petty cash entry.
///
/// Valid transitions:
/// - Pending → Approved (approve, by someone other than the creator)
/// - Pending → Rejected (reject, with a reason)
///
/// Locking is orthogonal and terminal: a locked entry keeps its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    /// Waiting for an approver.
    Pending,
    /// Counted against the float.
    Approved,
    /// Never counted.
    Rejected,
}

impl ApprovalStatus {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    /// Parses a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "approved" => Some(Self::Approved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Float limits carried by one settings version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatLimits {
    /// Opening balance of the float.
    pub initial_float: Decimal,
    /// Ceiling the balance may not exceed.
    pub max_limit: Decimal,
    /// Balance below which replenishment is due.
    pub replenishment_threshold: Decimal,
    /// Entries above this amount need manual approval.
    pub approval_threshold: Decimal,
    /// Cap on approved outflow per calendar day.
    pub daily_limit: Option<Decimal>,
    /// Cap on approved outflow per calendar month.
    pub monthly_limit: Option<Decimal>,
}

/// One immutable version of the float settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatSettings {
    /// Monotonic version number.
    pub version: i64,
    /// Instant from which this version governs.
    pub activated_at: DateTime<Utc>,
    /// The limits.
    #[serde(flatten)]
    pub limits: FloatLimits,
    /// Who activated it.
    pub updated_by: Uuid,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

/// Raw fields for activating a settings version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingsInput {
    /// Opening balance.
    pub initial_float: Option<RawAmount>,
    /// Balance ceiling.
    pub max_limit: Option<RawAmount>,
    /// Replenishment trigger.
    pub replenishment_threshold: Option<RawAmount>,
    /// Manual approval threshold.
    pub approval_threshold: Option<RawAmount>,
    /// Daily outflow cap.
    pub daily_limit: Option<RawAmount>,
    /// Monthly outflow cap.
    pub monthly_limit: Option<RawAmount>,
    /// Activation instant; defaults to now.
    pub activate_at: Option<DateTime<Utc>>,
}

/// Raw fields for recording a petty cash entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryInput {
    /// Date of the movement (`YYYY-MM-DD`).
    pub transaction_date: Option<String>,
    /// What the cash was for.
    pub description: Option<String>,
    /// Who received or handed over the cash.
    pub beneficiary: Option<String>,
    /// Business purpose.
    pub purpose: Option<String>,
    /// Amount.
    pub amount: Option<RawAmount>,
    /// `in` or `out`.
    pub transaction_type: Option<String>,
    /// Category id.
    pub category_id: Option<Uuid>,
    /// Payment method.
    pub payment_method: Option<String>,
    /// External reference.
    pub reference: Option<String>,
    /// Receipt attachment reference in the file store.
    pub receipt_attachment: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A validated entry ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Date of the movement.
    pub transaction_date: NaiveDate,
    /// Description.
    pub description: String,
    /// Beneficiary.
    pub beneficiary: Option<String>,
    /// Purpose.
    pub purpose: Option<String>,
    /// Amount, positive.
    pub amount: Decimal,
    /// Direction.
    pub entry_type: EntryType,
    /// Category id.
    pub category_id: Option<Uuid>,
    /// Payment method.
    pub payment_method: Option<String>,
    /// Reference.
    pub reference: Option<String>,
    /// Attachment reference.
    pub receipt_attachment: Option<String>,
    /// Notes.
    pub notes: Option<String>,
}

/// Raw changes to an entry. Absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EntryPatch {
    /// New description.
    pub description: Option<String>,
    /// New beneficiary.
    pub beneficiary: Option<String>,
    /// New purpose.
    pub purpose: Option<String>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New payment method.
    pub payment_method: Option<String>,
    /// New reference.
    pub reference: Option<String>,
    /// New attachment reference.
    pub receipt_attachment: Option<String>,
    /// New notes.
    pub notes: Option<String>,
    /// New amount; pending entries only.
    pub amount: Option<RawAmount>,
    /// New direction; pending entries only.
    pub transaction_type: Option<String>,
    /// New date; pending entries only.
    pub transaction_date: Option<String>,
}

impl EntryPatch {
    /// Returns true if the patch touches a field that moves money.
    #[must_use]
    pub const fn touches_financials(&self) -> bool {
        self.amount.is_some() || self.transaction_type.is_some() || self.transaction_date.is_some()
    }
}

/// A validated patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidPatch {
    /// New description.
    pub description: Option<String>,
    /// New beneficiary; `Some(None)` clears.
    pub beneficiary: Option<Option<String>>,
    /// New purpose; `Some(None)` clears.
    pub purpose: Option<Option<String>>,
    /// New category.
    pub category_id: Option<Uuid>,
    /// New payment method; `Some(None)` clears.
    pub payment_method: Option<Option<String>>,
    /// New reference; `Some(None)` clears.
    pub reference: Option<Option<String>>,
    /// New attachment; `Some(None)` clears.
    pub receipt_attachment: Option<Option<String>>,
    /// New notes; `Some(None)` clears.
    pub notes: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New direction.
    pub entry_type: Option<EntryType>,
    /// New date.
    pub transaction_date: Option<NaiveDate>,
}

/// The workflow-relevant state of a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryState {
    /// Creator.
    pub owner: Uuid,
    /// Approval status.
    pub status: ApprovalStatus,
    /// Whether the entry is locked.
    pub is_locked: bool,
}

/// Approved and pending sums by direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementTotals {
    /// Approved inflow.
    pub approved_in: Decimal,
    /// Approved outflow.
    pub approved_out: Decimal,
    /// Pending inflow.
    pub pending_in: Decimal,
    /// Pending outflow.
    pub pending_out: Decimal,
}

impl MovementTotals {
    /// Adds one entry to the totals. Rejected entries are ignored.
    pub fn add(&mut self, entry_type: EntryType, status: ApprovalStatus, amount: Decimal) {
        match (status, entry_type) {
            (ApprovalStatus::Approved, EntryType::In) => self.approved_in += amount,
            (ApprovalStatus::Approved, EntryType::Out) => self.approved_out += amount,
            (ApprovalStatus::Pending, EntryType::In) => self.pending_in += amount,
            (ApprovalStatus::Pending, EntryType::Out) => self.pending_out += amount,
            (ApprovalStatus::Rejected, _) => {}
        }
    }
}

/// Approved outflow already booked in the entry's day and month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodUsage {
    /// Approved `out` total on the same calendar day.
    pub day_out: Decimal,
    /// Approved `out` total in the same calendar month.
    pub month_out: Decimal,
}

/// Float position at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FloatSummary {
    /// `initial_float + approved in - approved out`.
    pub balance: Decimal,
    /// Sums by direction and status.
    #[serde(flatten)]
    pub totals: MovementTotals,
    /// Governing settings version.
    pub settings_version: i64,
    /// Replenishment trigger of that version.
    pub replenishment_threshold: Decimal,
    /// True when the balance is below the trigger.
    pub needs_replenishment: bool,
}
