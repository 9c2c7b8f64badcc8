//! Approval state machine for petty cash entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::error::PettyCashError;
use super::types::{ApprovalStatus, EntryPatch, EntryState};

/// Outcome of deciding a pending entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The entry now counts against the float.
    Approve {
        /// Approver.
        approved_by: Uuid,
        /// When it was approved.
        approved_at: DateTime<Utc>,
    },
    /// The entry never counts.
    Reject {
        /// Approver who rejected it.
        rejected_by: Uuid,
        /// When it was rejected.
        rejected_at: DateTime<Utc>,
        /// Why.
        reason: String,
    },
}

impl Decision {
    /// Returns the status after the decision.
    #[must_use]
    pub const fn new_status(&self) -> ApprovalStatus {
        match self {
            Self::Approve { .. } => ApprovalStatus::Approved,
            Self::Reject { .. } => ApprovalStatus::Rejected,
        }
    }
}

/// Stateless transition rules for petty cash entries.
pub struct PettyCashWorkflow;

impl PettyCashWorkflow {
    /// Status a new entry starts in.
    ///
    /// Entries strictly above `approval_threshold` wait for approval; the rest
    /// apply immediately.
    #[must_use]
    pub fn initial_status(amount: Decimal, approval_threshold: Decimal) -> ApprovalStatus {
        if amount > approval_threshold {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Approved
        }
    }

    /// Approve a pending entry.
    ///
    /// # Errors
    ///
    /// `Locked` for a locked entry, `InvalidTransition` unless pending, and
    /// `SelfApproval` when `approver` created the entry.
    pub fn approve(
        entry: &EntryState,
        approver: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Decision, PettyCashError> {
        Self::ensure_decidable(entry, approver, ApprovalStatus::Approved)?;
        Ok(Decision::Approve {
            approved_by: approver,
            approved_at: now,
        })
    }

    /// Reject a pending entry.
    ///
    /// # Errors
    ///
    /// As [`Self::approve`], plus `RejectionReasonRequired` for a blank reason.
    pub fn reject(
        entry: &EntryState,
        approver: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<Decision, PettyCashError> {
        if reason.trim().is_empty() {
            return Err(PettyCashError::RejectionReasonRequired);
        }
        Self::ensure_decidable(entry, approver, ApprovalStatus::Rejected)?;
        Ok(Decision::Reject {
            rejected_by: approver,
            rejected_at: now,
            reason: reason.trim().to_string(),
        })
    }

    /// Lock an entry. Locking twice is an error.
    pub fn lock(entry: &EntryState) -> Result<(), PettyCashError> {
        Self::ensure_unlocked(entry)
    }

    /// Fails with `Locked` if the entry is locked.
    pub fn ensure_unlocked(entry: &EntryState) -> Result<(), PettyCashError> {
        if entry.is_locked {
            Err(PettyCashError::Locked)
        } else {
            Ok(())
        }
    }

    /// Checks that `patch` may be applied to `entry`.
    ///
    /// Descriptive fields are editable on any unlocked entry; amount, type,
    /// and date only while pending.
    pub fn check_patch(entry: &EntryState, patch: &EntryPatch) -> Result<(), PettyCashError> {
        Self::ensure_unlocked(entry)?;
        if patch.touches_financials() && entry.status != ApprovalStatus::Pending {
            return Err(PettyCashError::FinancialFieldsFrozen);
        }
        Ok(())
    }

    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
        matches!(
            (from, to),
            (
                ApprovalStatus::Pending,
                ApprovalStatus::Approved | ApprovalStatus::Rejected
            )
        )
    }

    fn ensure_decidable(
        entry: &EntryState,
        approver: Uuid,
        to: ApprovalStatus,
    ) -> Result<(), PettyCashError> {
        Self::ensure_unlocked(entry)?;
        if !Self::is_valid_transition(entry.status, to) {
            return Err(PettyCashError::InvalidTransition {
                from: entry.status,
                to,
            });
        }
        if entry.owner == approver {
            return Err(PettyCashError::SelfApproval);
        }
        Ok(())
    }
}
