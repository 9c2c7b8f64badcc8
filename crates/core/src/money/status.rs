//! Due amount and payment status from an `(amount, paid)` pair.
//!
//! Callers reject negative or malformed input before it reaches here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Settlement state of an invoice or client account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Nothing paid, or nothing to pay.
    NotPaid,
    /// Some but not all of the total has been paid.
    PartiallyPaid,
    /// Fully settled.
    Paid,
}

impl PaymentStatus {
    /// Returns the stored representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotPaid => "NOT_PAID",
            Self::PartiallyPaid => "PARTIALLY_PAID",
            Self::Paid => "PAID",
        }
    }

    /// Parses a stored status.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "NOT_PAID" => Some(Self::NotPaid),
            "PARTIALLY_PAID" => Some(Self::PartiallyPaid),
            "PAID" => Some(Self::Paid),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Computes the payment status of `total` given `paid`.
///
/// A non-positive total is never considered paid.
#[must_use]
pub fn compute_status(total: Decimal, paid: Decimal) -> PaymentStatus {
    if total > Decimal::ZERO && paid >= total {
        PaymentStatus::Paid
    } else if paid > Decimal::ZERO && paid < total {
        PaymentStatus::PartiallyPaid
    } else {
        PaymentStatus::NotPaid
    }
}

/// Computes the outstanding amount, clamped at zero.
#[must_use]
pub fn compute_due(total: Decimal, paid: Decimal) -> Decimal {
    (total - paid).max(Decimal::ZERO)
}

/// Derived figures for an `(amount, paid)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// Amount invoiced.
    pub total: Decimal,
    /// Amount received so far.
    pub paid: Decimal,
    /// Outstanding amount.
    pub due: Decimal,
    /// Derived status.
    pub status: PaymentStatus,
}

impl Settlement {
    /// Derives due amount and status for `total` and `paid`.
    #[must_use]
    pub fn of(total: Decimal, paid: Decimal) -> Self {
        Self {
            total,
            paid,
            due: compute_due(total, paid),
            status: compute_status(total, paid),
        }
    }

    /// Returns the settlement after a further payment of `amount`.
    #[must_use]
    pub fn with_payment(&self, amount: Decimal) -> Self {
        Self::of(self.total, self.paid + amount)
    }
}
