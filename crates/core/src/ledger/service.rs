//! Receipt planning and numbering.

use chrono::NaiveDate;
use haulbook_shared::config::OverpaymentPolicy;
use rust_decimal::Decimal;

use super::error::LedgerError;
use crate::money::Settlement;

/// Name of the counter row that feeds receipt numbers.
pub const RECEIPT_COUNTER: &str = "receipt_number";

/// Stateless ledger rules shared by the store implementations.
pub struct LedgerService;

impl LedgerService {
    /// Returns the invoice settlement after applying a receipt of `amount`.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` for a zero or negative amount. Under
    /// [`OverpaymentPolicy::Reject`], `ExceedsOutstanding` when `amount` is
    /// more than the invoice's due amount, which includes every receipt
    /// against a paid invoice.
    pub fn plan_receipt(
        current: Settlement,
        amount: Decimal,
        policy: OverpaymentPolicy,
    ) -> Result<Settlement, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount("amount_paid"));
        }
        if policy == OverpaymentPolicy::Reject && amount > current.due {
            return Err(LedgerError::ExceedsOutstanding {
                amount,
                due: current.due,
            });
        }
        Ok(current.with_payment(amount))
    }

    /// Formats a receipt number, e.g. `RCT-20260314-000042`.
    ///
    /// `sequence` comes from the monotonic receipt counter, so numbers are
    /// unique even when two receipts share a timestamp.
    #[must_use]
    pub fn receipt_number(date: NaiveDate, sequence: u64) -> String {
        format!("RCT-{}-{sequence:06}", date.format("%Y%m%d"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::PaymentStatus;
    use rust_decimal_macros::dec;

    #[test]
    fn test_plan_receipt_partial_then_full() {
        let start = Settlement::of(dec!(1000), dec!(400));

        let partial = LedgerService::plan_receipt(start, dec!(100), OverpaymentPolicy::Reject).unwrap();
        assert_eq!(partial.paid, dec!(500));
        assert_eq!(partial.status, PaymentStatus::PartiallyPaid);

        let full = LedgerService::plan_receipt(start, dec!(600), OverpaymentPolicy::Reject).unwrap();
        assert_eq!(full.paid, dec!(1000));
        assert_eq!(full.status, PaymentStatus::Paid);
    }

    #[test]
    fn test_plan_receipt_rejects_overpayment() {
        let start = Settlement::of(dec!(1000), dec!(600));
        let err = LedgerService::plan_receipt(start, dec!(600), OverpaymentPolicy::Reject).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::ExceedsOutstanding { amount, due } if amount == dec!(600) && due == dec!(400)
        ));
    }

    #[test]
    fn test_plan_receipt_on_paid_invoice_fails() {
        let paid = Settlement::of(dec!(1000), dec!(1000));
        assert!(LedgerService::plan_receipt(paid, dec!(0.01), OverpaymentPolicy::Reject).is_err());
    }

    #[test]
    fn test_accepted_overpayment_settles_invoice() {
        let start = Settlement::of(dec!(1000), dec!(400));
        let after = LedgerService::plan_receipt(start, dec!(700), OverpaymentPolicy::Accept).unwrap();
        assert_eq!(after.paid, dec!(1100));
        assert_eq!(after.due, Decimal::ZERO);
        assert_eq!(after.status, PaymentStatus::Paid);

        assert!(matches!(
            LedgerService::plan_receipt(start, dec!(0), OverpaymentPolicy::Accept),
            Err(LedgerError::NonPositiveAmount(_))
        ));
    }

    #[test]
    fn test_receipt_number_format() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(LedgerService::receipt_number(date, 42), "RCT-20260314-000042");
        assert_eq!(
            LedgerService::receipt_number(date, 1_234_567),
            "RCT-20260314-1234567"
        );
    }
}
