//! Property-based tests for receipt planning.

use haulbook_shared::config::OverpaymentPolicy;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::ledger::error::LedgerError;
use crate::ledger::service::LedgerService;
use crate::money::{PaymentStatus, Settlement};

fn cents(max: i64) -> impl Strategy<Value = Decimal> {
    (1i64..max).prop_map(|c| Decimal::new(c, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Accepted receipts never push amount_paid past the total.
    #[test]
    fn prop_accepted_receipts_never_overpay(
        total in cents(10_000_000),
        paid_fraction in 0u32..=100u32,
        amount in cents(20_000_000),
    ) {
        let paid = (total * Decimal::from(paid_fraction) / Decimal::from(100)).round_dp(2);
        let start = Settlement::of(total, paid);
        match LedgerService::plan_receipt(start, amount, OverpaymentPolicy::Reject) {
            Ok(after) => {
                prop_assert!(after.paid <= total);
                prop_assert_eq!(after.paid, paid + amount);
                prop_assert_eq!(after.status == PaymentStatus::Paid, after.paid == total);
            }
            Err(LedgerError::ExceedsOutstanding { due, .. }) => {
                prop_assert!(amount > due);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    /// Two receipts of 600 against a 1000 total: the second is always refused.
    #[test]
    fn prop_two_large_receipts_cannot_both_apply(amount in 50_001i64..100_000i64) {
        let amount = Decimal::new(amount, 2);
        let start = Settlement::of(Decimal::new(1000, 0), Decimal::ZERO);
        let first = LedgerService::plan_receipt(start, amount, OverpaymentPolicy::Reject).map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(LedgerService::plan_receipt(first, amount, OverpaymentPolicy::Reject).is_err());
    }

    /// Accepted receipts always add the full amount and never leave a due balance below zero.
    #[test]
    fn prop_accepted_overpayment_is_paid(
        total in cents(10_000_000),
        paid_fraction in 0u32..=100u32,
        amount in cents(20_000_000),
    ) {
        let paid = (total * Decimal::from(paid_fraction) / Decimal::from(100)).round_dp(2);
        let start = Settlement::of(total, paid);
        let after = LedgerService::plan_receipt(start, amount, OverpaymentPolicy::Accept)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(after.paid, paid + amount);
        prop_assert!(after.due >= Decimal::ZERO);
        prop_assert_eq!(after.status == PaymentStatus::Paid, after.paid >= total);
    }
}
