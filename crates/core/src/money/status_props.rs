//! Property-based tests for the status calculator.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::money::status::{PaymentStatus, Settlement, compute_due, compute_status};

/// Non-negative amounts with two decimal places, up to 10 million.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_status_matches_definition(total in arb_amount(), paid in arb_amount()) {
        let status = compute_status(total, paid);
        let expected = if total > Decimal::ZERO && paid >= total {
            PaymentStatus::Paid
        } else if paid > Decimal::ZERO && paid < total {
            PaymentStatus::PartiallyPaid
        } else {
            PaymentStatus::NotPaid
        };
        prop_assert_eq!(status, expected);
    }

    #[test]
    fn prop_equal_positive_amounts_are_paid(total in arb_amount()) {
        prop_assume!(total > Decimal::ZERO);
        prop_assert_eq!(compute_status(total, total), PaymentStatus::Paid);
    }

    #[test]
    fn prop_zero_total_is_never_paid(paid in arb_amount()) {
        prop_assert_eq!(compute_status(Decimal::ZERO, paid), PaymentStatus::NotPaid);
    }

    #[test]
    fn prop_due_is_clamped_difference(total in arb_amount(), paid in arb_amount()) {
        let due = compute_due(total, paid);
        prop_assert!(due >= Decimal::ZERO);
        if paid <= total {
            prop_assert_eq!(due + paid, total);
        } else {
            prop_assert_eq!(due, Decimal::ZERO);
        }
    }

    #[test]
    fn prop_due_zero_iff_paid_for_positive_totals(total in arb_amount(), paid in arb_amount()) {
        prop_assume!(total > Decimal::ZERO);
        let s = Settlement::of(total, paid);
        prop_assert_eq!(s.due.is_zero(), s.status == PaymentStatus::Paid);
    }

    /// A receipt of X on total=1000, paid=400 lands on 400+X with the matching status.
    #[test]
    fn prop_receipt_on_partially_paid_invoice(cents in 1i64..200_000i64) {
        let x = Decimal::new(cents, 2);
        let after = Settlement::of(Decimal::new(1000, 0), Decimal::new(400, 0)).with_payment(x);
        prop_assert_eq!(after.paid, Decimal::new(400, 0) + x);
        if after.paid < Decimal::new(1000, 0) {
            prop_assert_eq!(after.status, PaymentStatus::PartiallyPaid);
        } else {
            prop_assert_eq!(after.status, PaymentStatus::Paid);
        }
    }
}
