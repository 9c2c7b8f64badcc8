//! Property-based tests for float arithmetic and approval thresholds.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::petty_cash::float::FloatService;
use crate::petty_cash::types::{
    ApprovalStatus, EntryType, FloatLimits, MovementTotals, PeriodUsage,
};
use crate::petty_cash::workflow::PettyCashWorkflow;

fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|c| Decimal::new(c, 2))
}

fn arb_type() -> impl Strategy<Value = EntryType> {
    prop_oneof![Just(EntryType::In), Just(EntryType::Out)]
}

fn arb_status() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Rejected),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Pending and rejected entries never move the balance.
    #[test]
    fn prop_only_approved_entries_move_balance(
        initial in arb_amount(),
        entries in prop::collection::vec((arb_type(), arb_status(), arb_amount()), 0..40),
    ) {
        let mut totals = MovementTotals::default();
        let mut expected = initial;
        for (kind, status, amount) in &entries {
            totals.add(*kind, *status, *amount);
            if *status == ApprovalStatus::Approved {
                match kind {
                    EntryType::In => expected += *amount,
                    EntryType::Out => expected -= *amount,
                }
            }
        }
        prop_assert_eq!(FloatService::balance(initial, &totals), expected);
    }

    /// Anything above the threshold starts pending; anything else applies.
    #[test]
    fn prop_threshold_partitions_entries(amount in arb_amount(), threshold in arb_amount()) {
        let status = PettyCashWorkflow::initial_status(amount, threshold);
        prop_assert_eq!(status == ApprovalStatus::Pending, amount > threshold);
    }

    /// An accepted outflow never leaves the balance negative.
    #[test]
    fn prop_accepted_outflow_keeps_balance_non_negative(
        balance in arb_amount(),
        amount in arb_amount(),
    ) {
        let limits = FloatLimits {
            initial_float: balance,
            max_limit: balance * Decimal::from(2),
            replenishment_threshold: Decimal::ZERO,
            approval_threshold: Decimal::ZERO,
            daily_limit: None,
            monthly_limit: None,
        };
        let accepted = FloatService::check_apply(
            &limits,
            balance,
            &PeriodUsage::default(),
            EntryType::Out,
            amount,
        )
        .is_ok();
        prop_assert_eq!(accepted, balance - amount >= Decimal::ZERO);
    }
}
