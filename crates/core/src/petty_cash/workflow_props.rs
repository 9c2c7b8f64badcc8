//! Property-based tests for the petty cash state machine.

use chrono::Utc;
use proptest::prelude::*;
use uuid::Uuid;

use crate::petty_cash::error::PettyCashError;
use crate::petty_cash::types::{ApprovalStatus, EntryPatch, EntryState};
use crate::petty_cash::workflow::PettyCashWorkflow;

fn arb_status() -> impl Strategy<Value = ApprovalStatus> {
    prop_oneof![
        Just(ApprovalStatus::Pending),
        Just(ApprovalStatus::Approved),
        Just(ApprovalStatus::Rejected),
    ]
}

fn arb_uuid() -> impl Strategy<Value = Uuid> {
    any::<u128>().prop_map(Uuid::from_u128)
}

fn arb_reason() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9]{1,40}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Nobody can decide an entry they created, whatever its status.
    #[test]
    fn prop_creator_can_never_decide(status in arb_status(), owner in arb_uuid(), reason in arb_reason()) {
        let entry = EntryState { owner, status, is_locked: false };
        prop_assert!(PettyCashWorkflow::approve(&entry, owner, Utc::now()).is_err());
        prop_assert!(PettyCashWorkflow::reject(&entry, owner, &reason, Utc::now()).is_err());
    }

    /// Only pending entries can be decided, and only once.
    #[test]
    fn prop_only_pending_is_decidable(status in arb_status(), owner in arb_uuid(), approver in arb_uuid()) {
        prop_assume!(owner != approver);
        let entry = EntryState { owner, status, is_locked: false };
        let result = PettyCashWorkflow::approve(&entry, approver, Utc::now());
        prop_assert_eq!(result.is_ok(), status == ApprovalStatus::Pending);
        if let Ok(decision) = result {
            let after = EntryState { status: decision.new_status(), ..entry };
            prop_assert!(PettyCashWorkflow::approve(&after, approver, Utc::now()).is_err());
        }
    }

    /// A locked entry refuses every mutation.
    #[test]
    fn prop_locked_refuses_everything(
        status in arb_status(),
        owner in arb_uuid(),
        approver in arb_uuid(),
        reason in arb_reason(),
    ) {
        let entry = EntryState { owner, status, is_locked: true };
        prop_assert!(matches!(
            PettyCashWorkflow::approve(&entry, approver, Utc::now()),
            Err(PettyCashError::Locked)
        ));
        prop_assert!(matches!(
            PettyCashWorkflow::reject(&entry, approver, &reason, Utc::now()),
            Err(PettyCashError::Locked)
        ));
        prop_assert!(matches!(PettyCashWorkflow::lock(&entry), Err(PettyCashError::Locked)));
        prop_assert!(matches!(
            PettyCashWorkflow::check_patch(&entry, &EntryPatch::default()),
            Err(PettyCashError::Locked)
        ));
        prop_assert!(matches!(
            PettyCashWorkflow::ensure_unlocked(&entry),
            Err(PettyCashError::Locked)
        ));
    }
}
