//! Property-based tests for edge detection.

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::Value;

use crate::alerts::evaluator::{AlertEvaluator, Violation};
use crate::alerts::rules::{AlertCondition, AlertRule, AlertTarget, RuleSet};
use crate::notification::{NewNotification, NotificationKind, Recipient};

fn violation(rule: u8, entity: u8) -> Violation {
    Violation {
        rule_key: format!("r{rule}"),
        entity_key: format!("e{entity}"),
        notification: NewNotification {
            recipient: Recipient::Broadcast,
            kind: NotificationKind::Manual,
            title: String::new(),
            payload: Value::Null,
        },
    }
}

/// Rules `r0` through `r{count - 1}`.
fn rules(count: u8) -> RuleSet {
    RuleSet {
        rules: (0..count)
            .map(|i| AlertRule {
                key: format!("r{i}"),
                condition: AlertCondition::FloatBelowReplenishment,
                target: AlertTarget::Owner,
                enabled: true,
            })
            .collect(),
    }
}

fn arb_pairs() -> impl Strategy<Value = BTreeSet<(u8, u8)>> {
    prop::collection::btree_set((0u8..4, 0u8..6), 0..12)
}

/// Applies a plan to the active set the way the store does.
fn apply(active: &mut BTreeSet<(String, String)>, pairs: &BTreeSet<(u8, u8)>) -> usize {
    let violations = pairs.iter().map(|(r, e)| violation(*r, *e)).collect();
    let plan = AlertEvaluator::edges(&rules(4), active, violations);
    for key in &plan.clear {
        active.remove(key);
    }
    for v in &plan.raise {
        active.insert((v.rule_key.clone(), v.entity_key.clone()));
    }
    plan.raise.len()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// With no state change, the second evaluation raises nothing.
    #[test]
    fn prop_repeat_evaluation_is_silent(pairs in arb_pairs()) {
        let mut active = BTreeSet::new();
        let first = apply(&mut active, &pairs);
        prop_assert_eq!(first, pairs.len());
        prop_assert_eq!(apply(&mut active, &pairs), 0);
    }

    /// After any sequence of states the active set equals the latest violations,
    /// and a pair raises exactly when it was absent from the previous state.
    #[test]
    fn prop_active_set_tracks_latest_state(states in prop::collection::vec(arb_pairs(), 1..8)) {
        let mut active = BTreeSet::new();
        let mut previous: BTreeSet<(u8, u8)> = BTreeSet::new();
        for state in &states {
            let raised = apply(&mut active, state);
            prop_assert_eq!(raised, state.difference(&previous).count());
            let expected: BTreeSet<(String, String)> = state
                .iter()
                .map(|(r, e)| (format!("r{r}"), format!("e{e}")))
                .collect();
            prop_assert_eq!(&active, &expected);
            previous = state.clone();
        }
    }

    /// Pairs of rules missing from the loaded set survive any evaluation.
    #[test]
    fn prop_unloaded_rules_are_never_cleared(pairs in arb_pairs(), loaded in 0u8..4) {
        let active: BTreeSet<(String, String)> = pairs
            .iter()
            .map(|(r, e)| (format!("r{r}"), format!("e{e}")))
            .collect();
        let plan = AlertEvaluator::edges(&rules(loaded), &active, Vec::new());
        for (rule_key, _) in &plan.clear {
            let index: u8 = rule_key.trim_start_matches('r').parse().unwrap();
            prop_assert!(index < loaded);
        }
        let expected = pairs.iter().filter(|(r, _)| *r < loaded).count();
        prop_assert_eq!(plan.clear.len(), expected);
    }
}
