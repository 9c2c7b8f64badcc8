//! Rule evaluation and edge detection.
//!
//! Evaluation is split in two pure steps. [`AlertEvaluator::violations`]
//! lists the `(rule, entity)` pairs whose predicate holds right now.
//! [`AlertEvaluator::edges`] compares them with the pairs already active in
//! the edge-detector memory and decides which to raise and which to clear.
//! The store applies the plan with conditional writes, so overlapping
//! evaluations cannot both raise the same pair.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use haulbook_shared::types::format_amount;
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use super::rules::{AlertCondition, AlertRule, AlertTarget, RuleSet};
use crate::money::PaymentStatus;
use crate::notification::{NewNotification, Recipient};
use crate::petty_cash::FloatSummary;

/// Entity key used for the petty cash float.
pub const FLOAT_ENTITY: &str = "float";

/// An invoice as the overdue rule sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFacts {
    /// Invoice id.
    pub id: Uuid,
    /// Owner.
    pub owner: Uuid,
    /// Invoice number.
    pub invoice_number: String,
    /// Due date, if any.
    pub due_date: Option<NaiveDate>,
    /// Payment status.
    pub status: PaymentStatus,
    /// Outstanding amount.
    pub due_amount: Decimal,
}

/// A pending petty cash entry as the staleness rule sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEntryFacts {
    /// Entry id.
    pub id: Uuid,
    /// Creator.
    pub owner: Uuid,
    /// Amount.
    pub amount: Decimal,
    /// When it was recorded.
    pub created_at: DateTime<Utc>,
}

/// Aggregate ledger state read at the start of an evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    /// Float summary, absent until settings exist.
    pub float: Option<FloatSummary>,
    /// Invoices not yet paid.
    pub open_invoices: Vec<InvoiceFacts>,
    /// Entries awaiting approval.
    pub pending_entries: Vec<PendingEntryFacts>,
}

/// A `(rule, entity)` pair whose predicate currently holds.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    /// Rule key.
    pub rule_key: String,
    /// Entity key, e.g. `invoice:<id>`.
    pub entity_key: String,
    /// Notification to emit if this is a rising edge.
    pub notification: NewNotification,
}

/// The writes an evaluation should attempt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePlan {
    /// Pairs that are newly true.
    pub raise: Vec<Violation>,
    /// Pairs that were active and no longer hold.
    pub clear: Vec<(String, String)>,
}

/// Stateless rule evaluator.
pub struct AlertEvaluator;

impl AlertEvaluator {
    /// Lists every violation of an enabled rule in `snapshot` at `now`.
    #[must_use]
    pub fn violations(rules: &RuleSet, snapshot: &LedgerSnapshot, now: DateTime<Utc>) -> Vec<Violation> {
        let mut out = Vec::new();
        for rule in rules.enabled() {
            match rule.condition {
                AlertCondition::FloatBelowReplenishment => {
                    if let Some(float) = &snapshot.float
                        && float.needs_replenishment
                    {
                        out.push(Self::violation(
                            rule,
                            FLOAT_ENTITY.to_string(),
                            None,
                            "Petty cash float below replenishment threshold".to_string(),
                            json!({
                                "balance": format_amount(float.balance),
                                "replenishment_threshold": format_amount(float.replenishment_threshold),
                                "settings_version": float.settings_version,
                            }),
                        ));
                    }
                }
                AlertCondition::InvoiceOverdue { days } => {
                    let today = now.date_naive();
                    for inv in &snapshot.open_invoices {
                        if Self::is_overdue(inv, days, today) {
                            out.push(Self::violation(
                                rule,
                                format!("invoice:{}", inv.id),
                                Some(inv.owner),
                                format!("Invoice {} is overdue", inv.invoice_number),
                                json!({
                                    "invoice_id": inv.id,
                                    "invoice_number": inv.invoice_number,
                                    "due_date": inv.due_date,
                                    "due_amount": format_amount(inv.due_amount),
                                }),
                            ));
                        }
                    }
                }
                AlertCondition::PendingApprovalStale { hours } => {
                    let cutoff = now - Duration::hours(i64::from(hours));
                    for entry in &snapshot.pending_entries {
                        if entry.created_at < cutoff {
                            out.push(Self::violation(
                                rule,
                                format!("entry:{}", entry.id),
                                Some(entry.owner),
                                "Petty cash entry awaiting approval".to_string(),
                                json!({
                                    "entry_id": entry.id,
                                    "amount": format_amount(entry.amount),
                                    "created_at": entry.created_at,
                                }),
                            ));
                        }
                    }
                }
            }
        }
        out
    }

    /// Splits `violations` against the currently `active` pairs.
    ///
    /// A violation already active is steady state and produces nothing. An
    /// active pair with no violation is cleared, so the next rising edge
    /// fires again. Pairs of rules not enabled in `rules` were not evaluated
    /// and are left untouched.
    #[must_use]
    pub fn edges(
        rules: &RuleSet,
        active: &BTreeSet<(String, String)>,
        violations: Vec<Violation>,
    ) -> EdgePlan {
        let evaluated = rules.enabled_keys();
        let mut current: BTreeMap<(String, String), Violation> = BTreeMap::new();
        for v in violations {
            current
                .entry((v.rule_key.clone(), v.entity_key.clone()))
                .or_insert(v);
        }

        let clear = active
            .iter()
            .filter(|key| evaluated.contains(key.0.as_str()) && !current.contains_key(*key))
            .cloned()
            .collect();
        let raise = current
            .into_iter()
            .filter(|(key, _)| !active.contains(key))
            .map(|(_, v)| v)
            .collect();

        EdgePlan { raise, clear }
    }

    /// `today > due_date + days` for an unpaid invoice with a due date.
    #[must_use]
    pub fn is_overdue(invoice: &InvoiceFacts, days: u32, today: NaiveDate) -> bool {
        if invoice.status == PaymentStatus::Paid {
            return false;
        }
        invoice
            .due_date
            .and_then(|due| due.checked_add_signed(Duration::days(i64::from(days))))
            .is_some_and(|deadline| today > deadline)
    }

    fn violation(
        rule: &AlertRule,
        entity_key: String,
        owner: Option<Uuid>,
        title: String,
        mut payload: serde_json::Value,
    ) -> Violation {
        let recipient = match rule.target {
            AlertTarget::Owner => owner.map_or(Recipient::Broadcast, Recipient::User),
            AlertTarget::Broadcast => Recipient::Broadcast,
            AlertTarget::User { id } => Recipient::User(id),
        };
        if let Some(map) = payload.as_object_mut() {
            map.insert("rule_key".to_string(), json!(rule.key));
        }
        Violation {
            rule_key: rule.key.clone(),
            entity_key,
            notification: NewNotification {
                recipient,
                kind: rule.condition.notification_kind(),
                title,
                payload,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationKind;
    use crate::petty_cash::MovementTotals;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    fn rules() -> RuleSet {
        RuleSet::from_toml(
            r#"
[[rules]]
key = "float-low"
condition = { kind = "float_below_replenishment" }

[[rules]]
key = "overdue"
condition = { kind = "invoice_overdue", days = 5 }

[[rules]]
key = "stale"
condition = { kind = "pending_approval_stale", hours = 24 }
target = { kind = "broadcast" }
"#,
        )
        .unwrap()
    }

    fn invoice(due: NaiveDate, status: PaymentStatus) -> InvoiceFacts {
        InvoiceFacts {
            id: Uuid::new_v4(),
            owner: Uuid::new_v4(),
            invoice_number: "INV-7".into(),
            due_date: Some(due),
            status,
            due_amount: dec!(250),
        }
    }

    fn low_float() -> FloatSummary {
        FloatSummary {
            balance: dec!(150),
            totals: MovementTotals::default(),
            settings_version: 1,
            replenishment_threshold: dec!(200),
            needs_replenishment: true,
        }
    }

    #[test]
    fn test_overdue_boundary() {
        let today = now().date_naive();
        let due = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        // due + 5 days == today: not yet overdue
        assert!(!AlertEvaluator::is_overdue(&invoice(due, PaymentStatus::NotPaid), 5, today));
        let due = NaiveDate::from_ymd_opt(2026, 3, 8).unwrap();
        assert!(AlertEvaluator::is_overdue(&invoice(due, PaymentStatus::PartiallyPaid), 5, today));
        assert!(!AlertEvaluator::is_overdue(&invoice(due, PaymentStatus::Paid), 5, today));

        let mut no_due = invoice(due, PaymentStatus::NotPaid);
        no_due.due_date = None;
        assert!(!AlertEvaluator::is_overdue(&no_due, 0, today));
    }

    #[test]
    fn test_violations_cover_each_rule() {
        let overdue = invoice(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), PaymentStatus::NotPaid);
        let owner = overdue.owner;
        let snapshot = LedgerSnapshot {
            float: Some(low_float()),
            open_invoices: vec![overdue],
            pending_entries: vec![PendingEntryFacts {
                id: Uuid::new_v4(),
                owner: Uuid::new_v4(),
                amount: dec!(500),
                created_at: now() - Duration::hours(30),
            }],
        };

        let v = AlertEvaluator::violations(&rules(), &snapshot, now());
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].entity_key, FLOAT_ENTITY);
        assert_eq!(v[0].notification.recipient, Recipient::Broadcast);
        assert_eq!(v[1].notification.recipient, Recipient::User(owner));
        assert_eq!(v[1].notification.kind, NotificationKind::InvoiceOverdue);
        assert_eq!(v[2].notification.recipient, Recipient::Broadcast);
        assert_eq!(v[1].notification.payload["rule_key"], "overdue");
    }

    #[test]
    fn test_fresh_pending_entry_is_not_stale() {
        let snapshot = LedgerSnapshot {
            pending_entries: vec![PendingEntryFacts {
                id: Uuid::new_v4(),
                owner: Uuid::new_v4(),
                amount: dec!(500),
                created_at: now() - Duration::hours(2),
            }],
            ..LedgerSnapshot::default()
        };
        assert!(AlertEvaluator::violations(&rules(), &snapshot, now()).is_empty());
    }

    #[test]
    fn test_edges_raise_once_then_clear() {
        let snapshot = LedgerSnapshot {
            float: Some(low_float()),
            ..LedgerSnapshot::default()
        };
        let key = ("float-low".to_string(), FLOAT_ENTITY.to_string());

        let first = AlertEvaluator::edges(
            &rules(),
            &BTreeSet::new(),
            AlertEvaluator::violations(&rules(), &snapshot, now()),
        );
        assert_eq!(first.raise.len(), 1);
        assert!(first.clear.is_empty());

        let active = BTreeSet::from([key.clone()]);
        let steady = AlertEvaluator::edges(
            &rules(),
            &active,
            AlertEvaluator::violations(&rules(), &snapshot, now()),
        );
        assert!(steady.raise.is_empty());
        assert!(steady.clear.is_empty());

        let recovered = AlertEvaluator::edges(&rules(), &active, Vec::new());
        assert_eq!(recovered.clear, vec![key]);
    }

    #[test]
    fn test_edges_keep_pairs_of_rules_not_loaded() {
        let active = BTreeSet::from([
            ("float-low".to_string(), FLOAT_ENTITY.to_string()),
            ("retired".to_string(), "invoice:1".to_string()),
        ]);

        let plan = AlertEvaluator::edges(&RuleSet::default(), &active, Vec::new());
        assert!(plan.clear.is_empty());

        let mut disabled = rules();
        disabled.rules[0].enabled = false;
        let plan = AlertEvaluator::edges(&disabled, &active, Vec::new());
        assert!(plan.clear.is_empty());
    }
}
