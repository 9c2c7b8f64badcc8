//! Alert edge detection tests: one notification per rising edge.

mod common;

use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;
use haulbook_core::alerts::{AlertError, FLOAT_ENTITY, RuleSet};
use haulbook_core::ledger::{InvoiceInput, ReceiptInput};
use haulbook_core::petty_cash::EntryInput;
use haulbook_db::{
    AlertRepository, FloatSettingsRepository, InvoiceRepository, NotificationRepository,
    PettyCashRepository,
};
use haulbook_shared::config::ThresholdOrderPolicy;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use common::{amount, at, settings, setup};

const RULES: &str = r#"
[[rules]]
key = "float-low"
condition = { kind = "float_below_replenishment" }

[[rules]]
key = "overdue-30"
condition = { kind = "invoice_overdue", days = 30 }

[[rules]]
key = "stale-48"
condition = { kind = "pending_approval_stale", hours = 48 }
"#;

fn rules() -> RuleSet {
    RuleSet::from_toml(RULES).unwrap()
}

fn movement(kind: &str, value: &str) -> EntryInput {
    EntryInput {
        transaction_date: Some("2026-03-14".into()),
        description: Some("depot float".into()),
        amount: amount(value),
        transaction_type: Some(kind.into()),
        ..Default::default()
    }
}

async fn with_float() -> DatabaseConnection {
    let db = setup().await;
    let mut input = settings("300", "1000", "200", "500");
    input.activate_at = Some(at(2026, 1, 1, 0));
    FloatSettingsRepository::new(db.clone())
        .activate(Uuid::new_v4(), &input, ThresholdOrderPolicy::Reject, at(2026, 1, 1, 0))
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn test_float_low_notifies_once_per_edge() {
    let db = with_float().await;
    let alerts = AlertRepository::new(db.clone());
    let petty_cash = PettyCashRepository::new(db.clone());
    let notifications = NotificationRepository::new(db);
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert!(report.raised.is_empty());

    petty_cash.create(clerk, &movement("out", "150"), now).await.unwrap();
    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert_eq!(report.raised.len(), 1);
    assert_eq!(report.raised[0].rule_key, "float-low");
    assert_eq!(report.raised[0].entity_key, FLOAT_ENTITY);

    // Still low: no new notification.
    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert!(report.raised.is_empty());
    assert_eq!(report.cleared, 0);
    assert_eq!(notifications.unread_count(Uuid::new_v4()).await.unwrap(), 1);

    petty_cash.create(clerk, &movement("in", "100"), now).await.unwrap();
    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert_eq!(report.cleared, 1);

    petty_cash.create(clerk, &movement("out", "100"), now).await.unwrap();
    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert_eq!(report.raised.len(), 1);
    assert_eq!(notifications.unread_count(Uuid::new_v4()).await.unwrap(), 2);

    let states = alerts.states().await.unwrap();
    assert_eq!(states.len(), 1);
    assert!(states[0].active);
}

#[tokio::test]
async fn test_unavailable_rules_do_not_reset_edges() {
    let db = with_float().await;
    let alerts = AlertRepository::new(db.clone());
    let notifications = NotificationRepository::new(db.clone());
    let now = at(2026, 3, 14, 9);
    PettyCashRepository::new(db)
        .create(Uuid::new_v4(), &movement("out", "150"), now)
        .await
        .unwrap();

    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert_eq!(report.raised.len(), 1);

    assert!(matches!(
        RuleSet::load("/nonexistent/alert_rules"),
        Err(AlertError::RulesUnavailable(_))
    ));
    // An evaluation that loaded no rules leaves existing edges alone.
    let report = alerts.evaluate(&RuleSet::default(), now).await.unwrap();
    assert_eq!(report.cleared, 0);

    let report = alerts.evaluate(&rules(), now).await.unwrap();
    assert!(report.raised.is_empty());
    assert_eq!(notifications.unread_count(Uuid::new_v4()).await.unwrap(), 1);
    assert!(alerts.states().await.unwrap()[0].active);
}

#[tokio::test]
async fn test_concurrent_evaluations_notify_once() {
    let db = with_float().await;
    PettyCashRepository::new(db.clone())
        .create(Uuid::new_v4(), &movement("out", "150"), at(2026, 3, 14, 9))
        .await
        .unwrap();
    let alerts = Arc::new(AlertRepository::new(db.clone()));
    let rules = Arc::new(rules());

    let tasks = (0..5).map(|_| {
        let alerts = Arc::clone(&alerts);
        let rules = Arc::clone(&rules);
        tokio::spawn(async move { alerts.evaluate(&rules, at(2026, 3, 14, 10)).await })
    });
    let raised: usize = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked").unwrap().raised.len())
        .sum();

    assert_eq!(raised, 1);
    let seen = NotificationRepository::new(db)
        .list(Uuid::new_v4(), false, None)
        .await
        .unwrap();
    assert_eq!(seen.len(), 1);
}

#[tokio::test]
async fn test_overdue_invoice_alerts_owner_until_paid() {
    let db = setup().await;
    let alerts = AlertRepository::new(db.clone());
    let invoices = InvoiceRepository::new(db.clone());
    let notifications = NotificationRepository::new(db);
    let owner = Uuid::new_v4();

    let invoice = invoices
        .create(
            owner,
            &InvoiceInput {
                invoice_number: Some("INV-77".into()),
                total: amount("250"),
                issue_date: Some("2026-03-01".into()),
                due_date: Some("2026-03-31".into()),
            },
        )
        .await
        .unwrap();

    let report = alerts.evaluate(&rules(), at(2026, 4, 30, 12)).await.unwrap();
    assert!(report.raised.is_empty());

    let report = alerts.evaluate(&rules(), at(2026, 5, 1, 12)).await.unwrap();
    assert_eq!(report.raised.len(), 1);
    assert_eq!(report.raised[0].entity_key, format!("invoice:{}", invoice.id));

    let inbox = notifications.list(owner, false, None).await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].kind, "invoice_overdue");
    assert!(!inbox[0].broadcast);
    assert_eq!(inbox[0].payload["invoice_number"], "INV-77");
    assert!(notifications.list(Uuid::new_v4(), false, None).await.unwrap().is_empty());

    invoices
        .apply_receipt(
            owner,
            &ReceiptInput {
                invoice_number: Some("INV-77".into()),
                payment_date: Some("2026-05-02".into()),
                payment_method: Some("cash".into()),
                amount_paid: amount("250"),
            },
        )
        .await
        .unwrap();
    let report = alerts.evaluate(&rules(), at(2026, 5, 3, 12)).await.unwrap();
    assert_eq!(report.cleared, 1);
}

#[tokio::test]
async fn test_stale_pending_entry_alerts_its_owner() {
    let db = with_float().await;
    let alerts = AlertRepository::new(db.clone());
    let clerk = Uuid::new_v4();
    let created = at(2026, 3, 14, 9);

    let entry = PettyCashRepository::new(db.clone())
        .create(clerk, &movement("out", "600"), created)
        .await
        .unwrap();

    let report = alerts
        .evaluate(&rules(), created + Duration::hours(47))
        .await
        .unwrap();
    assert!(report.raised.is_empty());

    let report = alerts
        .evaluate(&rules(), created + Duration::hours(49))
        .await
        .unwrap();
    let stale: Vec<_> = report
        .raised
        .iter()
        .filter(|r| r.rule_key == "stale-48")
        .collect();
    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].entity_key, format!("entry:{}", entry.id));

    let inbox = NotificationRepository::new(db)
        .list(clerk, false, None)
        .await
        .unwrap();
    assert!(inbox.iter().any(|n| n.kind == "pending_approval_stale"));
}

#[tokio::test]
async fn test_locked_pending_entry_is_not_stale() {
    let db = with_float().await;
    let alerts = AlertRepository::new(db.clone());
    let entries = PettyCashRepository::new(db);
    let created = at(2026, 3, 14, 9);

    let raised = entries
        .create(Uuid::new_v4(), &movement("out", "600"), created)
        .await
        .unwrap();
    let frozen = entries
        .create(Uuid::new_v4(), &movement("out", "700"), created)
        .await
        .unwrap();
    entries
        .lock(Uuid::new_v4(), frozen.id, created + Duration::hours(1))
        .await
        .unwrap();

    let report = alerts
        .evaluate(&rules(), created + Duration::hours(49))
        .await
        .unwrap();
    let stale: Vec<_> = report
        .raised
        .iter()
        .filter(|r| r.rule_key == "stale-48")
        .map(|r| r.entity_key.clone())
        .collect();
    assert_eq!(stale, vec![format!("entry:{}", raised.id)]);

    // Locking a stale entry takes it out of the approval queue.
    entries
        .lock(Uuid::new_v4(), raised.id, created + Duration::hours(50))
        .await
        .unwrap();
    let report = alerts
        .evaluate(&rules(), created + Duration::hours(51))
        .await
        .unwrap();
    assert!(report.raised.is_empty());
    assert_eq!(report.cleared, 1);
}

#[tokio::test]
async fn test_empty_rule_set_does_nothing() {
    let db = with_float().await;
    let alerts = AlertRepository::new(db);
    let report = alerts
        .evaluate(&RuleSet::default(), at(2026, 3, 14, 9))
        .await
        .unwrap();
    assert_eq!(report, Default::default());
}
