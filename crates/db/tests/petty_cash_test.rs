//! Petty cash workflow, float limit, and settings versioning tests.

#![allow(clippy::uninlined_format_args)]

mod common;

use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;
use haulbook_core::petty_cash::{EntryInput, EntryPatch, LimitKind, PettyCashError, SettingsInput};
use haulbook_db::entities::sea_orm_active_enums::ApprovalStatus;
use haulbook_core::audit::AuditEntity;
use haulbook_db::{
    AuditRepository, CategoryRepository, EntryFilter, FloatSettingsRepository, PettyCashRepository,
};
use haulbook_shared::config::ThresholdOrderPolicy;
use haulbook_shared::types::PageRequest;
use rust_decimal_macros::dec;
use sea_orm::{ConnectionTrait, DatabaseConnection};
use uuid::Uuid;

use common::{amount, at, settings, setup};

fn entry(kind: &str, value: &str, date: &str) -> EntryInput {
    EntryInput {
        transaction_date: Some(date.into()),
        description: Some("fuel top-up".into()),
        amount: amount(value),
        transaction_type: Some(kind.into()),
        ..Default::default()
    }
}

async fn configured(input: &SettingsInput) -> DatabaseConnection {
    let db = setup().await;
    let mut input = input.clone();
    input.activate_at = input.activate_at.or(Some(at(2026, 1, 1, 0)));
    FloatSettingsRepository::new(db.clone())
        .activate(Uuid::new_v4(), &input, ThresholdOrderPolicy::Reject, at(2026, 1, 1, 0))
        .await
        .unwrap();
    db
}

#[tokio::test]
async fn test_entry_requires_settings() {
    let repo = PettyCashRepository::new(setup().await);
    let err = repo
        .create(Uuid::new_v4(), &entry("out", "10", "2026-03-14"), at(2026, 3, 14, 9))
        .await
        .unwrap_err();
    assert!(matches!(err, PettyCashError::SettingsNotConfigured));
}

#[tokio::test]
async fn test_threshold_splits_auto_approval_and_pending() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let repo = PettyCashRepository::new(db);
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    let small = repo.create(clerk, &entry("out", "500", "2026-03-14"), now).await.unwrap();
    assert_eq!(small.approval_status, ApprovalStatus::Approved);
    assert!(small.auto_approved);
    assert_eq!(small.settings_version, 1);

    let large = repo.create(clerk, &entry("out", "500.01", "2026-03-14"), now).await.unwrap();
    assert_eq!(large.approval_status, ApprovalStatus::Pending);
    assert!(!large.auto_approved);

    let summary = repo.summary(now).await.unwrap();
    assert_eq!(summary.balance, dec!(500));
    assert_eq!(summary.totals.pending_out, dec!(500.01));
    assert!(!summary.needs_replenishment);
}

#[tokio::test]
async fn test_approval_rules() {
    let db = configured(&settings("1000", "2000", "200", "100")).await;
    let repo = PettyCashRepository::new(db);
    let clerk = Uuid::new_v4();
    let approver = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    repo.create(clerk, &entry("out", "100", "2026-03-14"), now).await.unwrap();
    let pending = repo.create(clerk, &entry("out", "950", "2026-03-14"), now).await.unwrap();

    let err = repo.approve(clerk, pending.id, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::SelfApproval));

    let err = repo.approve(approver, pending.id, now).await.unwrap_err();
    match err {
        PettyCashError::LimitExceeded { kind, limit, .. } => {
            assert_eq!(kind, LimitKind::AvailableFloat);
            assert_eq!(limit, dec!(900));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = repo.reject(approver, pending.id, "  ", now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::RejectionReasonRequired));

    let rejected = repo
        .reject(approver, pending.id, "no receipt", now)
        .await
        .unwrap();
    assert_eq!(rejected.approval_status, ApprovalStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("no receipt"));
    assert_eq!(rejected.approver_id, Some(approver));

    let err = repo.approve(approver, pending.id, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::InvalidTransition { .. }));
}

#[tokio::test]
async fn test_pending_entry_approved_applies_to_float() {
    let db = configured(&settings("1000", "2000", "200", "100")).await;
    let repo = PettyCashRepository::new(db);
    let now = at(2026, 3, 14, 9);

    let pending = repo
        .create(Uuid::new_v4(), &entry("out", "850", "2026-03-14"), now)
        .await
        .unwrap();
    let approver = Uuid::new_v4();
    let approved = repo.approve(approver, pending.id, now).await.unwrap();
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert!(!approved.auto_approved);

    let summary = repo.summary(now).await.unwrap();
    assert_eq!(summary.balance, dec!(150));
    assert!(summary.needs_replenishment);
}

#[tokio::test]
async fn test_locked_entries_are_frozen() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let repo = PettyCashRepository::new(db);
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    let created = repo.create(clerk, &entry("out", "20", "2026-03-14"), now).await.unwrap();
    let locked = repo.lock(Uuid::new_v4(), created.id, now).await.unwrap();
    assert!(locked.is_locked);

    let patch = EntryPatch {
        notes: Some("late note".into()),
        ..Default::default()
    };
    let err = repo.update(clerk, created.id, &patch, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::Locked));

    let err = repo.delete(clerk, created.id, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::Locked));

    let err = repo.lock(Uuid::new_v4(), created.id, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::Locked));
}

#[tokio::test]
async fn test_financial_fields_frozen_after_decision() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let repo = PettyCashRepository::new(db);
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    let approved = repo.create(clerk, &entry("out", "20", "2026-03-14"), now).await.unwrap();
    let patch = EntryPatch {
        amount: amount("25"),
        ..Default::default()
    };
    let err = repo.update(clerk, approved.id, &patch, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::FinancialFieldsFrozen));

    let patch = EntryPatch {
        description: Some("fuel, depot 4".into()),
        beneficiary: Some(String::new()),
        ..Default::default()
    };
    let updated = repo.update(clerk, approved.id, &patch, now).await.unwrap();
    assert_eq!(updated.description, "fuel, depot 4");
    assert_eq!(updated.beneficiary, None);

    let pending = repo.create(clerk, &entry("out", "600", "2026-03-14"), now).await.unwrap();
    let patch = EntryPatch {
        amount: amount("650"),
        ..Default::default()
    };
    let updated = repo.update(clerk, pending.id, &patch, now).await.unwrap();
    assert_eq!(updated.amount, dec!(650));
}

#[tokio::test]
async fn test_update_audit_lists_only_changed_fields() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let repo = PettyCashRepository::new(db.clone());
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);
    let pending = repo.create(clerk, &entry("out", "600", "2026-03-14"), now).await.unwrap();

    let same = EntryPatch {
        description: Some("fuel top-up".into()),
        amount: amount("600.00"),
        transaction_type: Some("out".into()),
        ..Default::default()
    };
    repo.update(clerk, pending.id, &same, now).await.unwrap();

    let notes = EntryPatch {
        notes: Some("depot 4".into()),
        ..same
    };
    repo.update(clerk, pending.id, &notes, now).await.unwrap();

    let history = AuditRepository::new(db)
        .history(AuditEntity::PettyCashEntry, pending.id)
        .await
        .unwrap();
    let summaries: Vec<_> = history.iter().skip(1).map(|h| h.summary.as_str()).collect();
    assert_eq!(summaries, vec!["no changes", "updated notes"]);
}

#[tokio::test]
async fn test_update_and_delete_scoped_to_owner() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let repo = PettyCashRepository::new(db);
    let now = at(2026, 3, 14, 9);
    let created = repo
        .create(Uuid::new_v4(), &entry("out", "20", "2026-03-14"), now)
        .await
        .unwrap();

    let stranger = Uuid::new_v4();
    let err = repo
        .update(stranger, created.id, &EntryPatch::default(), now)
        .await
        .unwrap_err();
    assert!(matches!(err, PettyCashError::EntryNotFound));
    let err = repo.delete(stranger, created.id, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::EntryNotFound));
}

#[tokio::test]
async fn test_future_settings_do_not_govern_earlier_entries() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let settings_repo = FloatSettingsRepository::new(db.clone());
    let repo = PettyCashRepository::new(db);
    let now = at(2026, 3, 14, 9);

    let mut stricter = settings("1000", "2000", "200", "100");
    stricter.activate_at = Some(now + Duration::days(1));
    let v2 = settings_repo
        .activate(Uuid::new_v4(), &stricter, ThresholdOrderPolicy::Reject, now)
        .await
        .unwrap();
    assert_eq!(v2.version, 2);

    let today = repo
        .create(Uuid::new_v4(), &entry("out", "300", "2026-03-14"), now)
        .await
        .unwrap();
    assert_eq!(today.approval_status, ApprovalStatus::Approved);
    assert_eq!(today.settings_version, 1);

    let later = now + Duration::days(2);
    let next_week = repo
        .create(Uuid::new_v4(), &entry("out", "300", "2026-03-16"), later)
        .await
        .unwrap();
    assert_eq!(next_week.approval_status, ApprovalStatus::Pending);
    assert_eq!(next_week.settings_version, 2);

    assert_eq!(settings_repo.current(now).await.unwrap().version, 1);
    assert_eq!(settings_repo.current(later).await.unwrap().version, 2);
    let versions: Vec<_> = settings_repo
        .history()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.version)
        .collect();
    assert_eq!(versions, vec![2, 1]);
}

#[tokio::test]
async fn test_threshold_order_policy() {
    let db = setup().await;
    let repo = FloatSettingsRepository::new(db);
    let out_of_order = settings("100", "1000", "50", "1500");
    let now = at(2026, 3, 14, 9);

    let err = repo
        .activate(Uuid::new_v4(), &out_of_order, ThresholdOrderPolicy::Reject, now)
        .await
        .unwrap_err();
    assert!(matches!(err, PettyCashError::ThresholdOrder { .. }));

    let v1 = repo
        .activate(Uuid::new_v4(), &out_of_order, ThresholdOrderPolicy::Warn, now)
        .await
        .unwrap();
    assert_eq!(v1.version, 1);
}

#[tokio::test]
async fn test_activation_losing_its_version_is_transient() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let repo = FloatSettingsRepository::new(db.clone());
    let now = at(2026, 3, 14, 9);

    // Version 2 appears just before every insert of it, as if another
    // activation had committed first.
    db.execute_unprepared(
        "CREATE TRIGGER version_taken BEFORE INSERT ON float_settings WHEN NEW.version = 2 \
         BEGIN INSERT INTO float_settings (version, activated_at, initial_float, max_limit, \
         replenishment_threshold, approval_threshold, updated_by, created_at) \
         SELECT 2, activated_at, initial_float, max_limit, replenishment_threshold, \
         approval_threshold, updated_by, created_at FROM float_settings WHERE version = 1; END",
    )
    .await
    .unwrap();

    let input = settings("1000", "2000", "200", "100");
    let err = repo
        .activate(Uuid::new_v4(), &input, ThresholdOrderPolicy::Reject, now)
        .await
        .unwrap_err();
    assert!(matches!(err, PettyCashError::Transient(_)), "{err}");
    assert_eq!(repo.history().await.unwrap().len(), 1);

    db.execute_unprepared("DROP TRIGGER version_taken").await.unwrap();
    let v2 = repo
        .activate(Uuid::new_v4(), &input, ThresholdOrderPolicy::Reject, now)
        .await
        .unwrap();
    assert_eq!(v2.version, 2);
    assert_eq!(repo.current(now).await.unwrap().limits.approval_threshold, dec!(100));
}

#[tokio::test]
async fn test_daily_limit_and_max_limit() {
    let mut input = settings("1000", "1000", "100", "500");
    input.daily_limit = amount("300");
    let db = configured(&input).await;
    let repo = PettyCashRepository::new(db);
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    repo.create(clerk, &entry("out", "200", "2026-03-14"), now).await.unwrap();
    let err = repo
        .create(clerk, &entry("out", "150", "2026-03-14"), now)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PettyCashError::LimitExceeded { kind: LimitKind::DailyLimit, .. }
    ));
    repo.create(clerk, &entry("out", "150", "2026-03-15"), now).await.unwrap();

    // Balance is 650 with a 1000 ceiling.
    let err = repo
        .create(clerk, &entry("in", "400", "2026-03-15"), now)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PettyCashError::LimitExceeded { kind: LimitKind::MaxLimit, .. }
    ));
    repo.create(clerk, &entry("in", "350", "2026-03-15"), now).await.unwrap();
}

#[tokio::test]
async fn test_inactive_category_rejected() {
    let db = configured(&settings("1000", "2000", "200", "500")).await;
    let categories = CategoryRepository::new(db.clone());
    let repo = PettyCashRepository::new(db);
    let admin = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    let fuel = categories.create(admin, "Fuel", now).await.unwrap();
    let err = categories.create(admin, "Fuel", now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::DuplicateCategory(_)));

    let mut input = entry("out", "20", "2026-03-14");
    input.category_id = Some(fuel.id);
    repo.create(admin, &input, now).await.unwrap();

    categories.deactivate(admin, fuel.id, now).await.unwrap();
    let err = repo.create(admin, &input, now).await.unwrap_err();
    assert!(matches!(err, PettyCashError::InvalidCategory));
    assert!(categories.list(false).await.unwrap().is_empty());
    assert_eq!(categories.list(true).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_concurrent_outflows_cannot_overdraw() {
    let db = configured(&settings("1000", "2000", "100", "1000")).await;
    let repo = Arc::new(PettyCashRepository::new(db));
    let now = at(2026, 3, 14, 9);

    let tasks = (0..10).map(|_| {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move {
            repo.create(Uuid::new_v4(), &entry("out", "150", "2026-03-14"), now)
                .await
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 6);
    assert_eq!(repo.summary(now).await.unwrap().balance, dec!(100));
}

#[tokio::test]
async fn test_list_filters() {
    let db = configured(&settings("1000", "2000", "200", "100")).await;
    let repo = PettyCashRepository::new(db);
    let clerk = Uuid::new_v4();
    let now = at(2026, 3, 14, 9);

    repo.create(clerk, &entry("out", "50", "2026-03-01"), now).await.unwrap();
    repo.create(clerk, &entry("out", "300", "2026-03-10"), now).await.unwrap();
    repo.create(Uuid::new_v4(), &entry("out", "60", "2026-03-12"), now)
        .await
        .unwrap();

    let pending = EntryFilter {
        status: Some(haulbook_core::petty_cash::ApprovalStatus::Pending),
        ..Default::default()
    };
    let (rows, total) = repo.list(&pending, &PageRequest::default()).await.unwrap();
    assert_eq!(total, 1);
    assert_eq!(rows[0].amount, dec!(300));

    let mine_since = EntryFilter {
        owner: Some(clerk),
        from: chrono::NaiveDate::from_ymd_opt(2026, 3, 5),
        ..Default::default()
    };
    let (rows, _) = repo.list(&mine_since, &PageRequest::default()).await.unwrap();
    assert_eq!(rows.len(), 1);
}
