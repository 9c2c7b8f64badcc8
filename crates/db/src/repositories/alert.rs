//! Alert evaluation against the edge-detector memory.
//!
//! A raise is a conditional write: insert the `(rule, entity)` state row if
//! it is absent, or flip it from inactive to active. Only the evaluation
//! whose write changed a row emits the notification, in the same
//! transaction, so overlapping runs cannot notify twice for one edge.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set, TransactionTrait,
};
use serde::Serialize;

use haulbook_core::alerts::{AlertError, AlertEvaluator, LedgerSnapshot, RuleSet};

use super::invoice::InvoiceRepository;
use super::notification::NotificationRepository;
use super::petty_cash::PettyCashRepository;
use crate::entities::alert_states;
use crate::storage::StorageError;

/// One rising edge that produced a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaisedAlert {
    /// Rule key.
    pub rule_key: String,
    /// Entity key.
    pub entity_key: String,
    /// Id of the notification emitted.
    pub notification_id: i64,
}

/// What one evaluation did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationReport {
    /// Edges raised by this run.
    pub raised: Vec<RaisedAlert>,
    /// Pairs this run cleared.
    pub cleared: usize,
}

/// Alert state repository.
#[derive(Debug, Clone)]
pub struct AlertRepository {
    db: DatabaseConnection,
}

impl AlertRepository {
    /// Creates a new alert repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reads the aggregate state the rules look at.
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<LedgerSnapshot, AlertError> {
        Ok(LedgerSnapshot {
            float: PettyCashRepository::float_summary(&self.db, now).await?,
            open_invoices: InvoiceRepository::open_invoices(&self.db).await?,
            pending_entries: PettyCashRepository::pending_entries(&self.db).await?,
        })
    }

    /// Evaluates `rules` at `now`, raising new edges and clearing stale ones.
    pub async fn evaluate(
        &self,
        rules: &RuleSet,
        now: DateTime<Utc>,
    ) -> Result<EvaluationReport, AlertError> {
        let snapshot = self.snapshot(now).await?;
        let violations = AlertEvaluator::violations(rules, &snapshot, now);
        let active = self.active_pairs().await?;
        let plan = AlertEvaluator::edges(rules, &active, violations);

        let mut report = EvaluationReport::default();
        for violation in plan.raise {
            let txn = self.db.begin().await.map_err(StorageError::from)?;
            let won = Self::raise(&txn, &violation.rule_key, &violation.entity_key, now)
                .await
                .map_err(StorageError::from)?;
            if !won {
                txn.rollback().await.map_err(StorageError::from)?;
                continue;
            }
            let notification = NotificationRepository::append(&txn, &violation.notification, now)
                .await
                .map_err(StorageError::from)?;
            txn.commit().await.map_err(StorageError::from)?;

            tracing::info!(
                rule = %violation.rule_key,
                entity = %violation.entity_key,
                notification_id = notification.id,
                "Alert raised"
            );
            report.raised.push(RaisedAlert {
                rule_key: violation.rule_key,
                entity_key: violation.entity_key,
                notification_id: notification.id,
            });
        }

        for (rule_key, entity_key) in plan.clear {
            if Self::clear(&self.db, &rule_key, &entity_key, now)
                .await
                .map_err(StorageError::from)?
            {
                tracing::info!(rule = %rule_key, entity = %entity_key, "Alert cleared");
                report.cleared += 1;
            }
        }

        Ok(report)
    }

    /// Lists every state row, active ones first.
    pub async fn states(&self) -> Result<Vec<alert_states::Model>, AlertError> {
        Ok(alert_states::Entity::find()
            .order_by_desc(alert_states::Column::Active)
            .order_by_asc(alert_states::Column::RuleKey)
            .order_by_asc(alert_states::Column::EntityKey)
            .all(&self.db)
            .await
            .map_err(StorageError::from)?)
    }

    async fn active_pairs(&self) -> Result<BTreeSet<(String, String)>, AlertError> {
        let rows = alert_states::Entity::find()
            .filter(alert_states::Column::Active.eq(true))
            .all(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok(rows
            .into_iter()
            .map(|s| (s.rule_key, s.entity_key))
            .collect())
    }

    /// Returns true if this call moved the pair to active.
    async fn raise<C: ConnectionTrait>(
        conn: &C,
        rule_key: &str,
        entity_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let inserted = alert_states::Entity::insert(alert_states::ActiveModel {
            rule_key: Set(rule_key.to_string()),
            entity_key: Set(entity_key.to_string()),
            active: Set(true),
            last_raised_at: Set(now.into()),
            cleared_at: Set(None),
        })
        .on_conflict(
            OnConflict::columns([alert_states::Column::RuleKey, alert_states::Column::EntityKey])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
        if inserted == 1 {
            return Ok(true);
        }

        let reactivated = alert_states::Entity::update_many()
            .col_expr(alert_states::Column::Active, Expr::value(true))
            .col_expr(
                alert_states::Column::LastRaisedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(alert_states::Column::RuleKey.eq(rule_key))
            .filter(alert_states::Column::EntityKey.eq(entity_key))
            .filter(alert_states::Column::Active.eq(false))
            .exec(conn)
            .await?;
        Ok(reactivated.rows_affected == 1)
    }

    /// Returns true if this call moved the pair to inactive.
    async fn clear<C: ConnectionTrait>(
        conn: &C,
        rule_key: &str,
        entity_key: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, DbErr> {
        let cleared = alert_states::Entity::update_many()
            .col_expr(alert_states::Column::Active, Expr::value(false))
            .col_expr(
                alert_states::Column::ClearedAt,
                Expr::value(Some(sea_orm::prelude::DateTimeWithTimeZone::from(now))),
            )
            .filter(alert_states::Column::RuleKey.eq(rule_key))
            .filter(alert_states::Column::EntityKey.eq(entity_key))
            .filter(alert_states::Column::Active.eq(true))
            .exec(conn)
            .await?;
        Ok(cleared.rows_affected == 1)
    }
}
