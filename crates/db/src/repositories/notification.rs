//! Notification repository.
//!
//! Personal notifications carry their read flag on the row. Broadcasts
//! (`user_id` null) are read per user through `notification_reads`.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set, TransactionTrait,
};
use serde::Serialize;
use std::collections::HashSet;
use uuid::Uuid;

use haulbook_core::notification::{
    NewNotification, NotificationError, NotificationInput, validate_notification,
};
use haulbook_shared::types::clamp_limit;

use crate::entities::{notification_reads, notifications};
use crate::storage::StorageError;

/// A notification as one user sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationView {
    /// Notification id.
    pub id: i64,
    /// Kind, e.g. `invoice_overdue`.
    pub kind: String,
    /// Headline.
    pub title: String,
    /// Structured detail.
    pub payload: serde_json::Value,
    /// True for broadcasts.
    pub broadcast: bool,
    /// Whether this user has read it.
    pub read: bool,
    /// When it was created.
    pub created_at: DateTime<Utc>,
}

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Validates and appends a manually created notification.
    pub async fn create(
        &self,
        input: &NotificationInput,
        now: DateTime<Utc>,
    ) -> Result<notifications::Model, NotificationError> {
        let notification = validate_notification(input)?;
        let model = Self::append(&self.db, &notification, now)
            .await
            .map_err(StorageError::from)?;
        tracing::info!(notification_id = model.id, kind = %notification.kind, "Notification created");
        Ok(model)
    }

    /// Appends a notification on `conn`.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        notification: &NewNotification,
        now: DateTime<Utc>,
    ) -> Result<notifications::Model, DbErr> {
        notifications::ActiveModel {
            id: NotSet,
            user_id: Set(notification.recipient.user_id()),
            kind: Set(notification.kind.as_str().to_string()),
            title: Set(notification.title.clone()),
            payload: Set(notification.payload.clone()),
            is_read: Set(false),
            created_at: Set(now.into()),
        }
        .insert(conn)
        .await
    }

    /// Lists what `user_id` can see, newest first.
    ///
    /// `limit` is clamped to `1..=100` and defaults to 20.
    pub async fn list(
        &self,
        user_id: Uuid,
        unread_only: bool,
        limit: Option<u32>,
    ) -> Result<Vec<NotificationView>, NotificationError> {
        let condition = if unread_only {
            unread_by(user_id)
        } else {
            visible_to(user_id)
        };
        let rows = notifications::Entity::find()
            .filter(condition)
            .order_by_desc(notifications::Column::Id)
            .limit(u64::from(clamp_limit(limit)))
            .all(&self.db)
            .await
            .map_err(StorageError::from)?;

        let broadcast_ids: Vec<i64> = rows
            .iter()
            .filter(|n| n.user_id.is_none())
            .map(|n| n.id)
            .collect();
        let read_broadcasts: HashSet<i64> = if broadcast_ids.is_empty() {
            HashSet::new()
        } else {
            notification_reads::Entity::find()
                .filter(notification_reads::Column::UserId.eq(user_id))
                .filter(notification_reads::Column::NotificationId.is_in(broadcast_ids))
                .all(&self.db)
                .await
                .map_err(StorageError::from)?
                .into_iter()
                .map(|r| r.notification_id)
                .collect()
        };

        Ok(rows
            .into_iter()
            .map(|n| {
                let broadcast = n.user_id.is_none();
                let read = if broadcast {
                    read_broadcasts.contains(&n.id)
                } else {
                    n.is_read
                };
                NotificationView {
                    id: n.id,
                    kind: n.kind,
                    title: n.title,
                    payload: n.payload,
                    broadcast,
                    read,
                    created_at: n.created_at.with_timezone(&Utc),
                }
            })
            .collect())
    }

    /// Marks one notification read for `user_id`. Idempotent.
    ///
    /// # Errors
    ///
    /// `NotFound` when the id is absent or addressed to another user.
    pub async fn mark_read(
        &self,
        user_id: Uuid,
        id: i64,
        now: DateTime<Utc>,
    ) -> Result<(), NotificationError> {
        let notification = notifications::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?
            .ok_or(NotificationError::NotFound)?;

        match notification.user_id {
            Some(owner) if owner == user_id => {
                let mut active: notifications::ActiveModel = notification.into();
                active.is_read = Set(true);
                active.update(&self.db).await.map_err(StorageError::from)?;
            }
            Some(_) => return Err(NotificationError::NotFound),
            None => {
                Self::record_reads(&self.db, user_id, &[id], now)
                    .await
                    .map_err(StorageError::from)?;
            }
        }
        Ok(())
    }

    /// Marks everything `user_id` can see as read and returns how many
    /// notifications changed.
    pub async fn mark_all_read(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, NotificationError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        let personal = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::UserId.eq(user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(&txn)
            .await
            .map_err(StorageError::from)?
            .rows_affected;

        let unread_broadcasts: Vec<i64> = notifications::Entity::find()
            .select_only()
            .column(notifications::Column::Id)
            .filter(unread_by(user_id))
            .filter(notifications::Column::UserId.is_null())
            .into_tuple()
            .all(&txn)
            .await
            .map_err(StorageError::from)?;
        Self::record_reads(&txn, user_id, &unread_broadcasts, now)
            .await
            .map_err(StorageError::from)?;

        txn.commit().await.map_err(StorageError::from)?;
        Ok(personal + u64::try_from(unread_broadcasts.len()).unwrap_or(u64::MAX))
    }

    /// Counts what `user_id` has not read yet.
    pub async fn unread_count(&self, user_id: Uuid) -> Result<u64, NotificationError> {
        Ok(notifications::Entity::find()
            .filter(unread_by(user_id))
            .count(&self.db)
            .await
            .map_err(StorageError::from)?)
    }

    async fn record_reads<C: ConnectionTrait>(
        conn: &C,
        user_id: Uuid,
        ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        if ids.is_empty() {
            return Ok(());
        }
        let rows = ids.iter().map(|&id| notification_reads::ActiveModel {
            notification_id: Set(id),
            user_id: Set(user_id),
            read_at: Set(now.into()),
        });
        notification_reads::Entity::insert_many(rows)
            .on_conflict(
                OnConflict::columns([
                    notification_reads::Column::NotificationId,
                    notification_reads::Column::UserId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }
}

fn visible_to(user_id: Uuid) -> Condition {
    Condition::any()
        .add(notifications::Column::UserId.eq(user_id))
        .add(notifications::Column::UserId.is_null())
}

fn unread_by(user_id: Uuid) -> Condition {
    let read_by_user = Query::select()
        .column(notification_reads::Column::NotificationId)
        .from(notification_reads::Entity)
        .and_where(notification_reads::Column::UserId.eq(user_id))
        .to_owned();

    Condition::any()
        .add(
            Condition::all()
                .add(notifications::Column::UserId.eq(user_id))
                .add(notifications::Column::IsRead.eq(false)),
        )
        .add(
            Condition::all()
                .add(notifications::Column::UserId.is_null())
                .add(notifications::Column::Id.not_in_subquery(read_by_user)),
        )
}
