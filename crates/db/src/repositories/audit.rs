//! Audit record persistence.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue::NotSet, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use haulbook_core::audit::{AuditEntity, AuditEvent};

use crate::entities::audit_records;
use crate::storage::StorageError;

/// Append-only audit trail shared by every mutating repository.
#[derive(Debug, Clone)]
pub struct AuditRepository {
    db: DatabaseConnection,
}

impl AuditRepository {
    /// Creates a new audit repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Appends `event` on `conn`, which should be the transaction carrying
    /// the change it describes.
    pub async fn record<C: ConnectionTrait>(
        conn: &C,
        event: &AuditEvent,
        now: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let record = audit_records::ActiveModel {
            id: NotSet,
            entity_type: Set(event.entity.as_str().to_string()),
            entity_id: Set(event.entity_id),
            actor_id: Set(event.actor_id),
            action: Set(event.action.to_string()),
            summary: Set(event.summary.clone()),
            created_at: Set(now.into()),
        };
        audit_records::Entity::insert(record)
            .exec_without_returning(conn)
            .await?;
        Ok(())
    }

    /// Lists the records for one entity, oldest first.
    pub async fn history(
        &self,
        entity: AuditEntity,
        entity_id: Uuid,
    ) -> Result<Vec<audit_records::Model>, StorageError> {
        Ok(audit_records::Entity::find()
            .filter(audit_records::Column::EntityType.eq(entity.as_str()))
            .filter(audit_records::Column::EntityId.eq(entity_id))
            .order_by_asc(audit_records::Column::Id)
            .all(&self.db)
            .await?)
    }
}
