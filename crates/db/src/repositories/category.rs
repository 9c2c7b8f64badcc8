//! Petty cash category repository.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use haulbook_core::audit::{AuditEntity, AuditEvent};
use haulbook_core::petty_cash::{PettyCashError, validate_category_name};

use super::audit::AuditRepository;
use crate::entities::petty_cash_categories;
use crate::storage::{self, StorageError};

/// Petty cash category repository.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    db: DatabaseConnection,
}

impl CategoryRepository {
    /// Creates a new category repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an active category.
    ///
    /// # Errors
    ///
    /// `InvalidCategoryName` or `DuplicateCategory`.
    pub async fn create(
        &self,
        actor_id: Uuid,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_categories::Model, PettyCashError> {
        let name = validate_category_name(name)?;
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        let model = petty_cash_categories::ActiveModel {
            id: Set(Uuid::now_v7()),
            name: Set(name.clone()),
            is_active: Set(true),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            if storage::is_unique_violation(&e) {
                PettyCashError::DuplicateCategory(name.clone())
            } else {
                StorageError::from(e).into()
            }
        })?;

        let event = AuditEvent::new(
            AuditEntity::Category,
            model.id,
            actor_id,
            "create",
            format!("created category '{name}'"),
        );
        AuditRepository::record(&txn, &event, now)
            .await
            .map_err(StorageError::from)?;
        txn.commit().await.map_err(StorageError::from)?;

        Ok(model)
    }

    /// Lists categories by name.
    pub async fn list(
        &self,
        include_inactive: bool,
    ) -> Result<Vec<petty_cash_categories::Model>, PettyCashError> {
        let mut query = petty_cash_categories::Entity::find();
        if !include_inactive {
            query = query.filter(petty_cash_categories::Column::IsActive.eq(true));
        }
        Ok(query
            .order_by_asc(petty_cash_categories::Column::Name)
            .all(&self.db)
            .await
            .map_err(StorageError::from)?)
    }

    /// Deactivates a category. Existing entries keep referring to it; new
    /// entries may not.
    pub async fn deactivate(
        &self,
        actor_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_categories::Model, PettyCashError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let category = petty_cash_categories::Entity::find_by_id(id)
            .one(&txn)
            .await
            .map_err(StorageError::from)?
            .ok_or(PettyCashError::CategoryNotFound)?;

        let name = category.name.clone();
        let mut active: petty_cash_categories::ActiveModel = category.into();
        active.is_active = Set(false);
        let model = active.update(&txn).await.map_err(StorageError::from)?;

        let event = AuditEvent::new(
            AuditEntity::Category,
            id,
            actor_id,
            "deactivate",
            format!("deactivated category '{name}'"),
        );
        AuditRepository::record(&txn, &event, now)
            .await
            .map_err(StorageError::from)?;
        txn.commit().await.map_err(StorageError::from)?;

        Ok(model)
    }

    /// Fails with `InvalidCategory` unless `id` names an active category.
    pub(crate) async fn ensure_active<C: ConnectionTrait>(
        conn: &C,
        id: Uuid,
    ) -> Result<(), PettyCashError> {
        let found = petty_cash_categories::Entity::find_by_id(id)
            .filter(petty_cash_categories::Column::IsActive.eq(true))
            .one(conn)
            .await
            .map_err(StorageError::from)?;
        found.map(|_| ()).ok_or(PettyCashError::InvalidCategory)
    }
}
