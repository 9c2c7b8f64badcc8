//! Free-form ledger transaction repository.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use haulbook_core::ledger::{LedgerError, TransactionInput, validate_transaction};
use haulbook_shared::types::PageRequest;

use crate::entities::ledger_transactions;
use crate::storage::StorageError;

/// Ledger transaction repository. Every query is scoped to the owner.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    db: DatabaseConnection,
}

impl TransactionRepository {
    /// Creates a new transaction repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a transaction for `owner_id`.
    ///
    /// # Errors
    ///
    /// `MissingFields` naming every absent required field at once, or a
    /// parse error for the amount or date.
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: &TransactionInput,
    ) -> Result<ledger_transactions::Model, LedgerError> {
        let tx = validate_transaction(input)?;

        let model = ledger_transactions::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            kind: Set(tx.kind),
            date: Set(tx.date),
            item: Set(tx.item),
            service: Set(tx.service),
            payment_method: Set(tx.payment_method),
            amount: Set(tx.amount),
            currency: Set(tx.currency.to_string()),
            status: Set(tx.status),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(StorageError::from)?;

        tracing::info!(transaction_id = %model.id, owner = %owner_id, "Ledger transaction recorded");
        Ok(model)
    }

    /// Lists the owner's transactions, newest first.
    pub async fn list(
        &self,
        owner_id: Uuid,
        page: &PageRequest,
    ) -> Result<(Vec<ledger_transactions::Model>, u64), LedgerError> {
        let query = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::OwnerId.eq(owner_id))
            .order_by_desc(ledger_transactions::Column::Date)
            .order_by_desc(ledger_transactions::Column::CreatedAt);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(StorageError::from)?;
        let rows = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok((rows, total))
    }

    /// Deletes one of the owner's transactions.
    ///
    /// # Errors
    ///
    /// `TransactionNotFound` when the id is absent or belongs to someone else.
    pub async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<(), LedgerError> {
        let result = ledger_transactions::Entity::delete_many()
            .filter(ledger_transactions::Column::Id.eq(id))
            .filter(ledger_transactions::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected == 0 {
            return Err(LedgerError::TransactionNotFound);
        }
        tracing::info!(transaction_id = %id, owner = %owner_id, "Ledger transaction deleted");
        Ok(())
    }
}
