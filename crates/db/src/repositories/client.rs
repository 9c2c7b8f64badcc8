//! Client account repository.
//!
//! Every mutation writes the account and its audit record in one
//! transaction. Updates always append a history entry, with the summary
//! `no changes` when the patch left the account as it was.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use haulbook_core::audit::{AuditEntity, AuditEvent};
use haulbook_core::ledger::{
    ClientInput, ClientPatch, ClientState, LedgerError, NO_CHANGES, apply_client_patch, diff_clients,
    summarize_changes, validate_new_client,
};
use haulbook_shared::types::PageRequest;

use super::audit::AuditRepository;
use super::normalize;
use crate::entities::{audit_records, clients};
use crate::storage::{self, StorageError};

/// Outcome of a bulk client import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    /// Rows that created a new account.
    pub created: usize,
    /// Rows that changed an existing account.
    pub updated: usize,
    /// Rows that matched an existing account exactly.
    pub unchanged: usize,
}

/// An updated account together with the change summary that was recorded.
#[derive(Debug, Clone)]
pub struct ClientUpdate {
    /// The account after the update.
    pub client: clients::Model,
    /// The recorded summary.
    pub summary: String,
}

/// Client account repository.
#[derive(Debug, Clone)]
pub struct ClientRepository {
    db: DatabaseConnection,
}

impl ClientRepository {
    /// Creates a new client repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a client account.
    ///
    /// # Errors
    ///
    /// Validation errors from the input, `DuplicateRegistration` when the
    /// registration number is taken.
    pub async fn create(
        &self,
        actor_id: Uuid,
        input: &ClientInput,
    ) -> Result<clients::Model, LedgerError> {
        let state = validate_new_client(input)?;
        let now = Utc::now();

        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let model = Self::insert_client(&txn, actor_id, &state, now).await?;
        txn.commit().await.map_err(StorageError::from)?;

        tracing::info!(client_id = %model.id, actor = %actor_id, "Client account created");
        Ok(model)
    }

    /// Fetches a client account.
    pub async fn get(&self, id: Uuid) -> Result<clients::Model, LedgerError> {
        clients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?
            .ok_or(LedgerError::ClientNotFound)
    }

    /// Lists client accounts by name.
    pub async fn list(&self, page: &PageRequest) -> Result<(Vec<clients::Model>, u64), LedgerError> {
        let query = clients::Entity::find().order_by_asc(clients::Column::Name);
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

    /// Applies `patch` to an account and records the field-level changes.
    ///
    /// # Errors
    ///
    /// `ClientNotFound`, validation errors from the patch, or
    /// `DuplicateRegistration`.
    pub async fn update(
        &self,
        actor_id: Uuid,
        id: Uuid,
        patch: &ClientPatch,
    ) -> Result<ClientUpdate, LedgerError> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        let current = clients::Entity::find_by_id(id)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(StorageError::from)?
            .ok_or(LedgerError::ClientNotFound)?;

        let (client, summary) = Self::apply_patch(&txn, actor_id, current, patch, now).await?;
        txn.commit().await.map_err(StorageError::from)?;

        tracing::info!(client_id = %id, actor = %actor_id, changes = %summary, "Client account updated");
        Ok(ClientUpdate { client, summary })
    }

    /// Creates or updates accounts keyed by registration number.
    ///
    /// The batch is all-or-nothing: the first failing row rolls back every
    /// row before it.
    ///
    /// # Errors
    ///
    /// `ImportRow` naming the one-based row that failed.
    pub async fn import(
        &self,
        actor_id: Uuid,
        rows: &[ClientInput],
    ) -> Result<ImportSummary, LedgerError> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let mut summary = ImportSummary::default();

        for (index, row) in rows.iter().enumerate() {
            let at_row = |source: LedgerError| LedgerError::ImportRow {
                row: index + 1,
                source: Box::new(source),
            };

            let registration = row
                .registration_number
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .ok_or_else(|| at_row(LedgerError::MissingFields(vec!["registration_number"])))?;

            let existing = clients::Entity::find()
                .filter(clients::Column::RegistrationNumber.eq(registration))
                .lock_exclusive()
                .one(&txn)
                .await
                .map_err(|e| at_row(StorageError::from(e).into()))?;

            match existing {
                Some(current) => {
                    let patch = ClientPatch::from_input(row);
                    let (_, changes) = Self::apply_patch(&txn, actor_id, current, &patch, now)
                        .await
                        .map_err(at_row)?;
                    if changes == NO_CHANGES {
                        summary.unchanged += 1;
                    } else {
                        summary.updated += 1;
                    }
                }
                None => {
                    let state = validate_new_client(row).map_err(at_row)?;
                    Self::insert_client(&txn, actor_id, &state, now)
                        .await
                        .map_err(at_row)?;
                    summary.created += 1;
                }
            }
        }

        txn.commit().await.map_err(StorageError::from)?;
        tracing::info!(
            actor = %actor_id,
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            "Client import committed"
        );
        Ok(summary)
    }

    /// Lists an account's change history, oldest first.
    pub async fn history(&self, id: Uuid) -> Result<Vec<audit_records::Model>, LedgerError> {
        self.get(id).await?;
        Ok(AuditRepository::new(self.db.clone())
            .history(AuditEntity::Client, id)
            .await?)
    }

    async fn insert_client<C: ConnectionTrait>(
        conn: &C,
        actor_id: Uuid,
        state: &ClientState,
        now: DateTime<Utc>,
    ) -> Result<clients::Model, LedgerError> {
        let id = Uuid::now_v7();
        let model = clients::ActiveModel {
            id: Set(id),
            name: Set(state.name.clone()),
            registration_number: Set(state.registration_number.clone()),
            responsible_party: Set(state.responsible_party.clone()),
            tax_id: Set(state.tax_id.clone()),
            currency: Set(state.currency.to_string()),
            amount: Set(state.amount),
            paid_amount: Set(state.paid_amount),
            due_amount: Set(state.due_amount),
            status: Set(state.status.into()),
            created_by: Set(actor_id),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(conn)
        .await
        .map_err(|e| registration_error(e, &state.registration_number))?;

        let event = AuditEvent::new(
            AuditEntity::Client,
            id,
            actor_id,
            "create",
            format!("created client '{}'", state.name),
        );
        AuditRepository::record(conn, &event, now)
            .await
            .map_err(StorageError::from)?;
        Ok(model)
    }

    async fn apply_patch<C: ConnectionTrait>(
        conn: &C,
        actor_id: Uuid,
        current: clients::Model,
        patch: &ClientPatch,
        now: DateTime<Utc>,
    ) -> Result<(clients::Model, String), LedgerError> {
        let prev = state_of(&current)?;
        let next = apply_client_patch(&prev, patch)?;
        let changes = diff_clients(&prev, &next);
        let summary = summarize_changes(&changes);
        let id = current.id;

        let client = if changes.is_empty() {
            current
        } else {
            let mut active: clients::ActiveModel = current.into();
            active.name = Set(next.name.clone());
            active.registration_number = Set(next.registration_number.clone());
            active.responsible_party = Set(next.responsible_party.clone());
            active.tax_id = Set(next.tax_id.clone());
            active.currency = Set(next.currency.to_string());
            active.amount = Set(next.amount);
            active.paid_amount = Set(next.paid_amount);
            active.due_amount = Set(next.due_amount);
            active.status = Set(next.status.into());
            active.updated_at = Set(now.into());
            active
                .update(conn)
                .await
                .map_err(|e| registration_error(e, &next.registration_number))?
        };

        let event = AuditEvent::new(AuditEntity::Client, id, actor_id, "update", summary.clone());
        AuditRepository::record(conn, &event, now)
            .await
            .map_err(StorageError::from)?;
        Ok((client, summary))
    }
}

fn state_of(model: &clients::Model) -> Result<ClientState, LedgerError> {
    let currency = model
        .currency
        .parse()
        .map_err(|reason| LedgerError::InvalidField {
            field: "currency",
            reason,
        })?;
    Ok(ClientState {
        name: model.name.clone(),
        registration_number: model.registration_number.clone(),
        responsible_party: model.responsible_party.clone(),
        tax_id: model.tax_id.clone(),
        currency,
        amount: normalize(model.amount),
        paid_amount: normalize(model.paid_amount),
        due_amount: normalize(model.due_amount),
        status: model.status.into(),
    })
}

fn registration_error(err: DbErr, registration: &str) -> LedgerError {
    if storage::is_unique_violation(&err) {
        LedgerError::DuplicateRegistration(registration.to_string())
    } else {
        StorageError::from(err).into()
    }
}
