//! Petty cash entry repository.
//!
//! Every mutation that can move the float locks the governing settings row
//! first, so balance and period checks and the write that follows them run
//! without a concurrent mutation in between.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use uuid::Uuid;

use haulbook_core::alerts::PendingEntryFacts;
use haulbook_core::audit::{AuditEntity, AuditEvent};
use haulbook_core::ledger::NO_CHANGES;
use haulbook_core::petty_cash::{
    self as domain, Decision, EntryInput, EntryPatch, EntryState, FloatLimits, FloatService,
    FloatSummary, MovementTotals, PeriodUsage, PettyCashError, PettyCashWorkflow, validate_entry,
    validate_patch,
};
use haulbook_shared::types::{PageRequest, format_amount};

use super::audit::AuditRepository;
use super::category::CategoryRepository;
use super::float_settings::FloatSettingsRepository;
use super::normalize;
use crate::entities::petty_cash_entries;
use crate::entities::sea_orm_active_enums::{ApprovalStatus, EntryType};
use crate::storage::StorageError;

/// Filters for listing petty cash entries.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    /// Only entries created by this user.
    pub owner: Option<Uuid>,
    /// Only entries in this status.
    pub status: Option<domain::ApprovalStatus>,
    /// Earliest transaction date, inclusive.
    pub from: Option<NaiveDate>,
    /// Latest transaction date, inclusive.
    pub to: Option<NaiveDate>,
}

/// Petty cash entry repository.
#[derive(Debug, Clone)]
pub struct PettyCashRepository {
    db: DatabaseConnection,
}

impl PettyCashRepository {
    /// Creates a new petty cash repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a movement.
    ///
    /// Entries at or below the governing approval threshold are approved on
    /// the spot and must fit the float; larger ones wait as pending.
    ///
    /// # Errors
    ///
    /// Validation errors, `InvalidCategory`, `SettingsNotConfigured`, or
    /// `LimitExceeded` for an auto-approved entry that breaches a bound.
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: &EntryInput,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let entry = validate_entry(input)?;
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        if let Some(category_id) = entry.category_id {
            CategoryRepository::ensure_active(&txn, category_id).await?;
        }

        let settings = FloatSettingsRepository::governing(&txn, now).await?;
        let status =
            PettyCashWorkflow::initial_status(entry.amount, settings.limits.approval_threshold);
        let auto_approved = status == domain::ApprovalStatus::Approved;
        if auto_approved {
            Self::check_float(
                &txn,
                &settings.limits,
                entry.entry_type,
                entry.amount,
                entry.transaction_date,
            )
            .await?;
        }

        let id = Uuid::now_v7();
        let model = petty_cash_entries::ActiveModel {
            id: Set(id),
            owner_id: Set(owner_id),
            transaction_date: Set(entry.transaction_date),
            description: Set(entry.description),
            beneficiary: Set(entry.beneficiary),
            purpose: Set(entry.purpose),
            amount: Set(entry.amount),
            transaction_type: Set(entry.entry_type.into()),
            category_id: Set(entry.category_id),
            payment_method: Set(entry.payment_method),
            reference: Set(entry.reference),
            receipt_attachment: Set(entry.receipt_attachment),
            approval_status: Set(status.into()),
            auto_approved: Set(auto_approved),
            approver_id: Set(None),
            approved_at: Set(auto_approved.then(|| now.into())),
            rejection_reason: Set(None),
            is_locked: Set(false),
            locked_by: Set(None),
            locked_at: Set(None),
            settings_version: Set(settings.version),
            notes: Set(entry.notes),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&txn)
        .await
        .map_err(StorageError::from)?;

        let summary = format!(
            "recorded {} {} ({status}, settings version {})",
            entry.entry_type,
            format_amount(entry.amount),
            settings.version
        );
        Self::audit(&txn, id, owner_id, "create", summary, now).await?;
        txn.commit().await.map_err(StorageError::from)?;

        tracing::info!(
            entry_id = %id,
            owner = %owner_id,
            status = %status,
            settings_version = settings.version,
            "Petty cash entry recorded"
        );
        Ok(model)
    }

    /// Fetches any entry.
    pub async fn get(&self, id: Uuid) -> Result<petty_cash_entries::Model, PettyCashError> {
        petty_cash_entries::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)?
            .ok_or(PettyCashError::EntryNotFound)
    }

    /// Fetches an entry created by `owner_id`.
    pub async fn get_owned(
        &self,
        owner_id: Uuid,
        id: Uuid,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        petty_cash_entries::Entity::find_by_id(id)
            .filter(petty_cash_entries::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(StorageError::from)?
            .ok_or(PettyCashError::EntryNotFound)
    }

    /// Lists entries matching `filter`, newest transaction date first.
    pub async fn list(
        &self,
        filter: &EntryFilter,
        page: &PageRequest,
    ) -> Result<(Vec<petty_cash_entries::Model>, u64), PettyCashError> {
        let mut condition = Condition::all();
        if let Some(owner) = filter.owner {
            condition = condition.add(petty_cash_entries::Column::OwnerId.eq(owner));
        }
        if let Some(status) = filter.status {
            condition =
                condition.add(petty_cash_entries::Column::ApprovalStatus.eq(ApprovalStatus::from(status)));
        }
        if let Some(from) = filter.from {
            condition = condition.add(petty_cash_entries::Column::TransactionDate.gte(from));
        }
        if let Some(to) = filter.to {
            condition = condition.add(petty_cash_entries::Column::TransactionDate.lte(to));
        }

        let query = petty_cash_entries::Entity::find()
            .filter(condition)
            .order_by_desc(petty_cash_entries::Column::TransactionDate)
            .order_by_desc(petty_cash_entries::Column::CreatedAt);
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

    /// Edits one of the owner's entries.
    ///
    /// # Errors
    ///
    /// `EntryNotFound`, `Locked`, `FinancialFieldsFrozen` when amount, type,
    /// or date change on a decided entry, and validation errors.
    pub async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: &EntryPatch,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let valid = validate_patch(patch)?;
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        let entry = Self::find_locked(&txn, id, Some(owner_id)).await?;
        PettyCashWorkflow::check_patch(&state_of(&entry), patch)?;
        if let Some(category_id) = valid.category_id {
            CategoryRepository::ensure_active(&txn, category_id).await?;
        }

        // Only values that differ from the stored entry count as changed.
        let mut changed = Vec::new();
        let mut active: petty_cash_entries::ActiveModel = entry.clone().into();
        if let Some(description) = valid.description.filter(|d| *d != entry.description) {
            active.description = Set(description);
            changed.push("description");
        }
        for (field, value, stored, slot) in [
            ("beneficiary", valid.beneficiary, &entry.beneficiary, &mut active.beneficiary),
            ("purpose", valid.purpose, &entry.purpose, &mut active.purpose),
            (
                "payment_method",
                valid.payment_method,
                &entry.payment_method,
                &mut active.payment_method,
            ),
            ("reference", valid.reference, &entry.reference, &mut active.reference),
            (
                "receipt_attachment",
                valid.receipt_attachment,
                &entry.receipt_attachment,
                &mut active.receipt_attachment,
            ),
            ("notes", valid.notes, &entry.notes, &mut active.notes),
        ] {
            if let Some(value) = value.filter(|v| v != stored) {
                *slot = Set(value);
                changed.push(field);
            }
        }
        if let Some(category_id) = valid.category_id.filter(|c| entry.category_id != Some(*c)) {
            active.category_id = Set(Some(category_id));
            changed.push("category_id");
        }
        if let Some(amount) = valid.amount.filter(|a| *a != entry.amount) {
            active.amount = Set(amount);
            changed.push("amount");
        }
        if let Some(entry_type) = valid
            .entry_type
            .map(EntryType::from)
            .filter(|t| *t != entry.transaction_type)
        {
            active.transaction_type = Set(entry_type);
            changed.push("transaction_type");
        }
        if let Some(date) = valid.transaction_date.filter(|d| *d != entry.transaction_date) {
            active.transaction_date = Set(date);
            changed.push("transaction_date");
        }
        active.updated_at = Set(now.into());

        let model = active.update(&txn).await.map_err(StorageError::from)?;
        let summary = if changed.is_empty() {
            NO_CHANGES.to_string()
        } else {
            format!("updated {}", changed.join(", "))
        };
        Self::audit(&txn, id, owner_id, "update", summary, now).await?;
        txn.commit().await.map_err(StorageError::from)?;

        Ok(model)
    }

    /// Deletes one of the owner's unlocked entries.
    pub async fn delete(
        &self,
        owner_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<(), PettyCashError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let entry = Self::find_locked(&txn, id, Some(owner_id)).await?;
        PettyCashWorkflow::ensure_unlocked(&state_of(&entry))?;

        let summary = format!(
            "deleted {} {} ({})",
            domain::EntryType::from(entry.transaction_type),
            format_amount(normalize(entry.amount)),
            domain::ApprovalStatus::from(entry.approval_status)
        );
        petty_cash_entries::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(StorageError::from)?;
        Self::audit(&txn, id, owner_id, "delete", summary, now).await?;
        txn.commit().await.map_err(StorageError::from)?;

        tracing::info!(entry_id = %id, owner = %owner_id, "Petty cash entry deleted");
        Ok(())
    }

    /// Approves a pending entry, applying it to the float.
    ///
    /// The float and period limits are checked against the settings
    /// governing the approval instant.
    ///
    /// # Errors
    ///
    /// `EntryNotFound`, `Locked`, `InvalidTransition`, `SelfApproval`, or
    /// `LimitExceeded`.
    pub async fn approve(
        &self,
        approver_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let entry = Self::find_locked(&txn, id, None).await?;
        let decision = PettyCashWorkflow::approve(&state_of(&entry), approver_id, now)?;

        let settings = FloatSettingsRepository::governing(&txn, now).await?;
        Self::check_float(
            &txn,
            &settings.limits,
            entry.transaction_type.into(),
            normalize(entry.amount),
            entry.transaction_date,
        )
        .await?;

        let model = Self::decide(&txn, entry, decision, now).await?;
        txn.commit().await.map_err(StorageError::from)?;
        Ok(model)
    }

    /// Rejects a pending entry with a reason.
    ///
    /// # Errors
    ///
    /// As [`Self::approve`] minus the limit checks, plus
    /// `RejectionReasonRequired`.
    pub async fn reject(
        &self,
        approver_id: Uuid,
        id: Uuid,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let entry = Self::find_locked(&txn, id, None).await?;
        let decision = PettyCashWorkflow::reject(&state_of(&entry), approver_id, reason, now)?;

        let model = Self::decide(&txn, entry, decision, now).await?;
        txn.commit().await.map_err(StorageError::from)?;
        Ok(model)
    }

    /// Locks an entry against any further change.
    pub async fn lock(
        &self,
        actor_id: Uuid,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;
        let entry = Self::find_locked(&txn, id, None).await?;
        PettyCashWorkflow::lock(&state_of(&entry))?;

        let mut active: petty_cash_entries::ActiveModel = entry.into();
        active.is_locked = Set(true);
        active.locked_by = Set(Some(actor_id));
        active.locked_at = Set(Some(now.into()));
        active.updated_at = Set(now.into());
        let model = active.update(&txn).await.map_err(StorageError::from)?;

        Self::audit(&txn, id, actor_id, "lock", "locked entry".to_string(), now).await?;
        txn.commit().await.map_err(StorageError::from)?;

        tracing::info!(entry_id = %id, actor = %actor_id, "Petty cash entry locked");
        Ok(model)
    }

    /// Summarises the float under the settings governing `now`.
    pub async fn summary(&self, now: DateTime<Utc>) -> Result<FloatSummary, PettyCashError> {
        Self::float_summary(&self.db, now)
            .await?
            .ok_or(PettyCashError::SettingsNotConfigured)
    }

    /// Float summary on `conn`, or `None` before any settings exist.
    pub async fn float_summary<C: ConnectionTrait>(
        conn: &C,
        now: DateTime<Utc>,
    ) -> Result<Option<FloatSummary>, StorageError> {
        let Some(settings) = FloatSettingsRepository::active_at(conn, now).await? else {
            return Ok(None);
        };
        let totals = Self::movement_totals(conn).await?;
        Ok(Some(FloatService::summary(
            &super::float_settings::to_settings(&settings),
            totals,
        )))
    }

    /// Lists every pending entry still open to a decision, for alert
    /// evaluation.
    pub async fn pending_entries<C: ConnectionTrait>(
        conn: &C,
    ) -> Result<Vec<PendingEntryFacts>, StorageError> {
        let rows = petty_cash_entries::Entity::find()
            .filter(petty_cash_entries::Column::ApprovalStatus.eq(ApprovalStatus::Pending))
            .filter(petty_cash_entries::Column::IsLocked.eq(false))
            .all(conn)
            .await?;
        Ok(rows
            .into_iter()
            .map(|e| PendingEntryFacts {
                id: e.id,
                owner: e.owner_id,
                amount: normalize(e.amount),
                created_at: e.created_at.with_timezone(&Utc),
            })
            .collect())
    }

    async fn find_locked(
        txn: &DatabaseTransaction,
        id: Uuid,
        owner: Option<Uuid>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let mut query = petty_cash_entries::Entity::find_by_id(id);
        if let Some(owner) = owner {
            query = query.filter(petty_cash_entries::Column::OwnerId.eq(owner));
        }
        query
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(StorageError::from)?
            .ok_or(PettyCashError::EntryNotFound)
    }

    async fn decide(
        txn: &DatabaseTransaction,
        entry: petty_cash_entries::Model,
        decision: Decision,
        now: DateTime<Utc>,
    ) -> Result<petty_cash_entries::Model, PettyCashError> {
        let id = entry.id;
        let new_status = decision.new_status();
        let mut active: petty_cash_entries::ActiveModel = entry.into();
        active.approval_status = Set(new_status.into());
        active.updated_at = Set(now.into());

        let (actor, action, summary) = match decision {
            Decision::Approve {
                approved_by,
                approved_at,
            } => {
                active.approver_id = Set(Some(approved_by));
                active.approved_at = Set(Some(approved_at.into()));
                (approved_by, "approve", "approved".to_string())
            }
            Decision::Reject {
                rejected_by,
                rejected_at,
                reason,
            } => {
                active.approver_id = Set(Some(rejected_by));
                active.approved_at = Set(Some(rejected_at.into()));
                let summary = format!("rejected: {reason}");
                active.rejection_reason = Set(Some(reason));
                (rejected_by, "reject", summary)
            }
        };

        let model = active.update(txn).await.map_err(StorageError::from)?;
        Self::audit(txn, id, actor, action, summary, now).await?;

        tracing::info!(entry_id = %id, actor = %actor, status = %new_status, "Petty cash entry decided");
        Ok(model)
    }

    async fn check_float(
        txn: &DatabaseTransaction,
        limits: &FloatLimits,
        entry_type: domain::EntryType,
        amount: Decimal,
        date: NaiveDate,
    ) -> Result<(), PettyCashError> {
        let totals = Self::movement_totals(txn).await?;
        let balance = FloatService::balance(limits.initial_float, &totals);
        let usage = Self::period_usage(txn, date).await?;
        FloatService::check_apply(limits, balance, &usage, entry_type, amount)
    }

    async fn movement_totals<C: ConnectionTrait>(conn: &C) -> Result<MovementTotals, StorageError> {
        let rows: Vec<(EntryType, ApprovalStatus, Decimal)> = petty_cash_entries::Entity::find()
            .select_only()
            .column(petty_cash_entries::Column::TransactionType)
            .column(petty_cash_entries::Column::ApprovalStatus)
            .column(petty_cash_entries::Column::Amount)
            .into_tuple()
            .all(conn)
            .await?;

        let mut totals = MovementTotals::default();
        for (entry_type, status, amount) in rows {
            totals.add(entry_type.into(), status.into(), normalize(amount));
        }
        Ok(totals)
    }

    /// Approved outflow on `date` and in its calendar month.
    async fn period_usage<C: ConnectionTrait>(
        conn: &C,
        date: NaiveDate,
    ) -> Result<PeriodUsage, StorageError> {
        let (month_start, next_month) = month_bounds(date);
        let rows: Vec<(NaiveDate, Decimal)> = petty_cash_entries::Entity::find()
            .select_only()
            .column(petty_cash_entries::Column::TransactionDate)
            .column(petty_cash_entries::Column::Amount)
            .filter(petty_cash_entries::Column::ApprovalStatus.eq(ApprovalStatus::Approved))
            .filter(petty_cash_entries::Column::TransactionType.eq(EntryType::Out))
            .filter(petty_cash_entries::Column::TransactionDate.gte(month_start))
            .filter(petty_cash_entries::Column::TransactionDate.lt(next_month))
            .into_tuple()
            .all(conn)
            .await?;

        let mut usage = PeriodUsage::default();
        for (day, amount) in rows {
            let amount = normalize(amount);
            usage.month_out += amount;
            if day == date {
                usage.day_out += amount;
            }
        }
        Ok(usage)
    }

    async fn audit(
        txn: &DatabaseTransaction,
        id: Uuid,
        actor_id: Uuid,
        action: &'static str,
        summary: String,
        now: DateTime<Utc>,
    ) -> Result<(), PettyCashError> {
        let event = AuditEvent::new(AuditEntity::PettyCashEntry, id, actor_id, action, summary);
        AuditRepository::record(txn, &event, now)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

fn state_of(entry: &petty_cash_entries::Model) -> EntryState {
    EntryState {
        owner: entry.owner_id,
        status: entry.approval_status.into(),
        is_locked: entry.is_locked,
    }
}

/// First day of `date`'s month and first day of the following month.
fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let next = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    (start, next.unwrap_or(NaiveDate::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_month_bounds() {
        let d = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(
            month_bounds(d),
            (
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
            )
        );

        let d = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        assert_eq!(month_bounds(d).1, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }
}
