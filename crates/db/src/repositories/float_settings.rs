//! Versioned float settings repository.
//!
//! Settings are never edited in place. Each activation inserts a new
//! version; the version governing an instant `t` is the highest one whose
//! `activated_at` is at or before `t`.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use haulbook_core::audit::{AuditEntity, AuditEvent};
use haulbook_core::petty_cash::{FloatLimits, FloatSettings, PettyCashError, SettingsInput, validate_settings};
use haulbook_shared::config::ThresholdOrderPolicy;
use haulbook_shared::types::format_amount;

use super::audit::AuditRepository;
use super::normalize;
use crate::entities::float_settings;
use crate::storage::{self, StorageError};

/// Attempts before a contended activation gives up with `Transient`.
const MAX_ACTIVATION_ATTEMPTS: u32 = 3;

/// Float settings repository.
#[derive(Debug, Clone)]
pub struct FloatSettingsRepository {
    db: DatabaseConnection,
}

impl FloatSettingsRepository {
    /// Creates a new float settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Activates a new settings version.
    ///
    /// `activate_at` defaults to `now`; a later instant schedules the version
    /// without affecting anything recorded before it.
    ///
    /// # Errors
    ///
    /// - Validation errors, including `ThresholdOrder` under the reject policy
    /// - `Transient` after repeatedly losing the next version number to
    ///   concurrent activations
    pub async fn activate(
        &self,
        actor_id: Uuid,
        input: &SettingsInput,
        policy: ThresholdOrderPolicy,
        now: DateTime<Utc>,
    ) -> Result<float_settings::Model, PettyCashError> {
        let limits = validate_settings(input, policy)?;
        let activated_at = input.activate_at.unwrap_or(now);

        for attempt in 1..=MAX_ACTIVATION_ATTEMPTS {
            match self.try_activate(actor_id, &limits, activated_at, now).await? {
                Some(model) => {
                    tracing::info!(
                        version = model.version,
                        activated_at = %activated_at,
                        actor = %actor_id,
                        "Float settings version activated"
                    );
                    return Ok(model);
                }
                None => {
                    tracing::warn!(
                        attempt,
                        "Settings version taken by a concurrent activation, retrying"
                    );
                }
            }
        }

        Err(PettyCashError::Transient(
            "float settings are being activated concurrently".to_string(),
        ))
    }

    /// Inserts the next version, or returns `None` when a concurrent
    /// activation claimed that version number first.
    async fn try_activate(
        &self,
        actor_id: Uuid,
        limits: &FloatLimits,
        activated_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<Option<float_settings::Model>, PettyCashError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        let latest = float_settings::Entity::find()
            .order_by_desc(float_settings::Column::Version)
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(StorageError::from)?;
        let version = latest.map_or(1, |l| l.version + 1);

        let inserted = float_settings::ActiveModel {
            version: Set(version),
            activated_at: Set(activated_at.into()),
            initial_float: Set(limits.initial_float),
            max_limit: Set(limits.max_limit),
            replenishment_threshold: Set(limits.replenishment_threshold),
            approval_threshold: Set(limits.approval_threshold),
            daily_limit: Set(limits.daily_limit),
            monthly_limit: Set(limits.monthly_limit),
            updated_by: Set(actor_id),
            created_at: Set(now.into()),
        }
        .insert(&txn)
        .await;
        let model = match inserted {
            Ok(model) => model,
            Err(e) if storage::is_unique_violation(&e) => {
                txn.rollback().await.map_err(StorageError::from)?;
                return Ok(None);
            }
            Err(e) => return Err(StorageError::from(e).into()),
        };

        let event = AuditEvent::new(
            AuditEntity::FloatSettings,
            Uuid::nil(),
            actor_id,
            "activate",
            describe(version, activated_at, limits),
        );
        AuditRepository::record(&txn, &event, now)
            .await
            .map_err(StorageError::from)?;
        txn.commit().await.map_err(StorageError::from)?;
        Ok(Some(model))
    }

    /// Returns the version governing `at`, if any.
    pub async fn active_at<C: ConnectionTrait>(
        conn: &C,
        at: DateTime<Utc>,
    ) -> Result<Option<float_settings::Model>, StorageError> {
        // Compared as instants in Rust; SQLite stores timestamps as text.
        let versions = float_settings::Entity::find()
            .order_by_desc(float_settings::Column::Version)
            .all(conn)
            .await?;
        Ok(versions
            .into_iter()
            .find(|v| v.activated_at.with_timezone(&Utc) <= at))
    }

    /// Returns the version governing `now`, locking its row so that
    /// concurrent float mutations serialize.
    pub(crate) async fn governing(
        txn: &DatabaseTransaction,
        now: DateTime<Utc>,
    ) -> Result<FloatSettings, PettyCashError> {
        let active = Self::active_at(txn, now)
            .await?
            .ok_or(PettyCashError::SettingsNotConfigured)?;
        let locked = float_settings::Entity::find_by_id(active.version)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(StorageError::from)?
            .ok_or(PettyCashError::SettingsNotConfigured)?;
        Ok(to_settings(&locked))
    }

    /// Returns the version governing `now`.
    pub async fn current(&self, now: DateTime<Utc>) -> Result<FloatSettings, PettyCashError> {
        Self::active_at(&self.db, now)
            .await?
            .map(|m| to_settings(&m))
            .ok_or(PettyCashError::SettingsNotConfigured)
    }

    /// Lists every version, newest first, including scheduled ones.
    pub async fn history(&self) -> Result<Vec<FloatSettings>, PettyCashError> {
        let rows = float_settings::Entity::find()
            .order_by_desc(float_settings::Column::Version)
            .all(&self.db)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.iter().map(to_settings).collect())
    }
}

/// Converts a stored version into its domain form.
pub fn to_settings(model: &float_settings::Model) -> FloatSettings {
    FloatSettings {
        version: model.version,
        activated_at: model.activated_at.with_timezone(&Utc),
        limits: FloatLimits {
            initial_float: normalize(model.initial_float),
            max_limit: normalize(model.max_limit),
            replenishment_threshold: normalize(model.replenishment_threshold),
            approval_threshold: normalize(model.approval_threshold),
            daily_limit: model.daily_limit.map(normalize),
            monthly_limit: model.monthly_limit.map(normalize),
        },
        updated_by: model.updated_by,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn describe(version: i64, activated_at: DateTime<Utc>, limits: &FloatLimits) -> String {
    let optional = |v: Option<rust_decimal::Decimal>| v.map_or_else(|| "none".to_string(), format_amount);
    format!(
        "version {version} from {}: initial_float {}, max_limit {}, replenishment_threshold {}, approval_threshold {}, daily_limit {}, monthly_limit {}",
        activated_at.to_rfc3339(),
        format_amount(limits.initial_float),
        format_amount(limits.max_limit),
        format_amount(limits.replenishment_threshold),
        format_amount(limits.approval_threshold),
        optional(limits.daily_limit),
        optional(limits.monthly_limit),
    )
}
