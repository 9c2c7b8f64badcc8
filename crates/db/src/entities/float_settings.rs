//! `SeaORM` Entity for float_settings table.
//!
//! Each row is one immutable settings version.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "float_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub version: i64,
    pub activated_at: DateTimeWithTimeZone,
    pub initial_float: Decimal,
    pub max_limit: Decimal,
    pub replenishment_threshold: Decimal,
    pub approval_threshold: Decimal,
    pub daily_limit: Option<Decimal>,
    pub monthly_limit: Option<Decimal>,
    pub updated_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
