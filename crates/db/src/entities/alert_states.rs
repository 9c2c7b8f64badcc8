//! `SeaORM` Entity for alert_states table, the edge-detector memory.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "alert_states")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub rule_key: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub entity_key: String,
    pub active: bool,
    pub last_raised_at: DateTimeWithTimeZone,
    pub cleared_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
