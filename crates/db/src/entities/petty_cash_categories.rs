//! `SeaORM` Entity for petty_cash_categories table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "petty_cash_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::petty_cash_entries::Entity")]
    PettyCashEntries,
}

impl Related<super::petty_cash_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PettyCashEntries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
