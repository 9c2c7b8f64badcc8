//! `SeaORM` Entity for petty_cash_entries table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ApprovalStatus, EntryType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "petty_cash_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub transaction_date: Date,
    pub description: String,
    pub beneficiary: Option<String>,
    pub purpose: Option<String>,
    pub amount: Decimal,
    pub transaction_type: EntryType,
    pub category_id: Option<Uuid>,
    pub payment_method: Option<String>,
    pub reference: Option<String>,
    pub receipt_attachment: Option<String>,
    pub approval_status: ApprovalStatus,
    pub auto_approved: bool,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub rejection_reason: Option<String>,
    pub is_locked: bool,
    pub locked_by: Option<Uuid>,
    pub locked_at: Option<DateTimeWithTimeZone>,
    pub settings_version: i64,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::petty_cash_categories::Entity",
        from = "Column::CategoryId",
        to = "super::petty_cash_categories::Column::Id"
    )]
    PettyCashCategories,
}

impl Related<super::petty_cash_categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PettyCashCategories.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
