//! `SeaORM` Entity for notifications table.
//!
//! `user_id` is null for broadcasts; their read state lives in
//! `notification_reads`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: Option<Uuid>,
    pub kind: String,
    pub title: String,
    pub payload: Json,
    pub is_read: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::notification_reads::Entity")]
    NotificationReads,
}

impl Related<super::notification_reads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::NotificationReads.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
