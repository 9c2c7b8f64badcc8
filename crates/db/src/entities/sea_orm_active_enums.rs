//! String-backed enums shared by several tables.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use haulbook_core::{money, petty_cash};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "NOT_PAID")]
    NotPaid,
    #[sea_orm(string_value = "PARTIALLY_PAID")]
    PartiallyPaid,
    #[sea_orm(string_value = "PAID")]
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    #[sea_orm(string_value = "in")]
    In,
    #[sea_orm(string_value = "out")]
    Out,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl From<money::PaymentStatus> for PaymentStatus {
    fn from(status: money::PaymentStatus) -> Self {
        match status {
            money::PaymentStatus::NotPaid => Self::NotPaid,
            money::PaymentStatus::PartiallyPaid => Self::PartiallyPaid,
            money::PaymentStatus::Paid => Self::Paid,
        }
    }
}

impl From<PaymentStatus> for money::PaymentStatus {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::NotPaid => Self::NotPaid,
            PaymentStatus::PartiallyPaid => Self::PartiallyPaid,
            PaymentStatus::Paid => Self::Paid,
        }
    }
}

impl From<petty_cash::EntryType> for EntryType {
    fn from(t: petty_cash::EntryType) -> Self {
        match t {
            petty_cash::EntryType::In => Self::In,
            petty_cash::EntryType::Out => Self::Out,
        }
    }
}

impl From<EntryType> for petty_cash::EntryType {
    fn from(t: EntryType) -> Self {
        match t {
            EntryType::In => Self::In,
            EntryType::Out => Self::Out,
        }
    }
}

impl From<petty_cash::ApprovalStatus> for ApprovalStatus {
    fn from(s: petty_cash::ApprovalStatus) -> Self {
        match s {
            petty_cash::ApprovalStatus::Pending => Self::Pending,
            petty_cash::ApprovalStatus::Approved => Self::Approved,
            petty_cash::ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ApprovalStatus> for petty_cash::ApprovalStatus {
    fn from(s: ApprovalStatus) -> Self {
        match s {
            ApprovalStatus::Pending => Self::Pending,
            ApprovalStatus::Approved => Self::Approved,
            ApprovalStatus::Rejected => Self::Rejected,
        }
    }
}
