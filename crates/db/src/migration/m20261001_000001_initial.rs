//! Initial schema: ledger, petty cash, notifications, alerts, and audit.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        create_ledger_tables(manager).await?;
        create_petty_cash_tables(manager).await?;
        create_notification_tables(manager).await?;
        create_support_tables(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let drops = [
            Table::drop().table(Counters::Table).if_exists().to_owned(),
            Table::drop().table(AuditRecords::Table).if_exists().to_owned(),
            Table::drop().table(AlertStates::Table).if_exists().to_owned(),
            Table::drop().table(NotificationReads::Table).if_exists().to_owned(),
            Table::drop().table(Notifications::Table).if_exists().to_owned(),
            Table::drop().table(PettyCashEntries::Table).if_exists().to_owned(),
            Table::drop().table(PettyCashCategories::Table).if_exists().to_owned(),
            Table::drop().table(FloatSettings::Table).if_exists().to_owned(),
            Table::drop().table(Receipts::Table).if_exists().to_owned(),
            Table::drop().table(Invoices::Table).if_exists().to_owned(),
            Table::drop().table(LedgerTransactions::Table).if_exists().to_owned(),
            Table::drop().table(Clients::Table).if_exists().to_owned(),
        ];
        for stmt in drops {
            manager.drop_table(stmt).await?;
        }
        Ok(())
    }
}

fn money(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col).decimal_len(16, 2).not_null().to_owned()
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

async fn create_ledger_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Clients::Table)
                .if_not_exists()
                .col(ColumnDef::new(Clients::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Clients::Name).string_len(200).not_null())
                .col(
                    ColumnDef::new(Clients::RegistrationNumber)
                        .string_len(100)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Clients::ResponsibleParty).string_len(200).null())
                .col(ColumnDef::new(Clients::TaxId).string_len(9).null())
                .col(ColumnDef::new(Clients::Currency).string_len(3).not_null())
                .col(money(Clients::Amount))
                .col(money(Clients::PaidAmount))
                .col(money(Clients::DueAmount))
                .col(ColumnDef::new(Clients::Status).string_len(16).not_null())
                .col(ColumnDef::new(Clients::CreatedBy).uuid().not_null())
                .col(timestamp(Clients::CreatedAt))
                .col(timestamp(Clients::UpdatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(LedgerTransactions::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(LedgerTransactions::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(LedgerTransactions::OwnerId).uuid().not_null())
                .col(ColumnDef::new(LedgerTransactions::Kind).string_len(50).not_null())
                .col(ColumnDef::new(LedgerTransactions::Date).date().not_null())
                .col(ColumnDef::new(LedgerTransactions::Item).string_len(500).not_null())
                .col(ColumnDef::new(LedgerTransactions::Service).string_len(200).null())
                .col(
                    ColumnDef::new(LedgerTransactions::PaymentMethod)
                        .string_len(50)
                        .null(),
                )
                .col(money(LedgerTransactions::Amount))
                .col(ColumnDef::new(LedgerTransactions::Currency).string_len(3).not_null())
                .col(ColumnDef::new(LedgerTransactions::Status).string_len(50).not_null())
                .col(timestamp(LedgerTransactions::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_ledger_transactions_owner_date")
                .table(LedgerTransactions::Table)
                .col(LedgerTransactions::OwnerId)
                .col(LedgerTransactions::Date)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Invoices::Table)
                .if_not_exists()
                .col(ColumnDef::new(Invoices::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Invoices::OwnerId).uuid().not_null())
                .col(ColumnDef::new(Invoices::InvoiceNumber).string_len(100).not_null())
                .col(money(Invoices::Total))
                .col(money(Invoices::AmountPaid))
                .col(ColumnDef::new(Invoices::Status).string_len(16).not_null())
                .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                .col(ColumnDef::new(Invoices::DueDate).date().null())
                .col(timestamp(Invoices::CreatedAt))
                .col(timestamp(Invoices::UpdatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("uq_invoices_owner_number")
                .table(Invoices::Table)
                .col(Invoices::OwnerId)
                .col(Invoices::InvoiceNumber)
                .unique()
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Receipts::Table)
                .if_not_exists()
                .col(ColumnDef::new(Receipts::Id).uuid().not_null().primary_key())
                .col(ColumnDef::new(Receipts::InvoiceId).uuid().not_null())
                .col(
                    ColumnDef::new(Receipts::ReceiptNumber)
                        .string_len(32)
                        .not_null()
                        .unique_key(),
                )
                .col(ColumnDef::new(Receipts::PaymentDate).date().not_null())
                .col(ColumnDef::new(Receipts::PaymentMethod).string_len(50).not_null())
                .col(money(Receipts::AmountPaid))
                .col(ColumnDef::new(Receipts::CreatedBy).uuid().not_null())
                .col(timestamp(Receipts::CreatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_receipts_invoice")
                        .from(Receipts::Table, Receipts::InvoiceId)
                        .to(Invoices::Table, Invoices::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .to_owned(),
        )
        .await?;

    Ok(())
}

async fn create_petty_cash_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(FloatSettings::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(FloatSettings::Version)
                        .big_integer()
                        .not_null()
                        .primary_key(),
                )
                .col(timestamp(FloatSettings::ActivatedAt))
                .col(money(FloatSettings::InitialFloat))
                .col(money(FloatSettings::MaxLimit))
                .col(money(FloatSettings::ReplenishmentThreshold))
                .col(money(FloatSettings::ApprovalThreshold))
                .col(ColumnDef::new(FloatSettings::DailyLimit).decimal_len(16, 2).null())
                .col(ColumnDef::new(FloatSettings::MonthlyLimit).decimal_len(16, 2).null())
                .col(ColumnDef::new(FloatSettings::UpdatedBy).uuid().not_null())
                .col(timestamp(FloatSettings::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(PettyCashCategories::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(PettyCashCategories::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(
                    ColumnDef::new(PettyCashCategories::Name)
                        .string_len(100)
                        .not_null()
                        .unique_key(),
                )
                .col(
                    ColumnDef::new(PettyCashCategories::IsActive)
                        .boolean()
                        .not_null()
                        .default(true),
                )
                .col(timestamp(PettyCashCategories::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(PettyCashEntries::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(PettyCashEntries::Id)
                        .uuid()
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(PettyCashEntries::OwnerId).uuid().not_null())
                .col(ColumnDef::new(PettyCashEntries::TransactionDate).date().not_null())
                .col(ColumnDef::new(PettyCashEntries::Description).string_len(500).not_null())
                .col(ColumnDef::new(PettyCashEntries::Beneficiary).string_len(200).null())
                .col(ColumnDef::new(PettyCashEntries::Purpose).string_len(500).null())
                .col(money(PettyCashEntries::Amount))
                .col(
                    ColumnDef::new(PettyCashEntries::TransactionType)
                        .string_len(8)
                        .not_null(),
                )
                .col(ColumnDef::new(PettyCashEntries::CategoryId).uuid().null())
                .col(ColumnDef::new(PettyCashEntries::PaymentMethod).string_len(50).null())
                .col(ColumnDef::new(PettyCashEntries::Reference).string_len(100).null())
                .col(
                    ColumnDef::new(PettyCashEntries::ReceiptAttachment)
                        .string_len(255)
                        .null(),
                )
                .col(
                    ColumnDef::new(PettyCashEntries::ApprovalStatus)
                        .string_len(16)
                        .not_null(),
                )
                .col(ColumnDef::new(PettyCashEntries::AutoApproved).boolean().not_null())
                .col(ColumnDef::new(PettyCashEntries::ApproverId).uuid().null())
                .col(
                    ColumnDef::new(PettyCashEntries::ApprovedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(ColumnDef::new(PettyCashEntries::RejectionReason).text().null())
                .col(
                    ColumnDef::new(PettyCashEntries::IsLocked)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(ColumnDef::new(PettyCashEntries::LockedBy).uuid().null())
                .col(
                    ColumnDef::new(PettyCashEntries::LockedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .col(
                    ColumnDef::new(PettyCashEntries::SettingsVersion)
                        .big_integer()
                        .not_null(),
                )
                .col(ColumnDef::new(PettyCashEntries::Notes).text().null())
                .col(timestamp(PettyCashEntries::CreatedAt))
                .col(timestamp(PettyCashEntries::UpdatedAt))
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_petty_cash_entries_category")
                        .from(PettyCashEntries::Table, PettyCashEntries::CategoryId)
                        .to(PettyCashCategories::Table, PettyCashCategories::Id)
                        .on_delete(ForeignKeyAction::Restrict),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_petty_cash_entries_status_date")
                .table(PettyCashEntries::Table)
                .col(PettyCashEntries::ApprovalStatus)
                .col(PettyCashEntries::TransactionDate)
                .to_owned(),
        )
        .await?;

    Ok(())
}

async fn create_notification_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(Notifications::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Notifications::Id)
                        .big_integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(Notifications::UserId).uuid().null())
                .col(ColumnDef::new(Notifications::Kind).string_len(50).not_null())
                .col(ColumnDef::new(Notifications::Title).string_len(200).not_null())
                .col(ColumnDef::new(Notifications::Payload).json().not_null())
                .col(
                    ColumnDef::new(Notifications::IsRead)
                        .boolean()
                        .not_null()
                        .default(false),
                )
                .col(timestamp(Notifications::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_notifications_user_read")
                .table(Notifications::Table)
                .col(Notifications::UserId)
                .col(Notifications::IsRead)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(NotificationReads::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(NotificationReads::NotificationId)
                        .big_integer()
                        .not_null(),
                )
                .col(ColumnDef::new(NotificationReads::UserId).uuid().not_null())
                .col(timestamp(NotificationReads::ReadAt))
                .primary_key(
                    Index::create()
                        .col(NotificationReads::NotificationId)
                        .col(NotificationReads::UserId),
                )
                .foreign_key(
                    ForeignKey::create()
                        .name("fk_notification_reads_notification")
                        .from(NotificationReads::Table, NotificationReads::NotificationId)
                        .to(Notifications::Table, Notifications::Id)
                        .on_delete(ForeignKeyAction::Cascade),
                )
                .to_owned(),
        )
        .await?;

    Ok(())
}

async fn create_support_tables(manager: &SchemaManager<'_>) -> Result<(), DbErr> {
    manager
        .create_table(
            Table::create()
                .table(AlertStates::Table)
                .if_not_exists()
                .col(ColumnDef::new(AlertStates::RuleKey).string_len(100).not_null())
                .col(ColumnDef::new(AlertStates::EntityKey).string_len(100).not_null())
                .col(ColumnDef::new(AlertStates::Active).boolean().not_null())
                .col(timestamp(AlertStates::LastRaisedAt))
                .col(
                    ColumnDef::new(AlertStates::ClearedAt)
                        .timestamp_with_time_zone()
                        .null(),
                )
                .primary_key(
                    Index::create()
                        .col(AlertStates::RuleKey)
                        .col(AlertStates::EntityKey),
                )
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(AuditRecords::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(AuditRecords::Id)
                        .big_integer()
                        .not_null()
                        .auto_increment()
                        .primary_key(),
                )
                .col(ColumnDef::new(AuditRecords::EntityType).string_len(50).not_null())
                .col(ColumnDef::new(AuditRecords::EntityId).uuid().not_null())
                .col(ColumnDef::new(AuditRecords::ActorId).uuid().not_null())
                .col(ColumnDef::new(AuditRecords::Action).string_len(50).not_null())
                .col(ColumnDef::new(AuditRecords::Summary).text().not_null())
                .col(timestamp(AuditRecords::CreatedAt))
                .to_owned(),
        )
        .await?;

    manager
        .create_index(
            Index::create()
                .name("idx_audit_records_entity")
                .table(AuditRecords::Table)
                .col(AuditRecords::EntityType)
                .col(AuditRecords::EntityId)
                .to_owned(),
        )
        .await?;

    manager
        .create_table(
            Table::create()
                .table(Counters::Table)
                .if_not_exists()
                .col(
                    ColumnDef::new(Counters::Name)
                        .string_len(64)
                        .not_null()
                        .primary_key(),
                )
                .col(ColumnDef::new(Counters::Value).big_integer().not_null())
                .to_owned(),
        )
        .await?;

    Ok(())
}

#[derive(DeriveIden)]
enum Clients {
    Table,
    Id,
    Name,
    RegistrationNumber,
    ResponsibleParty,
    TaxId,
    Currency,
    Amount,
    PaidAmount,
    DueAmount,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum LedgerTransactions {
    Table,
    Id,
    OwnerId,
    Kind,
    Date,
    Item,
    Service,
    PaymentMethod,
    Amount,
    Currency,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Invoices {
    Table,
    Id,
    OwnerId,
    InvoiceNumber,
    Total,
    AmountPaid,
    Status,
    IssueDate,
    DueDate,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Receipts {
    Table,
    Id,
    InvoiceId,
    ReceiptNumber,
    PaymentDate,
    PaymentMethod,
    AmountPaid,
    CreatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum FloatSettings {
    Table,
    Version,
    ActivatedAt,
    InitialFloat,
    MaxLimit,
    ReplenishmentThreshold,
    ApprovalThreshold,
    DailyLimit,
    MonthlyLimit,
    UpdatedBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PettyCashCategories {
    Table,
    Id,
    Name,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PettyCashEntries {
    Table,
    Id,
    OwnerId,
    TransactionDate,
    Description,
    Beneficiary,
    Purpose,
    Amount,
    TransactionType,
    CategoryId,
    PaymentMethod,
    Reference,
    ReceiptAttachment,
    ApprovalStatus,
    AutoApproved,
    ApproverId,
    ApprovedAt,
    RejectionReason,
    IsLocked,
    LockedBy,
    LockedAt,
    SettingsVersion,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Payload,
    IsRead,
    CreatedAt,
}

#[derive(DeriveIden)]
enum NotificationReads {
    Table,
    NotificationId,
    UserId,
    ReadAt,
}

#[derive(DeriveIden)]
enum AlertStates {
    Table,
    RuleKey,
    EntityKey,
    Active,
    LastRaisedAt,
    ClearedAt,
}

#[derive(DeriveIden)]
enum AuditRecords {
    Table,
    Id,
    EntityType,
    EntityId,
    ActorId,
    Action,
    Summary,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Counters {
    Table,
    Name,
    Value,
}
