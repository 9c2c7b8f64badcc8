//! Invoice and receipt repository.
//!
//! Applying a receipt reads the invoice under a row lock, plans the new
//! settlement, and writes it back with a compare-and-set on the previous
//! `amount_paid`. A lost race aborts the transaction and retries with a
//! fresh read, so concurrent receipts never lose an update.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use haulbook_core::alerts::InvoiceFacts;
use haulbook_core::ledger::{
    InvoiceInput, LedgerError, LedgerService, RECEIPT_COUNTER, ReceiptInput, ReceiptRequest,
    validate_invoice, validate_receipt,
};
use haulbook_core::money::{PaymentStatus as CorePaymentStatus, Settlement};
use haulbook_shared::config::OverpaymentPolicy;

use super::counter;
use super::normalize;
use crate::entities::sea_orm_active_enums::PaymentStatus;
use crate::entities::{invoices, receipts};
use crate::storage::{self, StorageError};

/// How many times a receipt is retried after losing a compare-and-set.
const MAX_RECEIPT_ATTEMPTS: u32 = 3;

/// A stored receipt together with the invoice it settled.
#[derive(Debug, Clone)]
pub struct AppliedReceipt {
    /// The new receipt.
    pub receipt: receipts::Model,
    /// The invoice after the receipt was applied.
    pub invoice: invoices::Model,
}

enum Attempt {
    Applied(AppliedReceipt),
    LostRace,
}

/// Invoice and receipt repository. Invoices are scoped to their owner.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    overpayment: OverpaymentPolicy,
}

impl InvoiceRepository {
    /// Creates a new invoice repository that refuses overpayments.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            overpayment: OverpaymentPolicy::Reject,
        }
    }

    /// Sets how receipts above the due amount are treated.
    #[must_use]
    pub const fn with_overpayment(mut self, policy: OverpaymentPolicy) -> Self {
        self.overpayment = policy;
        self
    }

    /// Creates an invoice with nothing paid.
    ///
    /// # Errors
    ///
    /// Validation errors, or `DuplicateInvoiceNumber` when the owner already
    /// has an invoice with this number.
    pub async fn create(
        &self,
        owner_id: Uuid,
        input: &InvoiceInput,
    ) -> Result<invoices::Model, LedgerError> {
        let now = Utc::now();
        let invoice = validate_invoice(input, now.date_naive())?;
        let settlement = Settlement::of(invoice.total, rust_decimal::Decimal::ZERO);

        let model = invoices::ActiveModel {
            id: Set(Uuid::now_v7()),
            owner_id: Set(owner_id),
            invoice_number: Set(invoice.invoice_number.clone()),
            total: Set(settlement.total),
            amount_paid: Set(settlement.paid),
            status: Set(settlement.status.into()),
            issue_date: Set(invoice.issue_date),
            due_date: Set(invoice.due_date),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(&self.db)
        .await
        .map_err(|e| {
            if storage::is_unique_violation(&e) {
                LedgerError::DuplicateInvoiceNumber(invoice.invoice_number.clone())
            } else {
                StorageError::from(e).into()
            }
        })?;

        tracing::info!(invoice_id = %model.id, owner = %owner_id, "Invoice created");
        Ok(model)
    }

    /// Fetches one of the owner's invoices.
    pub async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<invoices::Model, LedgerError> {
        invoices::Entity::find_by_id(id)
            .filter(invoices::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await
            .map_err(StorageError::from)?
            .ok_or(LedgerError::InvoiceNotFound)
    }

    /// Lists the receipts applied to one of the owner's invoices, oldest first.
    pub async fn receipts(
        &self,
        owner_id: Uuid,
        invoice_id: Uuid,
    ) -> Result<Vec<receipts::Model>, LedgerError> {
        self.get(owner_id, invoice_id).await?;
        Ok(receipts::Entity::find()
            .filter(receipts::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(receipts::Column::CreatedAt)
            .order_by_asc(receipts::Column::ReceiptNumber)
            .all(&self.db)
            .await
            .map_err(StorageError::from)?)
    }

    /// Applies a receipt against one of the owner's invoices.
    ///
    /// # Errors
    ///
    /// - `InvoiceNotFound` when no invoice with that number belongs to the owner
    /// - `ExceedsOutstanding` when the amount is more than the invoice's due
    ///   amount and overpayments are refused
    /// - `Transient` after repeatedly losing races with concurrent receipts
    pub async fn apply_receipt(
        &self,
        owner_id: Uuid,
        input: &ReceiptInput,
    ) -> Result<AppliedReceipt, LedgerError> {
        let request = validate_receipt(input)?;

        for attempt in 1..=MAX_RECEIPT_ATTEMPTS {
            match self.try_apply_receipt(owner_id, &request, Utc::now()).await? {
                Attempt::Applied(applied) => {
                    tracing::info!(
                        invoice_id = %applied.invoice.id,
                        receipt_number = %applied.receipt.receipt_number,
                        status = %CorePaymentStatus::from(applied.invoice.status),
                        "Receipt applied"
                    );
                    return Ok(applied);
                }
                Attempt::LostRace => {
                    tracing::warn!(
                        invoice_number = %request.invoice_number,
                        attempt,
                        "Receipt lost a concurrent update, retrying"
                    );
                }
            }
        }

        Err(LedgerError::Transient(format!(
            "invoice {} is being updated concurrently",
            request.invoice_number
        )))
    }

    async fn try_apply_receipt(
        &self,
        owner_id: Uuid,
        request: &ReceiptRequest,
        now: DateTime<Utc>,
    ) -> Result<Attempt, LedgerError> {
        let txn = self.db.begin().await.map_err(StorageError::from)?;

        let invoice = invoices::Entity::find()
            .filter(invoices::Column::OwnerId.eq(owner_id))
            .filter(invoices::Column::InvoiceNumber.eq(&request.invoice_number))
            .lock_exclusive()
            .one(&txn)
            .await
            .map_err(StorageError::from)?
            .ok_or(LedgerError::InvoiceNotFound)?;

        let current = Settlement::of(normalize(invoice.total), normalize(invoice.amount_paid));
        let next = LedgerService::plan_receipt(current, request.amount_paid, self.overpayment)?;

        let updated = invoices::Entity::update_many()
            .col_expr(invoices::Column::AmountPaid, Expr::value(next.paid))
            .col_expr(
                invoices::Column::Status,
                Expr::value(PaymentStatus::from(next.status)),
            )
            .col_expr(
                invoices::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(now)),
            )
            .filter(invoices::Column::Id.eq(invoice.id))
            .filter(invoices::Column::AmountPaid.eq(invoice.amount_paid))
            .exec(&txn)
            .await
            .map_err(StorageError::from)?;

        if updated.rows_affected == 0 {
            txn.rollback().await.map_err(StorageError::from)?;
            return Ok(Attempt::LostRace);
        }

        let receipt = Self::insert_receipt(&txn, owner_id, invoice.id, request, now).await?;

        let mut invoice = invoice;
        invoice.amount_paid = next.paid;
        invoice.status = next.status.into();
        invoice.updated_at = now.into();

        txn.commit().await.map_err(StorageError::from)?;
        Ok(Attempt::Applied(AppliedReceipt { receipt, invoice }))
    }

    async fn insert_receipt(
        txn: &DatabaseTransaction,
        created_by: Uuid,
        invoice_id: Uuid,
        request: &ReceiptRequest,
        now: DateTime<Utc>,
    ) -> Result<receipts::Model, LedgerError> {
        let sequence = counter::next_value(txn, RECEIPT_COUNTER)
            .await
            .map_err(StorageError::from)?;
        let receipt_number =
            LedgerService::receipt_number(now.date_naive(), sequence.unsigned_abs());

        Ok(receipts::ActiveModel {
            id: Set(Uuid::now_v7()),
            invoice_id: Set(invoice_id),
            receipt_number: Set(receipt_number),
            payment_date: Set(request.payment_date),
            payment_method: Set(request.payment_method.clone()),
            amount_paid: Set(request.amount_paid),
            created_by: Set(created_by),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(StorageError::from)?)
    }

    /// Lists every invoice that is not fully paid, for alert evaluation.
    pub async fn open_invoices<C: ConnectionTrait>(conn: &C) -> Result<Vec<InvoiceFacts>, StorageError> {
        let rows = invoices::Entity::find()
            .filter(invoices::Column::Status.ne(PaymentStatus::Paid))
            .all(conn)
            .await?;

        Ok(rows
            .into_iter()
            .map(|inv| {
                let settlement = Settlement::of(normalize(inv.total), normalize(inv.amount_paid));
                InvoiceFacts {
                    id: inv.id,
                    owner: inv.owner_id,
                    invoice_number: inv.invoice_number,
                    due_date: inv.due_date,
                    status: settlement.status,
                    due_amount: settlement.due,
                }
            })
            .collect())
    }
}
