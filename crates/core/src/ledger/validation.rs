//! Field validation for ledger inputs.

use chrono::NaiveDate;
use haulbook_shared::types::{CurrencyCode, RawAmount};
use rust_decimal::Decimal;

use super::error::LedgerError;
use super::types::{
    ClientInput, ClientPatch, ClientState, InvoiceInput, NewInvoice, NewTransaction,
    ReceiptInput, ReceiptRequest, TransactionInput,
};
use crate::money::PaymentStatus;

/// Currency assumed when a record does not name one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// Longest accepted tax id.
pub const MAX_TAX_ID_DIGITS: usize = 9;

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, LedgerError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| LedgerError::InvalidDate {
        field,
        value: raw.trim().to_string(),
    })
}

/// Validates a tax id. An empty value clears it.
pub fn validate_tax_id(raw: &str) -> Result<Option<String>, LedgerError> {
    let tax_id = raw.trim();
    if tax_id.is_empty() {
        return Ok(None);
    }
    if tax_id.len() > MAX_TAX_ID_DIGITS || !tax_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(LedgerError::InvalidTaxId);
    }
    Ok(Some(tax_id.to_string()))
}

/// Validates a free-form transaction.
///
/// `date`, `item`, and `amount` are required; every missing one is reported.
pub fn validate_transaction(input: &TransactionInput) -> Result<NewTransaction, LedgerError> {
    let date = present(input.date.as_deref());
    let item = present(input.item.as_deref());

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push("date");
    }
    if item.is_none() {
        missing.push("item");
    }
    if input.amount.as_ref().is_none_or(is_blank_amount) {
        missing.push("amount");
    }

    let (Some(date), Some(item), Some(amount)) = (date, item, input.amount.as_ref()) else {
        return Err(LedgerError::MissingFields(missing));
    };
    if !missing.is_empty() {
        return Err(LedgerError::MissingFields(missing));
    }

    Ok(NewTransaction {
        kind: present(input.kind.as_deref()).unwrap_or_else(|| "general".to_string()),
        date: parse_date("date", &date)?,
        item,
        service: present(input.service.as_deref()),
        payment_method: present(input.payment_method.as_deref()),
        amount: amount.parse("amount")?,
        currency: parse_currency(input.currency.as_deref())?,
        status: present(input.status.as_deref()).unwrap_or_else(|| "completed".to_string()),
    })
}

/// Validates a new client account and derives its settlement.
pub fn validate_new_client(input: &ClientInput) -> Result<ClientState, LedgerError> {
    let name = present(input.name.as_deref());
    let registration_number = present(input.registration_number.as_deref());

    let (Some(name), Some(registration_number)) = (name.clone(), registration_number.clone())
    else {
        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name");
        }
        if registration_number.is_none() {
            missing.push("registration_number");
        }
        return Err(LedgerError::MissingFields(missing));
    };

    let state = ClientState {
        name,
        registration_number,
        responsible_party: present(input.responsible_party.as_deref()),
        tax_id: match input.tax_id.as_deref() {
            Some(raw) => validate_tax_id(raw)?,
            None => None,
        },
        currency: parse_currency(input.currency.as_deref())?,
        amount: optional_amount("amount", input.amount.as_ref())?.unwrap_or(Decimal::ZERO),
        paid_amount: optional_amount("paid_amount", input.paid_amount.as_ref())?
            .unwrap_or(Decimal::ZERO),
        due_amount: Decimal::ZERO,
        status: PaymentStatus::NotPaid,
    };
    Ok(state.settled())
}

/// Applies `patch` on top of `prev`, recomputing due amount and status.
pub fn apply_client_patch(
    prev: &ClientState,
    patch: &ClientPatch,
) -> Result<ClientState, LedgerError> {
    let mut next = prev.clone();

    if let Some(name) = patch.name.as_deref() {
        next.name = non_blank("name", name)?;
    }
    if let Some(reg) = patch.registration_number.as_deref() {
        next.registration_number = non_blank("registration_number", reg)?;
    }
    if let Some(party) = patch.responsible_party.as_deref() {
        next.responsible_party = present(Some(party));
    }
    if let Some(tax_id) = patch.tax_id.as_deref() {
        next.tax_id = validate_tax_id(tax_id)?;
    }
    if let Some(currency) = patch.currency.as_deref() {
        next.currency = parse_currency(Some(currency))?;
    }
    if let Some(amount) = optional_amount("amount", patch.amount.as_ref())? {
        next.amount = amount;
    }
    if let Some(paid) = optional_amount("paid_amount", patch.paid_amount.as_ref())? {
        next.paid_amount = paid;
    }

    Ok(next.settled())
}

/// Validates a new invoice. `issue_date` defaults to `today`.
pub fn validate_invoice(input: &InvoiceInput, today: NaiveDate) -> Result<NewInvoice, LedgerError> {
    let Some(invoice_number) = present(input.invoice_number.as_deref()) else {
        let mut missing = vec!["invoice_number"];
        if input.total.is_none() {
            missing.push("total");
        }
        return Err(LedgerError::MissingFields(missing));
    };
    let Some(total) = input.total.as_ref() else {
        return Err(LedgerError::MissingFields(vec!["total"]));
    };

    let total = total.parse("total")?;
    if total.is_zero() {
        return Err(LedgerError::NonPositiveAmount("total"));
    }

    let issue_date = match present(input.issue_date.as_deref()) {
        Some(raw) => parse_date("issue_date", &raw)?,
        None => today,
    };
    let due_date = present(input.due_date.as_deref())
        .map(|raw| parse_date("due_date", &raw))
        .transpose()?;

    if due_date.is_some_and(|due| due < issue_date) {
        return Err(LedgerError::InvalidField {
            field: "due_date",
            reason: "cannot be before issue_date".to_string(),
        });
    }

    Ok(NewInvoice {
        invoice_number,
        total,
        issue_date,
        due_date,
    })
}

/// Validates a receipt request.
pub fn validate_receipt(input: &ReceiptInput) -> Result<ReceiptRequest, LedgerError> {
    let invoice_number = present(input.invoice_number.as_deref());
    let payment_date = present(input.payment_date.as_deref());
    let payment_method = present(input.payment_method.as_deref());

    let mut missing = Vec::new();
    if invoice_number.is_none() {
        missing.push("invoice_number");
    }
    if payment_date.is_none() {
        missing.push("payment_date");
    }
    if payment_method.is_none() {
        missing.push("payment_method");
    }
    if input.amount_paid.as_ref().is_none_or(is_blank_amount) {
        missing.push("amount_paid");
    }

    let (Some(invoice_number), Some(payment_date), Some(payment_method), Some(amount)) = (
        invoice_number,
        payment_date,
        payment_method,
        input.amount_paid.as_ref(),
    ) else {
        return Err(LedgerError::MissingFields(missing));
    };
    if !missing.is_empty() {
        return Err(LedgerError::MissingFields(missing));
    }

    let amount_paid = amount.parse("amount_paid")?;
    if amount_paid.is_zero() {
        return Err(LedgerError::NonPositiveAmount("amount_paid"));
    }

    Ok(ReceiptRequest {
        invoice_number,
        payment_date: parse_date("payment_date", &payment_date)?,
        payment_method,
        amount_paid,
    })
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn non_blank(field: &'static str, value: &str) -> Result<String, LedgerError> {
    present(Some(value)).ok_or_else(|| LedgerError::InvalidField {
        field,
        reason: "cannot be blank".to_string(),
    })
}

fn is_blank_amount(amount: &RawAmount) -> bool {
    matches!(amount, RawAmount::Text(s) if s.trim().is_empty())
}

fn optional_amount(
    field: &'static str,
    raw: Option<&RawAmount>,
) -> Result<Option<Decimal>, LedgerError> {
    raw.map(|r| r.parse(field)).transpose().map_err(Into::into)
}

fn parse_currency(raw: Option<&str>) -> Result<CurrencyCode, LedgerError> {
    present(raw)
        .as_deref()
        .unwrap_or(DEFAULT_CURRENCY)
        .parse()
        .map_err(|reason| LedgerError::InvalidField {
            field: "currency",
            reason,
        })
}
