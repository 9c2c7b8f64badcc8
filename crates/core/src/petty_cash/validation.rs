//! Field validation for petty cash entries and categories.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::error::PettyCashError;
use super::types::{EntryInput, EntryPatch, EntryType, NewEntry, ValidPatch};

/// Longest accepted attachment reference.
pub const MAX_ATTACHMENT_REF_LEN: usize = 255;

/// Longest accepted category name.
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Validates a new entry.
pub fn validate_entry(input: &EntryInput) -> Result<NewEntry, PettyCashError> {
    let date = present(input.transaction_date.as_deref());
    let description = present(input.description.as_deref());
    let entry_type = present(input.transaction_type.as_deref());

    let mut missing = Vec::new();
    if date.is_none() {
        missing.push("transaction_date");
    }
    if description.is_none() {
        missing.push("description");
    }
    if input.amount.is_none() {
        missing.push("amount");
    }
    if entry_type.is_none() {
        missing.push("transaction_type");
    }
    let (Some(date), Some(description), Some(amount), Some(entry_type)) =
        (date, description, input.amount.as_ref(), entry_type)
    else {
        return Err(PettyCashError::MissingFields(missing));
    };

    Ok(NewEntry {
        transaction_date: parse_date("transaction_date", &date)?,
        description,
        beneficiary: present(input.beneficiary.as_deref()),
        purpose: present(input.purpose.as_deref()),
        amount: positive(amount.parse("amount")?)?,
        entry_type: parse_type(&entry_type)?,
        category_id: input.category_id,
        payment_method: present(input.payment_method.as_deref()),
        reference: present(input.reference.as_deref()),
        receipt_attachment: input
            .receipt_attachment
            .as_deref()
            .filter(|r| !r.is_empty())
            .map(validate_attachment_ref)
            .transpose()?,
        notes: present(input.notes.as_deref()),
    })
}

/// Validates the fields of a patch. Workflow rules are checked separately.
pub fn validate_patch(patch: &EntryPatch) -> Result<ValidPatch, PettyCashError> {
    let description = match patch.description.as_deref() {
        Some(d) => Some(
            present(Some(d)).ok_or_else(|| PettyCashError::MissingFields(vec!["description"]))?,
        ),
        None => None,
    };

    Ok(ValidPatch {
        description,
        beneficiary: patch.beneficiary.as_deref().map(|v| present(Some(v))),
        purpose: patch.purpose.as_deref().map(|v| present(Some(v))),
        category_id: patch.category_id,
        payment_method: patch.payment_method.as_deref().map(|v| present(Some(v))),
        reference: patch.reference.as_deref().map(|v| present(Some(v))),
        receipt_attachment: patch
            .receipt_attachment
            .as_deref()
            .map(|r| {
                if r.is_empty() {
                    Ok(None)
                } else {
                    validate_attachment_ref(r).map(Some)
                }
            })
            .transpose()?,
        notes: patch.notes.as_deref().map(|v| present(Some(v))),
        amount: patch
            .amount
            .as_ref()
            .map(|a| a.parse("amount").map_err(PettyCashError::from).and_then(positive))
            .transpose()?,
        entry_type: patch.transaction_type.as_deref().map(parse_type).transpose()?,
        transaction_date: patch
            .transaction_date
            .as_deref()
            .map(|d| parse_date("transaction_date", d))
            .transpose()?,
    })
}

/// Validates the shape of a file-store reference.
///
/// The engine never opens the file; it only refuses references that could
/// escape the store's namespace.
pub fn validate_attachment_ref(raw: &str) -> Result<String, PettyCashError> {
    if raw.is_empty() || raw.len() > MAX_ATTACHMENT_REF_LEN {
        return Err(PettyCashError::InvalidAttachment("must be 1 to 255 characters"));
    }
    if raw.chars().any(char::is_control) {
        return Err(PettyCashError::InvalidAttachment(
            "cannot contain control characters",
        ));
    }
    if raw.contains("..") {
        return Err(PettyCashError::InvalidAttachment("cannot contain '..'"));
    }
    if raw.starts_with('/') {
        return Err(PettyCashError::InvalidAttachment("cannot start with '/'"));
    }
    Ok(raw.to_string())
}

/// Validates a category name.
pub fn validate_category_name(raw: &str) -> Result<String, PettyCashError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_CATEGORY_NAME_LEN {
        return Err(PettyCashError::InvalidCategoryName);
    }
    Ok(name.to_string())
}

fn present(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn positive(amount: Decimal) -> Result<Decimal, PettyCashError> {
    if amount.is_zero() {
        Err(PettyCashError::NonPositiveAmount)
    } else {
        Ok(amount)
    }
}

fn parse_type(raw: &str) -> Result<EntryType, PettyCashError> {
    EntryType::parse(raw).ok_or_else(|| PettyCashError::InvalidEntryType(raw.trim().to_string()))
}

fn parse_date(field: &'static str, raw: &str) -> Result<NaiveDate, PettyCashError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| PettyCashError::InvalidDate {
        field,
        value: raw.trim().to_string(),
    })
}
