//! Field-level diffs for client audit history.

use haulbook_shared::types::format_amount;

use super::types::ClientState;

/// Summary recorded when an update changes nothing.
pub const NO_CHANGES: &str = "no changes";

/// One changed field, rendered for humans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    /// Field name.
    pub field: &'static str,
    /// Previous value, empty if unset.
    pub old: String,
    /// New value, empty if unset.
    pub new: String,
}

/// Lists every field that differs between `prev` and `next`.
///
/// Derived fields (`due_amount`, `status`) are included, so a payment that
/// settles the account shows the status change too.
#[must_use]
pub fn diff_clients(prev: &ClientState, next: &ClientState) -> Vec<FieldChange> {
    let pairs: [(&'static str, String, String); 9] = [
        ("name", prev.name.clone(), next.name.clone()),
        (
            "registration_number",
            prev.registration_number.clone(),
            next.registration_number.clone(),
        ),
        (
            "responsible_party",
            opt(prev.responsible_party.as_deref()),
            opt(next.responsible_party.as_deref()),
        ),
        ("tax_id", opt(prev.tax_id.as_deref()), opt(next.tax_id.as_deref())),
        (
            "currency",
            prev.currency.to_string(),
            next.currency.to_string(),
        ),
        ("amount", format_amount(prev.amount), format_amount(next.amount)),
        (
            "paid_amount",
            format_amount(prev.paid_amount),
            format_amount(next.paid_amount),
        ),
        (
            "due_amount",
            format_amount(prev.due_amount),
            format_amount(next.due_amount),
        ),
        ("status", prev.status.to_string(), next.status.to_string()),
    ];

    pairs
        .into_iter()
        .filter(|(_, old, new)| old != new)
        .map(|(field, old, new)| FieldChange { field, old, new })
        .collect()
}

/// Renders changes as `field: 'old' → 'new'` joined by `; `.
#[must_use]
pub fn summarize_changes(changes: &[FieldChange]) -> String {
    if changes.is_empty() {
        return NO_CHANGES.to_string();
    }
    changes
        .iter()
        .map(|c| format!("{}: '{}' → '{}'", c.field, c.old, c.new))
        .collect::<Vec<_>>()
        .join("; ")
}

fn opt(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}
