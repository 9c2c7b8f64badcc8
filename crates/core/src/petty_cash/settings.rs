//! Float settings validation.

use haulbook_shared::config::ThresholdOrderPolicy;
use haulbook_shared::types::RawAmount;
use rust_decimal::Decimal;

use super::error::PettyCashError;
use super::types::{FloatLimits, SettingsInput};

/// Validates a settings version before activation.
///
/// All amounts must be non-negative. `initial_float` and
/// `replenishment_threshold` may not exceed `max_limit`, and a daily limit may
/// not exceed the monthly one. `approval_threshold > max_limit` is governed by
/// `policy`.
pub fn validate_settings(
    input: &SettingsInput,
    policy: ThresholdOrderPolicy,
) -> Result<FloatLimits, PettyCashError> {
    let mut missing = Vec::new();
    for (field, value) in [
        ("initial_float", &input.initial_float),
        ("max_limit", &input.max_limit),
        ("replenishment_threshold", &input.replenishment_threshold),
        ("approval_threshold", &input.approval_threshold),
    ] {
        if value.is_none() {
            missing.push(field);
        }
    }
    let (Some(initial), Some(max), Some(replenish), Some(approval)) = (
        &input.initial_float,
        &input.max_limit,
        &input.replenishment_threshold,
        &input.approval_threshold,
    ) else {
        return Err(PettyCashError::MissingFields(missing));
    };

    let limits = FloatLimits {
        initial_float: initial.parse("initial_float")?,
        max_limit: max.parse("max_limit")?,
        replenishment_threshold: replenish.parse("replenishment_threshold")?,
        approval_threshold: approval.parse("approval_threshold")?,
        daily_limit: optional("daily_limit", input.daily_limit.as_ref())?,
        monthly_limit: optional("monthly_limit", input.monthly_limit.as_ref())?,
    };

    if limits.initial_float > limits.max_limit {
        return Err(PettyCashError::InvalidSettings(
            "initial_float cannot exceed max_limit".to_string(),
        ));
    }
    if limits.replenishment_threshold > limits.max_limit {
        return Err(PettyCashError::InvalidSettings(
            "replenishment_threshold cannot exceed max_limit".to_string(),
        ));
    }
    if let (Some(daily), Some(monthly)) = (limits.daily_limit, limits.monthly_limit)
        && daily > monthly
    {
        return Err(PettyCashError::InvalidSettings(
            "daily_limit cannot exceed monthly_limit".to_string(),
        ));
    }

    if limits.approval_threshold > limits.max_limit {
        match policy {
            ThresholdOrderPolicy::Reject => {
                return Err(PettyCashError::ThresholdOrder {
                    approval_threshold: limits.approval_threshold,
                    max_limit: limits.max_limit,
                });
            }
            ThresholdOrderPolicy::Warn => {
                tracing::warn!(
                    approval_threshold = %limits.approval_threshold,
                    max_limit = %limits.max_limit,
                    "Activating settings with approval_threshold above max_limit"
                );
            }
        }
    }

    Ok(limits)
}

fn optional(field: &str, raw: Option<&RawAmount>) -> Result<Option<Decimal>, PettyCashError> {
    raw.map(|r| r.parse(field)).transpose().map_err(Into::into)
}
