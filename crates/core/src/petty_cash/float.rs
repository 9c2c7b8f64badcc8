//! Float balance and limit checks.
//!
//! The balance is never stored. It is derived from the governing settings
//! version and the approved movements every time it is needed.

use rust_decimal::Decimal;

use super::error::{LimitKind, PettyCashError};
use super::types::{EntryType, FloatLimits, FloatSettings, FloatSummary, MovementTotals, PeriodUsage};

/// Stateless float arithmetic.
pub struct FloatService;

impl FloatService {
    /// `initial_float + approved in - approved out`.
    #[must_use]
    pub fn balance(initial_float: Decimal, totals: &MovementTotals) -> Decimal {
        initial_float + totals.approved_in - totals.approved_out
    }

    /// Checks whether applying a movement keeps the float within its bounds.
    ///
    /// Outflows must be covered by the balance and fit inside the daily and
    /// monthly caps; inflows must not lift the balance above `max_limit`.
    ///
    /// # Errors
    ///
    /// `LimitExceeded` naming the first bound breached.
    pub fn check_apply(
        limits: &FloatLimits,
        balance: Decimal,
        usage: &PeriodUsage,
        entry_type: EntryType,
        amount: Decimal,
    ) -> Result<(), PettyCashError> {
        let exceeded = |kind, limit| PettyCashError::LimitExceeded { kind, limit, amount };

        match entry_type {
            EntryType::Out => {
                if amount > balance {
                    return Err(exceeded(LimitKind::AvailableFloat, balance));
                }
                if let Some(daily) = limits.daily_limit
                    && usage.day_out + amount > daily
                {
                    return Err(exceeded(LimitKind::DailyLimit, daily));
                }
                if let Some(monthly) = limits.monthly_limit
                    && usage.month_out + amount > monthly
                {
                    return Err(exceeded(LimitKind::MonthlyLimit, monthly));
                }
            }
            EntryType::In => {
                if balance + amount > limits.max_limit {
                    return Err(exceeded(LimitKind::MaxLimit, limits.max_limit));
                }
            }
        }
        Ok(())
    }

    /// Summarises the float under `settings`.
    #[must_use]
    pub fn summary(settings: &FloatSettings, totals: MovementTotals) -> FloatSummary {
        let balance = Self::balance(settings.limits.initial_float, &totals);
        FloatSummary {
            balance,
            totals,
            settings_version: settings.version,
            replenishment_threshold: settings.limits.replenishment_threshold,
            needs_replenishment: balance < settings.limits.replenishment_threshold,
        }
    }
}
