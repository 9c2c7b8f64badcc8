//! Monetary amounts with two-decimal currency precision.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts travel as decimal strings (or JSON numbers rendered to strings)
//! and are parsed into `rust_decimal::Decimal` exactly once, here.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of fractional digits accepted for currency amounts.
pub const CURRENCY_SCALE: u32 = 2;

/// Reasons an amount string is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Nothing was supplied.
    #[error("{field} is required")]
    Missing {
        /// The offending field name.
        field: String,
    },
    /// The text is not a decimal number.
    #[error("{field} must be a decimal number, got '{value}'")]
    Malformed {
        /// The offending field name.
        field: String,
        /// The raw input.
        value: String,
    },
    /// Negative amounts are not accepted.
    #[error("{field} cannot be negative")]
    Negative {
        /// The offending field name.
        field: String,
    },
    /// More than two decimal places.
    #[error("{field} allows at most 2 decimal places")]
    TooPrecise {
        /// The offending field name.
        field: String,
    },
}

/// Parses a non-negative currency amount named `field`.
///
/// Accepts surrounding whitespace and trailing zeros beyond the second
/// decimal (`"10.500"` is `10.50`), rejects anything that would need rounding.
pub fn parse_amount(field: &str, raw: &str) -> Result<Decimal, AmountError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AmountError::Missing {
            field: field.to_string(),
        });
    }

    let value = Decimal::from_str(trimmed).map_err(|_| AmountError::Malformed {
        field: field.to_string(),
        value: trimmed.to_string(),
    })?;

    if value.is_sign_negative() && !value.is_zero() {
        return Err(AmountError::Negative {
            field: field.to_string(),
        });
    }

    let normalized = value.normalize();
    if normalized.scale() > CURRENCY_SCALE {
        return Err(AmountError::TooPrecise {
            field: field.to_string(),
        });
    }

    Ok(normalized.round_dp(CURRENCY_SCALE))
}

/// Renders an amount with exactly two decimals, e.g. `"1000.00"`.
#[must_use]
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp(CURRENCY_SCALE))
}

/// An amount as it arrives at the boundary: a decimal string or a JSON number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// `"1000.00"`
    Text(String),
    /// `1000.0`
    Number(serde_json::Number),
}

impl RawAmount {
    /// Parses the amount for `field` with [`parse_amount`].
    pub fn parse(&self, field: &str) -> Result<Decimal, AmountError> {
        match self {
            Self::Text(s) => parse_amount(field, s),
            Self::Number(n) => parse_amount(field, &n.to_string()),
        }
    }
}

impl From<&str> for RawAmount {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// ISO 4217 style three-letter currency code, stored upper-case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(code.to_ascii_uppercase()))
        } else {
            Err(format!("Unknown currency: {s}"))
        }
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("1000", dec!(1000))]
    #[case(" 400.5 ", dec!(400.50))]
    #[case("0.01", dec!(0.01))]
    #[case("10.500", dec!(10.50))]
    #[case("0", dec!(0))]
    fn test_parse_amount_accepts(#[case] raw: &str, #[case] expected: Decimal) {
        assert_eq!(parse_amount("amount", raw).unwrap(), expected);
    }

    #[test]
    fn test_parse_amount_rejects_missing() {
        assert_eq!(
            parse_amount("amount", "  "),
            Err(AmountError::Missing {
                field: "amount".into()
            })
        );
    }

    #[test]
    fn test_parse_amount_rejects_malformed() {
        let err = parse_amount("paid_amount", "12,50").unwrap_err();
        assert!(matches!(err, AmountError::Malformed { .. }));
        assert_eq!(
            err.to_string(),
            "paid_amount must be a decimal number, got '12,50'"
        );
    }

    #[test]
    fn test_parse_amount_rejects_negative() {
        assert!(matches!(
            parse_amount("amount", "-5"),
            Err(AmountError::Negative { .. })
        ));
    }

    #[test]
    fn test_parse_amount_rejects_sub_cent() {
        assert!(matches!(
            parse_amount("amount", "1.005"),
            Err(AmountError::TooPrecise { .. })
        ));
    }

    #[test]
    fn test_raw_amount_accepts_strings_and_numbers() {
        let text: RawAmount = serde_json::from_str("\"250.75\"").unwrap();
        let number: RawAmount = serde_json::from_str("250.75").unwrap();
        assert_eq!(text.parse("amount").unwrap(), dec!(250.75));
        assert_eq!(number.parse("amount").unwrap(), dec!(250.75));

        let integer: RawAmount = serde_json::from_str("600").unwrap();
        assert_eq!(integer.parse("amount").unwrap(), dec!(600));
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec!(1000)), "1000.00");
        assert_eq!(format_amount(dec!(12.5)), "12.50");
    }

    #[test]
    fn test_currency_code() {
        assert_eq!(CurrencyCode::from_str("usd").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::from_str(" EUR ").unwrap().to_string(), "EUR");
        assert!(CurrencyCode::from_str("EURO").is_err());
        assert!(CurrencyCode::from_str("U$D").is_err());
    }
}
