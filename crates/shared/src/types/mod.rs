//! Common types used across the application.

pub mod id;
pub mod money;
pub mod pagination;

pub use id::UserId;
pub use money::{AmountError, CurrencyCode, RawAmount, format_amount, parse_amount};
pub use pagination::{PageRequest, PageResponse, clamp_limit};
