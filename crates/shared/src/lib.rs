//! Shared types, errors, and configuration for Haulbook.
//!
//! This crate provides common types used across all other crates:
//! - Amount parsing with two-decimal currency precision
//! - Typed IDs for type-safe entity references
//! - Pagination types for list endpoints
//! - Application-wide error taxonomy
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
