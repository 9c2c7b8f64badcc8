//! Alert rule evaluation.
//!
//! - `rules` - Rule definitions loaded from configuration
//! - `evaluator` - Predicates over a ledger snapshot and edge detection
//! - `error` - Alert errors

pub mod error;
pub mod evaluator;
pub mod rules;

#[cfg(test)]
mod evaluator_props;

pub use error::AlertError;
pub use evaluator::{
    AlertEvaluator, EdgePlan, FLOAT_ENTITY, InvoiceFacts, LedgerSnapshot, PendingEntryFacts,
    Violation,
};
pub use rules::{AlertCondition, AlertRule, AlertTarget, RuleSet};
