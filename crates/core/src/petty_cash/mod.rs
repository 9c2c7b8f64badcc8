//! Petty cash float tracking and approval workflow.
//!
//! # Modules
//!
//! - `types` - Entries, settings versions, and float summaries
//! - `workflow` - Approval state machine (pending, approved, rejected, locked)
//! - `float` - Balance derivation and float/period limit checks
//! - `settings` - Settings validation under the threshold-order policy
//! - `validation` - Entry, attachment reference, and category rules
//! - `error` - Petty cash errors

pub mod error;
pub mod float;
pub mod settings;
pub mod types;
pub mod validation;
pub mod workflow;

#[cfg(test)]
mod float_props;
#[cfg(test)]
mod workflow_props;

pub use error::{LimitKind, PettyCashError};
pub use float::FloatService;
pub use settings::validate_settings;
pub use types::{
    ApprovalStatus, EntryInput, EntryPatch, EntryState, EntryType, FloatLimits, FloatSettings,
    FloatSummary, MovementTotals, NewEntry, PeriodUsage, SettingsInput, ValidPatch,
};
pub use validation::{
    validate_attachment_ref, validate_category_name, validate_entry, validate_patch,
};
pub use workflow::{Decision, PettyCashWorkflow};
