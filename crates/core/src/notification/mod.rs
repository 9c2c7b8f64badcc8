//! Notification dispatch: kinds, recipients, and manual creation rules.

pub mod error;
pub mod types;
pub mod validation;

pub use error::NotificationError;
pub use types::{NewNotification, NotificationInput, NotificationKind, Recipient};
pub use validation::validate_notification;
