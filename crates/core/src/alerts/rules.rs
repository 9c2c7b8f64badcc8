//! Alert rule definitions.
//!
//! Rules are configuration data, read from a TOML file each time an
//! evaluation runs:
//!
//! ```toml
//! [[rules]]
//! key = "invoice-overdue-30"
//! condition = { kind = "invoice_overdue", days = 30 }
//! target = { kind = "owner" }
//! ```

use std::collections::BTreeSet;

use serde::Deserialize;
use uuid::Uuid;

use super::error::AlertError;
use crate::notification::NotificationKind;

/// The predicate a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertCondition {
    /// Float balance below the replenishment threshold.
    FloatBelowReplenishment,
    /// Unpaid invoice more than `days` past its due date.
    InvoiceOverdue {
        /// Grace period after the due date.
        days: u32,
    },
    /// Pending petty cash entry older than `hours`.
    PendingApprovalStale {
        /// Maximum age before the alert fires.
        hours: u32,
    },
}

impl AlertCondition {
    /// Notification kind emitted for this condition.
    #[must_use]
    pub const fn notification_kind(&self) -> NotificationKind {
        match self {
            Self::FloatBelowReplenishment => NotificationKind::FloatBelowReplenishment,
            Self::InvoiceOverdue { .. } => NotificationKind::InvoiceOverdue,
            Self::PendingApprovalStale { .. } => NotificationKind::PendingApprovalStale,
        }
    }
}

/// Who is told when a rule fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlertTarget {
    /// The owner of the affected entity; everyone for the float.
    #[default]
    Owner,
    /// Everyone.
    Broadcast,
    /// One fixed user.
    User {
        /// The user.
        id: Uuid,
    },
}

/// One configured rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AlertRule {
    /// Stable identifier; part of the edge-detector key.
    pub key: String,
    /// Predicate.
    pub condition: AlertCondition,
    /// Recipient policy.
    #[serde(default)]
    pub target: AlertTarget,
    /// Disabled rules are skipped.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// The full rule configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RuleSet {
    /// Rules in file order.
    #[serde(default)]
    pub rules: Vec<AlertRule>,
}

impl RuleSet {
    /// Loads rules from `path` (extension optional).
    ///
    /// A missing or unreadable file is `RulesUnavailable`, never an empty set;
    /// an empty set would clear every active alert.
    pub fn load(path: &str) -> Result<Self, AlertError> {
        let source = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()
            .map_err(|e| AlertError::RulesUnavailable(e.to_string()))?;
        Self::from_config(source)
    }

    /// Parses rules from TOML text.
    pub fn from_toml(text: &str) -> Result<Self, AlertError> {
        let source = config::Config::builder()
            .add_source(config::File::from_str(text, config::FileFormat::Toml))
            .build()
            .map_err(|e| AlertError::InvalidRules(e.to_string()))?;
        Self::from_config(source)
    }

    fn from_config(source: config::Config) -> Result<Self, AlertError> {
        let set: Self = source
            .try_deserialize()
            .map_err(|e| AlertError::InvalidRules(e.to_string()))?;
        set.validate()?;
        Ok(set)
    }

    /// Rejects blank and duplicate keys.
    pub fn validate(&self) -> Result<(), AlertError> {
        let mut seen = BTreeSet::new();
        for rule in &self.rules {
            if rule.key.trim().is_empty() {
                return Err(AlertError::InvalidRules("rule key cannot be blank".to_string()));
            }
            if !seen.insert(rule.key.as_str()) {
                return Err(AlertError::InvalidRules(format!(
                    "duplicate rule key '{}'",
                    rule.key
                )));
            }
        }
        Ok(())
    }

    /// Iterates over enabled rules.
    pub fn enabled(&self) -> impl Iterator<Item = &AlertRule> {
        self.rules.iter().filter(|r| r.enabled)
    }

    /// Keys of the enabled rules.
    #[must_use]
    pub fn enabled_keys(&self) -> BTreeSet<&str> {
        self.enabled().map(|r| r.key.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &str = r#"
[[rules]]
key = "float-low"
condition = { kind = "float_below_replenishment" }

[[rules]]
key = "overdue-30"
condition = { kind = "invoice_overdue", days = 30 }
target = { kind = "broadcast" }

[[rules]]
key = "stale-48"
condition = { kind = "pending_approval_stale", hours = 48 }
target = { kind = "user", id = "0192b2a4-6c1e-7d3a-9f10-5a4b3c2d1e0f" }
enabled = false
"#;

    #[test]
    fn test_parse_rules() {
        let set = RuleSet::from_toml(RULES).unwrap();
        assert_eq!(set.rules.len(), 3);
        assert_eq!(set.rules[0].target, AlertTarget::Owner);
        assert!(set.rules[0].enabled);
        assert_eq!(
            set.rules[1].condition,
            AlertCondition::InvoiceOverdue { days: 30 }
        );
        assert!(matches!(set.rules[2].target, AlertTarget::User { .. }));
        assert_eq!(set.enabled().count(), 2);
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let text = r#"
[[rules]]
key = "a"
condition = { kind = "float_below_replenishment" }
[[rules]]
key = "a"
condition = { kind = "float_below_replenishment" }
"#;
        assert!(matches!(
            RuleSet::from_toml(text),
            Err(AlertError::InvalidRules(_))
        ));
    }

    #[test]
    fn test_unknown_condition_rejected() {
        let text = r#"
[[rules]]
key = "a"
condition = { kind = "moon_phase" }
"#;
        assert!(RuleSet::from_toml(text).is_err());
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        assert!(matches!(
            RuleSet::load("config/does-not-exist"),
            Err(AlertError::RulesUnavailable(_))
        ));
    }

    #[test]
    fn test_enabled_keys_skip_disabled() {
        let set = RuleSet::from_toml(RULES).unwrap();
        assert_eq!(
            set.enabled_keys(),
            BTreeSet::from(["float-low", "overdue-30"])
        );
    }
}
