//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Receipt policy configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Petty cash policy configuration.
    #[serde(default)]
    pub petty_cash: PettyCashConfig,
    /// Alert evaluation configuration.
    #[serde(default)]
    pub alerts: AlertsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection before failing transiently.
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_acquire_timeout() -> u64 {
    5
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

fn default_log_filter() -> String {
    "haulbook=info,tower_http=info".to_string()
}

/// How float settings with `approval_threshold > max_limit` are treated.
///
/// Pending confirmation with the finance owners, so the behavior is an
/// explicit deployment choice rather than an implicit default in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdOrderPolicy {
    /// Refuse to activate out-of-order settings.
    #[default]
    Reject,
    /// Activate them, logging a warning.
    Warn,
}

/// Petty cash policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PettyCashConfig {
    /// Handling of `approval_threshold > max_limit`.
    #[serde(default)]
    pub threshold_order: ThresholdOrderPolicy,
}

/// How receipts larger than an invoice's due amount are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverpaymentPolicy {
    /// Refuse the receipt with `LimitExceeded("outstanding_balance")`.
    #[default]
    Reject,
    /// Apply it; the invoice is paid and its due amount clamps to zero.
    Accept,
}

/// Receipt policy configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerConfig {
    /// Handling of receipts above the outstanding amount.
    #[serde(default)]
    pub overpayment: OverpaymentPolicy,
}

/// Alert evaluation configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AlertsConfig {
    /// Seconds between scheduled evaluations; 0 disables the scheduler.
    #[serde(default = "default_alert_interval")]
    pub interval_secs: u64,
    /// Run an evaluation after each committed ledger mutation.
    #[serde(default)]
    pub evaluate_on_mutation: bool,
    /// Path (without extension) of the rule definitions file.
    #[serde(default = "default_rules_file")]
    pub rules_file: String,
}

impl Default for AlertsConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_alert_interval(),
            evaluate_on_mutation: false,
            rules_file: default_rules_file(),
        }
    }
}

fn default_alert_interval() -> u64 {
    300
}

fn default_rules_file() -> String {
    "config/alert_rules".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("HAULBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment_with_defaults() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("config-test-nonexistent")),
                ("HAULBOOK__DATABASE__URL", Some("sqlite::memory:")),
                ("HAULBOOK__PETTY_CASH__THRESHOLD_ORDER", Some("warn")),
                ("HAULBOOK__LEDGER__OVERPAYMENT", Some("accept")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "sqlite::memory:");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.petty_cash.threshold_order, ThresholdOrderPolicy::Warn);
                assert_eq!(config.ledger.overpayment, OverpaymentPolicy::Accept);
                assert_eq!(config.alerts.interval_secs, 300);
                assert!(!config.alerts.evaluate_on_mutation);
                assert!(!config.logging.json);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("RUN_MODE", Some("config-test-nonexistent")),
                ("HAULBOOK__DATABASE__URL", None::<&str>),
            ],
            || {
                // config/default.toml is resolved relative to the crate dir in tests
                // and does not exist there, so the url is genuinely absent.
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_threshold_policy_defaults_to_reject() {
        assert_eq!(PettyCashConfig::default().threshold_order, ThresholdOrderPolicy::Reject);
        assert_eq!(LedgerConfig::default().overpayment, OverpaymentPolicy::Reject);
    }
}
