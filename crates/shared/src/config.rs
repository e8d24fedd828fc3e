//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
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
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// How the cash-flow statement assigns entries to sections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashFlowMode {
    /// Use the entry's explicit category tag, falling back to narration keywords.
    #[default]
    TagThenKeywords,
    /// Ignore tags and classify purely by narration keywords.
    KeywordsOnly,
}

/// Ledger behaviour settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Prefix for generated reference numbers (`JE-000001`).
    #[serde(default = "default_reference_prefix")]
    pub reference_prefix: String,
    /// Cash-flow classification mode.
    #[serde(default)]
    pub cash_flow_mode: CashFlowMode,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            reference_prefix: default_reference_prefix(),
            cash_flow_mode: CashFlowMode::default(),
        }
    }
}

fn default_reference_prefix() -> String {
    "JE".to_string()
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "tally=info,sea_orm=warn".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `TALLY__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally_test")),
                ("TALLY__DATABASE__MAX_CONNECTIONS", Some("4")),
                ("TALLY__LEDGER__REFERENCE_PREFIX", Some("GJ")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/tally_test");
                assert_eq!(config.database.max_connections, 4);
                assert_eq!(config.database.min_connections, 1);
                assert_eq!(config.ledger.reference_prefix, "GJ");
                assert_eq!(config.ledger.cash_flow_mode, CashFlowMode::TagThenKeywords);
                assert_eq!(config.logging.format, LogFormat::Pretty);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_var_unset("TALLY__DATABASE__URL", || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[rstest]
    #[case("keywords_only", CashFlowMode::KeywordsOnly)]
    #[case("tag_then_keywords", CashFlowMode::TagThenKeywords)]
    fn test_cash_flow_mode_from_environment(#[case] raw: &str, #[case] expected: CashFlowMode) {
        temp_env::with_vars(
            [
                ("TALLY__DATABASE__URL", Some("postgres://localhost/tally_test")),
                ("TALLY__LEDGER__CASH_FLOW_MODE", Some(raw)),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.ledger.cash_flow_mode, expected);
            },
        );
    }
}
