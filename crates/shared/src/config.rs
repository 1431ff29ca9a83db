//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Reporting defaults.
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reporting configuration.
///
/// These are the defaults a request starts from; callers may still override
/// `convert_to_primary` per request.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    /// ISO code of the primary (home) currency.
    #[serde(default = "default_primary_currency")]
    pub primary_currency: String,
    /// Whether amounts are converted into the primary currency by default.
    #[serde(default)]
    pub convert_to_primary: bool,
    /// Maximum number of exchange rates memoized per request.
    #[serde(default = "default_rate_cache_capacity")]
    pub rate_cache_capacity: u64,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            primary_currency: default_primary_currency(),
            convert_to_primary: false,
            rate_cache_capacity: default_rate_cache_capacity(),
        }
    }
}

fn default_primary_currency() -> String {
    "EUR".to_string()
}

fn default_rate_cache_capacity() -> u64 {
    10_000
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

fn default_log_filter() -> String {
    "tally=info".to_string()
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
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
