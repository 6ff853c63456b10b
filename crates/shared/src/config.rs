//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Receivables posting configuration.
    #[serde(default)]
    pub posting: PostingConfig,
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

/// Names of the shared accounts and categories the posting engine resolves
/// on first use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostingConfig {
    /// Asset account that carries open receivables.
    #[serde(default = "default_receivable_account")]
    pub receivable_account: String,
    /// Revenue category used for invoice revenue.
    #[serde(default = "default_sales_category")]
    pub sales_category: String,
    /// Account names treated as cash on hand, in lookup order.
    #[serde(default = "default_cash_accounts")]
    pub cash_accounts: Vec<String>,
}

fn default_receivable_account() -> String {
    "Accounts Receivable".to_string()
}

fn default_sales_category() -> String {
    "Sales".to_string()
}

fn default_cash_accounts() -> Vec<String> {
    vec!["Cash".to_string(), "Bank".to_string()]
}

impl Default for PostingConfig {
    fn default() -> Self {
        Self {
            receivable_account: default_receivable_account(),
            sales_category: default_sales_category(),
            cash_accounts: default_cash_accounts(),
        }
    }
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

fn default_log_filter() -> String {
    "tally=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
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
            .add_source(
                config::Environment::with_prefix("TALLY")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("posting.cash_accounts")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
