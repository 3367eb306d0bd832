//! Configuration System
//!
//! Loads settings from a TOML file and applies `POS_*` environment
//! overrides on top. Every field has a default, so an empty file is valid.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::client::{ClientConfig, FileTokenStore, SessionContext, SessionError};
use crate::render::DisplayOptions;
use crate::sales::{CheckoutPolicy, FailurePolicy, SessionSettings};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub listing: ListingConfig,

    #[serde(default)]
    pub cart: CartConfig,

    #[serde(default)]
    pub checkout: CheckoutConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API connection
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Where the session token is kept
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_key")]
    pub token_key: String,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_token_key() -> String {
    "token".to_string()
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("pos-admin").to_string_lossy().to_string())
        .unwrap_or_else(|| "./pos_admin_data".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_key: default_token_key(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

fn default_page_size() -> usize {
    crate::listing::DEFAULT_PAGE_SIZE
}

fn default_top_n() -> usize {
    crate::reports::DEFAULT_TOP_N
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            top_n: default_top_n(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CartConfig {
    #[serde(default = "default_surcharge_percent")]
    pub surcharge_percent: u32,

    #[serde(default = "default_add_debounce_ms")]
    pub add_debounce_ms: u64,
}

fn default_surcharge_percent() -> u32 {
    crate::sales::DEFAULT_SURCHARGE_PERCENT
}

fn default_add_debounce_ms() -> u64 {
    500
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            surcharge_percent: default_surcharge_percent(),
            add_debounce_ms: default_add_debounce_ms(),
        }
    }
}

/// What happens when an order line cannot be written
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfig {
    #[serde(default = "default_line_retries")]
    pub line_retries: u32,

    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_on_failure")]
    pub on_failure: FailurePolicy,
}

fn default_line_retries() -> u32 {
    1
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_on_failure() -> FailurePolicy {
    FailurePolicy::Cancel
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            line_retries: default_line_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            on_failure: default_on_failure(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default = "default_date_format")]
    pub date_format: String,
}

fn default_format() -> String {
    "table".to_string()
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            currency_symbol: default_currency_symbol(),
            date_format: default_date_format(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("pos-admin").join("config.toml")),
            Some(PathBuf::from("/etc/pos-admin/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `POS_*` overrides read through `lookup`
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("POS_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup("POS_API_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.api.timeout_ms = timeout;
        }

        if let Some(key) = lookup("POS_TOKEN_KEY") {
            self.session.token_key = key;
        }
        if let Some(dir) = lookup("POS_DATA_DIR") {
            self.session.data_dir = dir;
        }

        if let Some(size) = lookup("POS_PAGE_SIZE").and_then(|v| v.parse().ok()) {
            self.listing.page_size = size;
        }

        if let Some(level) = lookup("POS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("POS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.base_url.clone(),
            request_timeout_ms: self.api.timeout_ms,
        }
    }

    /// Data directory with a leading `~/` expanded
    pub fn data_dir(&self) -> PathBuf {
        match (self.session.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.session.data_dir),
        }
    }

    /// Session backed by the token file in the data directory
    pub fn open_session(&self) -> Result<Arc<SessionContext>, SessionError> {
        let store = FileTokenStore::new(self.data_dir(), &self.session.token_key);
        Ok(Arc::new(SessionContext::restore(Arc::new(store))?))
    }

    pub fn sales_settings(&self) -> SessionSettings {
        SessionSettings {
            add_debounce: Duration::from_millis(self.cart.add_debounce_ms),
            surcharge_percent: self.cart.surcharge_percent,
            picker_page_size: self.listing.page_size.max(1),
            checkout: CheckoutPolicy {
                line_retries: self.checkout.line_retries,
                retry_backoff: Duration::from_millis(self.checkout.retry_backoff_ms),
                on_failure: self.checkout.on_failure,
            },
        }
    }

    pub fn display_options(&self) -> DisplayOptions {
        DisplayOptions {
            currency_symbol: self.display.currency_symbol.clone(),
            date_format: self.display.date_format.clone(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# pos-admin configuration
#
# Environment variables override these settings:
# - POS_API_URL
# - POS_API_TIMEOUT_MS
# - POS_TOKEN_KEY
# - POS_DATA_DIR
# - POS_PAGE_SIZE
# - POS_LOG_LEVEL
# - POS_LOG_FORMAT

[api]
# Backend base URL
base_url = "http://localhost:3000"

# Timeout applied to every request (ms)
timeout_ms = 10000

[session]
# Name of the stored token; the token file is <data_dir>/<token_key>
token_key = "token"

# Directory holding the token file
data_dir = "~/.local/share/pos-admin"

[listing]
# Rows per page in lists and pickers
page_size = 10

# Entries in ranked report lists
top_n = 5

[cart]
# Surcharge added to the subtotal (percent)
surcharge_percent = 10

# Adds closer together than this are ignored (ms)
add_debounce_ms = 500

[checkout]
# Extra attempts for an order line that fails
line_retries = 1

# Pause before each retry, multiplied by the attempt number (ms)
retry_backoff_ms = 250

# What to do with a partially written order: cancel or leave
on_failure = "cancel"

[display]
# Output format: table, json, csv
format = "table"

# Prefix for amounts
currency_symbol = "$"

# strftime format for timestamps
date_format = "%Y-%m-%d %H:%M"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}
