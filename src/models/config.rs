//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Tracked account and credential
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// HTTP and pagination behavior settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Snapshot and history file settings
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        validate_account(&self.tracker.account)?;
        if self.api.user_agent.trim().is_empty() {
            return Err(AppError::validation("api.user_agent is empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(AppError::validation("api.timeout_secs must be > 0"));
        }
        if self.api.page_size == 0 || self.api.page_size > 100 {
            return Err(AppError::validation("api.page_size must be within 1..=100"));
        }
        if self.storage.max_history == 0 {
            return Err(AppError::validation("storage.max_history must be > 0"));
        }
        Ok(())
    }
}

/// Reject account identifiers that cannot name a single URL path segment.
pub(crate) fn validate_account(account: &str) -> Result<()> {
    if account.trim().is_empty() {
        return Err(AppError::config("tracker.account is empty"));
    }
    if account.contains('/') || account.chars().any(char::is_whitespace) {
        return Err(AppError::config(format!(
            "tracker.account '{}' is not a valid account name",
            account
        )));
    }
    Ok(())
}

/// The tracked account.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Account whose followers are observed
    #[serde(default)]
    pub account: String,

    /// Optional bearer credential for higher API limits
    #[serde(default)]
    pub token: Option<String>,
}

/// HTTP client and pagination settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Records requested per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Fixed pause between page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Back off until the reset time when fewer calls than this remain
    #[serde(default = "defaults::rate_limit_low_water")]
    pub rate_limit_low_water: u64,
}

impl ApiConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_size: defaults::page_size(),
            request_delay_ms: defaults::request_delay(),
            rate_limit_low_water: defaults::rate_limit_low_water(),
        }
    }
}

/// Where and how much to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding snapshot and history files
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    /// Cap for each history sequence
    #[serde(default = "defaults::max_history")]
    pub max_history: usize,

    /// Number of recent events reported by stats
    #[serde(default = "defaults::recent_count")]
    pub recent_count: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            max_history: defaults::max_history(),
            recent_count: defaults::recent_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // API defaults
    pub fn base_url() -> String {
        "https://api.github.com".into()
    }
    pub fn user_agent() -> String {
        concat!("follow-tracker/", env!("CARGO_PKG_VERSION")).into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn page_size() -> usize {
        100
    }
    pub fn request_delay() -> u64 {
        1000
    }
    pub fn rate_limit_low_water() -> u64 {
        10
    }

    // Storage defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("storage")
    }
    pub fn max_history() -> usize {
        1000
    }
    pub fn recent_count() -> usize {
        5
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
