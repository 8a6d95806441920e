//! # Register Configuration
//!
//! Configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`TILL_*`)
//! 2. Config file (`--config`, or `register.toml` in the platform config dir)
//! 3. Defaults (this file)
//!
//! ## Example `register.toml`
//! ```toml
//! [database]
//! path = "/var/lib/till/till.db"
//! max_connections = 5
//!
//! [shop]
//! name = "Sharma General Store"
//! address = ["12 MG Road", "Bengaluru 560001"]
//!
//! [notification]
//! enabled = true
//! spool_dir = "/var/spool/till"
//! queue_capacity = 64
//! max_attempts = 5
//! initial_backoff_ms = 500
//! max_backoff_secs = 30
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::Deserialize;
use till_notify::{NotificationSettings, RetryPolicy, ShopProfile};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "register.toml";

/// Register configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RegisterConfig {
    pub database: DatabaseConfig,
    pub shop: ShopProfile,
    pub notification: NotificationConfig,
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file, created on first use.
    pub path: PathBuf,
    pub max_connections: u32,
}

/// `[notification]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Where invoices are written for an external mailer. Without it,
    /// invoices are only logged.
    pub spool_dir: Option<PathBuf>,
    pub queue_capacity: usize,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: default_data_dir().join("till.db"),
            max_connections: 5,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            enabled: true,
            spool_dir: None,
            queue_capacity: 64,
            max_attempts: 5,
            initial_backoff_ms: 500,
            max_backoff_secs: 30,
        }
    }
}

impl NotificationConfig {
    /// Worker settings for the notification queue.
    pub fn settings(&self) -> NotificationSettings {
        NotificationSettings {
            queue_capacity: self.queue_capacity,
            retry: RetryPolicy {
                max_attempts: self.max_attempts,
                initial_backoff: Duration::from_millis(self.initial_backoff_ms),
                max_backoff: Duration::from_secs(self.max_backoff_secs),
            },
        }
    }
}

impl RegisterConfig {
    /// Loads configuration.
    ///
    /// An explicit `path` must exist. Without one, the platform config file
    /// is used when present and defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => RegisterConfig::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parses TOML text. Missing sections and keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Applies `TILL_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TILL_DB_PATH") {
            self.database.path = PathBuf::from(path);
        }
        if let Some(v) = lookup("TILL_DB_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("TILL_DB_MAX_CONNECTIONS", &v)?;
        }
        if let Some(name) = lookup("TILL_SHOP_NAME") {
            self.shop.name = name;
        }
        if let Some(v) = lookup("TILL_NOTIFY_ENABLED") {
            self.notification.enabled = parse_env("TILL_NOTIFY_ENABLED", &v)?;
        }
        if let Some(dir) = lookup("TILL_SPOOL_DIR") {
            self.notification.spool_dir = Some(PathBuf::from(dir));
        }
        if let Some(v) = lookup("TILL_QUEUE_CAPACITY") {
            self.notification.queue_capacity = parse_env("TILL_QUEUE_CAPACITY", &v)?;
        }
        if let Some(v) = lookup("TILL_NOTIFY_MAX_ATTEMPTS") {
            self.notification.max_attempts = parse_env("TILL_NOTIFY_MAX_ATTEMPTS", &v)?;
        }
        Ok(())
    }

    /// Rejects settings the register cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".to_string()));
        }
        if self.notification.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue("notification.queue_capacity".to_string()));
        }
        if self.notification.max_attempts == 0 {
            return Err(ConfigError::InvalidValue("notification.max_attempts".to_string()));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("in", "till", "register")
}

/// Platform config file, e.g. `~/.config/register/register.toml` on Linux.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

fn default_data_dir() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
