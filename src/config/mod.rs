//! Configuration management for the waste platform
//!
//! Loads configuration from environment variables (and an optional `.env`
//! file), with support for different environments (development, staging,
//! production).

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Storage key the snapshot is written under unless overridden.
pub const DEFAULT_STORAGE_KEY: &str = "swp391.platformState.v1";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid environment value: {0}")]
    InvalidValue(String),

    #[error("Invalid storage key: {0}")]
    InvalidStorageKey(String),
}

/// Application environment
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    /// Parse environment from string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "staging" => Ok(Environment::Staging),
            "prod" | "production" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue(format!(
                "Invalid environment: '{}'. Expected: dev, staging, or prod",
                s
            ))),
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Current environment
    pub environment: Environment,

    /// Directory holding persisted snapshots
    pub state_dir: PathBuf,

    /// Key the platform snapshot is stored under
    pub storage_key: String,

    /// Log level (RUST_LOG)
    pub log_level: String,

    /// Capacity of the platform event broadcast channel
    pub event_channel_capacity: usize,

    /// Discard any persisted snapshot and start from seed data
    pub reset_on_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            state_dir: PathBuf::from("./data"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            log_level: "info".to_string(),
            event_channel_capacity: 100,
            reset_on_start: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors)
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .map(|s| Environment::parse(&s))
            .unwrap_or(Ok(Environment::Development))?;

        let state_dir = env::var("STATE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let storage_key =
            env::var("STORAGE_KEY").unwrap_or_else(|_| DEFAULT_STORAGE_KEY.to_string());
        validate_storage_key(&storage_key)?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let event_channel_capacity = env::var("EVENT_CHANNEL_CAPACITY")
            .unwrap_or_else(|_| "100".to_string())
            .parse::<usize>()
            .ok()
            .filter(|capacity| *capacity > 0)
            .unwrap_or(100);

        let reset_on_start = env::var("RESET_ON_START")
            .map(|v| parse_bool(&v))
            .unwrap_or(Ok(false))?;

        Ok(Config {
            environment,
            state_dir,
            storage_key,
            log_level,
            event_channel_capacity,
            reset_on_start,
        })
    }

    /// Full path of the snapshot file for the configured storage key
    pub fn snapshot_path(&self) -> PathBuf {
        self.state_dir.join(format!("{}.json", self.storage_key))
    }
}

fn parse_bool(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidValue(format!(
            "Expected a boolean, got '{}'",
            other
        ))),
    }
}

/// The key doubles as a file name, so path separators are not allowed.
fn validate_storage_key(key: &str) -> Result<(), ConfigError> {
    if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
        return Err(ConfigError::InvalidStorageKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(
            Environment::parse("dev").unwrap(),
            Environment::Development
        );
        assert_eq!(
            Environment::parse("staging").unwrap(),
            Environment::Staging
        );
        assert_eq!(
            Environment::parse("PROD").unwrap(),
            Environment::Production
        );
        assert!(Environment::parse("invalid").is_err());
    }

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_environment_as_str() {
        assert_eq!(Environment::Development.as_str(), "development");
        assert_eq!(Environment::Production.as_str(), "production");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true").unwrap());
        assert!(parse_bool("1").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_storage_key_validation() {
        assert!(validate_storage_key(DEFAULT_STORAGE_KEY).is_ok());
        assert!(validate_storage_key("").is_err());
        assert!(validate_storage_key("../escape").is_err());
        assert!(validate_storage_key("..").is_err());
    }

    #[test]
    fn test_snapshot_path_uses_storage_key() {
        let config = Config {
            state_dir: PathBuf::from("/var/lib/waste"),
            ..Config::default()
        };
        assert_eq!(
            config.snapshot_path(),
            PathBuf::from("/var/lib/waste/swp391.platformState.v1.json")
        );
    }
}
