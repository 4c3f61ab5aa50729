//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::transport::{ClientConfig, FileCredentialStore, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_MS};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub monitor: MonitorConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout(),
        }
    }
}

impl ApiConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout_ms: self.timeout_ms,
        }
    }
}

/// Task monitor configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval() -> u64 {
    2000
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Session token storage
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub token_file: Option<String>,
}

impl AuthConfig {
    /// Configured token file, or the per-user default
    pub fn token_path(&self) -> PathBuf {
        self.token_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(FileCredentialStore::default_path)
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

/// Lower bound for `monitor.poll_interval_ms`
pub const MIN_POLL_INTERVAL_MS: u64 = 100;

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
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
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::read(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// The first existing file wins. A file that exists but cannot be
    /// loaded is an error rather than a silent fallback to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("hotel-bi").join("config.toml")),
            Some(PathBuf::from("/etc/hotel-bi/config.toml")),
            Some(PathBuf::from("./hotel-bi.toml")),
        ];

        Self::load_first(config_paths.iter().flatten())
    }

    fn load_first<'a, I>(candidates: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        match candidates.into_iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::debug!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => Self::from_env(),
        }
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "api.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.api.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "api.timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.monitor.poll_interval_ms < MIN_POLL_INTERVAL_MS {
            return Err(ConfigError::Invalid {
                field: "monitor.poll_interval_ms",
                reason: format!(
                    "{} is below the minimum of {} ms",
                    self.monitor.poll_interval_ms, MIN_POLL_INTERVAL_MS
                ),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(url) = lookup("HOTEL_BI_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = lookup("HOTEL_BI_TIMEOUT_MS") {
            if let Ok(t) = timeout.parse() {
                self.api.timeout_ms = t;
            }
        }

        // Monitor overrides
        if let Some(interval) = lookup("HOTEL_BI_POLL_INTERVAL_MS") {
            if let Ok(i) = interval.parse() {
                self.monitor.poll_interval_ms = i;
            }
        }

        // Auth overrides
        if let Some(path) = lookup("HOTEL_BI_TOKEN_FILE") {
            self.auth.token_file = Some(path);
        }

        // Logging overrides
        if let Some(level) = lookup("HOTEL_BI_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("HOTEL_BI_LOG_FORMAT") {
            self.logging.format = format;
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

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Hotel BI Client Configuration
#
# Environment variables override these settings:
# - HOTEL_BI_API_URL
# - HOTEL_BI_TIMEOUT_MS
# - HOTEL_BI_POLL_INTERVAL_MS
# - HOTEL_BI_TOKEN_FILE
# - HOTEL_BI_LOG_LEVEL
# - HOTEL_BI_LOG_FORMAT

[api]
# Backend base URL, including the API prefix
base_url = "http://localhost:8000/api/v1"

# Request timeout (ms)
timeout_ms = 10000

[monitor]
# How often to poll a running task (ms, at least 100)
poll_interval_ms = 2000

[auth]
# Where the session token is kept between runs
# token_file = "~/.config/hotel-bi/token"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.monitor.poll_interval(), Duration::from_millis(2000));
        assert!(config.auth.token_file.is_none());
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.monitor.poll_interval_ms, 2000);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            concat!(
                "[api]\nbase_url = \"https://bi.example.com/api/v1\"\n\n",
                "[auth]\ntoken_file = \"/tmp/t\"\n",
            ),
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://bi.example.com/api/v1");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.auth.token_path(), PathBuf::from("/tmp/t"));
        assert_eq!(config.monitor.poll_interval_ms, 2000);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[api\nbase_url = 1").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_broken_default_location_is_reported() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let broken = dir.path().join("hotel-bi.toml");
        let later = dir.path().join("later.toml");
        std::fs::write(&broken, "[monitor\npoll_interval_ms = ").unwrap();
        std::fs::write(&later, "[api]\nbase_url = \"http://fallback/api/v1\"\n").unwrap();

        let err = Config::load_first([&missing, &broken, &later]).unwrap_err();
        match &err {
            ConfigError::Parse { path, .. } => assert_eq!(path, &broken),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("hotel-bi.toml"));
    }

    #[test]
    fn test_no_default_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");

        let config = Config::load_first([&missing]).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unusable_values() {
        let mut config = Config::default();
        config.monitor.poll_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "monitor.poll_interval_ms", .. })
        ));

        config.monitor.poll_interval_ms = MIN_POLL_INTERVAL_MS;
        assert!(config.validate().is_ok());

        config.api.timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "api.timeout_ms", .. })
        ));

        let mut config = Config::default();
        config.apply_overrides(|key| {
            (key == "HOTEL_BI_POLL_INTERVAL_MS").then(|| "0".to_string())
        });
        assert_eq!(config.monitor.poll_interval_ms, 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_interval_in_file_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[monitor]\npoll_interval_ms = 0\n").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("monitor.poll_interval_ms"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HOTEL_BI_API_URL", "http://10.0.0.5:8000/api/v1"),
            ("HOTEL_BI_TIMEOUT_MS", "2500"),
            ("HOTEL_BI_POLL_INTERVAL_MS", "not-a-number"),
            ("HOTEL_BI_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.base_url, "http://10.0.0.5:8000/api/v1");
        assert_eq!(config.api.timeout_ms, 2500);
        assert_eq!(config.monitor.poll_interval_ms, 2000);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }
}
