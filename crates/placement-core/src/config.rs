//! Portal configuration
//!
//! Loaded from `~/.placement/config.toml`, then overridden by `PLACEMENT_*`
//! environment variables. The resolved value is handed to the session
//! controller at construction; nothing reads these settings globally.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::constants;
use crate::error::ConfigError;
use crate::paths;

pub const ENV_BASE_URL: &str = "PLACEMENT_BASE_URL";
pub const ENV_RETRY_INTERVAL_MS: &str = "PLACEMENT_RETRY_INTERVAL_MS";
pub const ENV_TICK_MS: &str = "PLACEMENT_TICK_MS";

/// Settings for talking to the placement API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// API root; endpoint paths are appended to it
    pub base_url: String,
    /// How long to wait after a 429 before retrying the company list
    pub retry_interval_ms: u64,
    /// Countdown granularity shown while backing off
    pub tick_ms: u64,
    pub request_timeout_secs: u64,
    /// Cap on consecutive rate-limit retries. `None` retries until the
    /// server stops answering 429.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rate_limit_retries: Option<u32>,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: constants::api::DEFAULT_BASE_URL.to_string(),
            retry_interval_ms: constants::backoff::RETRY_INTERVAL_MS,
            tick_ms: constants::backoff::TICK_MS,
            request_timeout_secs: constants::api::REQUEST_TIMEOUT_SECS,
            max_rate_limit_retries: None,
        }
    }
}

impl PortalConfig {
    /// Load from the default path with environment overrides applied
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_path(&paths::config_path())?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a specific path. A missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save to the default path
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = paths::config_path();
        self.save_to_path(&path)?;
        Ok(path)
    }

    /// Save to a specific path, creating parent directories
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents).map_err(io_err)
    }

    /// Apply overrides from a key lookup (the process environment in
    /// production, a map in tests)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base_url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.base_url = base_url.trim().to_string();
        }
        if let Some(value) = lookup(ENV_RETRY_INTERVAL_MS) {
            self.retry_interval_ms = parse_millis(ENV_RETRY_INTERVAL_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_TICK_MS) {
            self.tick_ms = parse_millis(ENV_TICK_MS, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidValue {
            key: "base_url",
            reason: e.to_string(),
        })?;
        if self.retry_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retry_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.tick_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "tick_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Full URL for an endpoint path such as `/checkstudentlogin`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            reason: format!("expected milliseconds, got '{}'", value),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = PortalConfig::load_from_path(&dir.path().join("config.toml")).unwrap();

        assert_eq!(config, PortalConfig::default());
        assert_eq!(config.retry_interval_ms, 10_000);
        assert_eq!(config.tick_ms, 1_000);
        assert!(config.max_rate_limit_retries.is_none());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "base_url = \"http://localhost:4000/api\"\nmax_rate_limit_retries = 3\n",
        )
        .unwrap();

        let config = PortalConfig::load_from_path(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:4000/api");
        assert_eq!(config.max_rate_limit_retries, Some(3));
        assert_eq!(config.tick_ms, 1_000);
    }

    #[test]
    fn saved_file_loads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = PortalConfig {
            retry_interval_ms: 5_000,
            ..Default::default()
        };

        config.save_to_path(&path).unwrap();
        assert_eq!(PortalConfig::load_from_path(&path).unwrap(), config);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tick_ms = \"soon\"").unwrap();

        let err = PortalConfig::load_from_path(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }

    #[test]
    fn overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BASE_URL, "http://127.0.0.1:9000"),
            (ENV_TICK_MS, "250"),
        ]);
        let mut config = PortalConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.tick_ms, 250);
        assert_eq!(config.retry_interval_ms, 10_000);
    }

    #[test]
    fn non_numeric_override_is_rejected() {
        let mut config = PortalConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_RETRY_INTERVAL_MS).then(|| "ten".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_RETRY_INTERVAL_MS,
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_zero_timings_and_bad_url() {
        let zero_tick = PortalConfig {
            tick_ms: 0,
            ..Default::default()
        };
        assert!(zero_tick.validate().is_err());

        let bad_url = PortalConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(bad_url.validate().is_err());

        let zero_retry = PortalConfig {
            retry_interval_ms: 0,
            ..Default::default()
        };
        assert!(matches!(
            zero_retry.validate(),
            Err(ConfigError::InvalidValue {
                key: "retry_interval_ms",
                ..
            })
        ));

        let mut from_env = PortalConfig::default();
        from_env
            .apply_overrides(|key| (key == ENV_RETRY_INTERVAL_MS).then(|| "0".to_string()))
            .unwrap();
        assert!(from_env.validate().is_err());

        assert!(PortalConfig::default().validate().is_ok());
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let config = PortalConfig {
            base_url: "http://localhost:4000/api/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.endpoint(constants::api::LOGIN_PATH),
            "http://localhost:4000/api/checkstudentlogin"
        );
    }
}
