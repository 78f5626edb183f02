//! Runtime configuration: service endpoints, provider token, timeout.
//!
//! Loaded from TOML; every key is optional. Environment variables
//! override the file so a device build can point at another backend
//! without repackaging the config.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const ENV_API_URL: &str = "WATCHLIST_API_URL";
pub const ENV_METADATA_URL: &str = "TMDB_API_URL";
pub const ENV_METADATA_TOKEN: &str = "TMDB_API_TOKEN";
pub const ENV_TIMEOUT_SECS: &str = "WATCHLIST_TIMEOUT_SECS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Base URL of the watchlist service, `/api` prefix included.
    pub api_base_url: String,
    pub metadata_base_url: String,
    pub metadata_api_token: String,
    /// Per-request timeout. A timed out call is a network failure.
    pub request_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3000/api".to_string(),
            metadata_base_url: "https://api.themoviedb.org/3".to_string(),
            metadata_api_token: String::new(),
            request_timeout_secs: 10,
        }
    }
}

impl RuntimeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path`, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)?.with_overrides(|key| std::env::var(key).ok())
    }

    /// Defaults plus environment overrides, for hosts that ship no file.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(url) = lookup(ENV_API_URL) {
            self.api_base_url = url;
        }
        if let Some(url) = lookup(ENV_METADATA_URL) {
            self.metadata_base_url = url;
        }
        if let Some(token) = lookup(ENV_METADATA_TOKEN) {
            self.metadata_api_token = token;
        }
        if let Some(secs) = lookup(ENV_TIMEOUT_SECS) {
            self.request_timeout_secs = secs.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: format!("{secs:?}: {e}"),
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
