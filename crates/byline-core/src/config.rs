//! Configuration management for byline.
//!
//! Loads configuration from ${BYLINE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default base URL for the article API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.realworld.io/api";

pub mod paths {
    //! Path resolution for byline configuration and data directories.
    //!
    //! BYLINE_HOME resolution order:
    //! 1. BYLINE_HOME environment variable (if set)
    //! 2. ~/.config/byline (default)

    use std::path::PathBuf;

    /// Returns the byline home directory.
    ///
    /// Checks BYLINE_HOME env var first, falls back to ~/.config/byline
    pub fn byline_home() -> PathBuf {
        if let Ok(home) = std::env::var("BYLINE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .map(|h| h.join(".config").join("byline"))
            .expect("Could not determine home directory")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        byline_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        byline_home().join("session.json")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        byline_home().join("logs")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the article API.
    pub api_base_url: String,

    /// Request timeout in seconds (0 disables).
    pub request_timeout_secs: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;

    /// Loads configuration from the default config path.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if the file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Resolves the effective API base URL.
    ///
    /// Resolution order:
    /// 1. `BYLINE_API_BASE_URL` env var (if set and non-empty)
    /// 2. `api_base_url` from the config file
    ///
    /// # Errors
    /// Returns an error if the resolved URL is not well-formed.
    pub fn resolve_api_base_url(&self) -> Result<String> {
        if let Ok(env_url) = std::env::var("BYLINE_API_BASE_URL") {
            let trimmed = env_url.trim();
            if !trimmed.is_empty() {
                validate_url(trimmed)?;
                return Ok(trimmed.to_string());
            }
        }

        let trimmed = self.api_base_url.trim();
        validate_url(trimmed)?;
        Ok(trimmed.to_string())
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.request_timeout_secs)))
        }
    }
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    Ok(())
}
