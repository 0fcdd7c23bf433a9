//! spinc configuration
//!
//! Parsed from `~/.config/spinc/spinc.toml` by default. Every field
//! has a builtin default so spinc works with no config file at all;
//! the `--addr` flag and `SPINC_ADDR` environment variable override
//! the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Request Manager address.
pub const DEFAULT_ADDR: &str = "http://127.0.0.1:32308";

/// Default request timeout in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// spinc CLI configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpincConfig {
    /// Request Manager base URL
    #[serde(default = "default_addr")]
    pub addr: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_addr() -> String {
    DEFAULT_ADDR.to_string()
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for SpincConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// Errors loading the spinc config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

impl SpincConfig {
    /// Load from the default location; builtin defaults if the file
    /// does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Default config file path (`~/.config/spinc/spinc.toml`).
    pub fn default_path() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".config/spinc/spinc.toml"))
    }

    /// Load from a specific path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// The request timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
