//! Client configuration loaded from TOML.
//!
//! The service base URL is injected from here into the HTTP client at
//! construction. The bearer token is never part of the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid base_url '{0}': expected an http:// or https:// URL")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Root of the reference-data and submission services.
    pub base_url: String,
    /// Client-side request timeout. `None` leaves requests unbounded.
    pub timeout_secs: Option<u64>,
    /// Run the optional cross-field checks (date order, duplicate indicators)
    /// before a front-end lets a submit through.
    pub cross_field_checks: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: None,
            cross_field_checks: false,
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Parse a TOML document. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ClientConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the per-user config file if it exists, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.base_url.trim();
        let has_scheme = url.starts_with("http://") || url.starts_with("https://");
        let has_host = url
            .split_once("://")
            .map(|(_, rest)| !rest.trim_start_matches('/').is_empty())
            .unwrap_or(false);
        if has_scheme && has_host {
            Ok(())
        } else {
            Err(ConfigError::InvalidBaseUrl(self.base_url.clone()))
        }
    }

    /// Join the base URL and an endpoint path with exactly one `/`.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// `<config dir>/backtest-form/config.toml`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("backtest-form").join("config.toml"))
}
