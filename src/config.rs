//! Configuration module for catalogr
//!
//! Manages the catalog endpoint, paging and search settings. Configuration is
//! read from `config.toml` in the user's config directory when present, and
//! any field can be overridden through a `CATALOGR_`-prefixed environment
//! variable (e.g. `CATALOGR_API_URL`, `CATALOGR_PAGE_SIZE`).

use crate::engine::{CatalogError, EngineSettings};
use crate::filters::{DEFAULT_PRICE_MAX, DEFAULT_PRICE_MIN, PriceRange};
use crate::query::DEFAULT_PAGE_SIZE;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Catalog endpoint used when none is configured
pub const DEFAULT_API_URL: &str = "http://localhost:4000/v1";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "CATALOGR";

/// Application configuration structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL of the catalog API
    pub api_url: String,

    /// Products per page
    pub page_size: u32,

    /// Quiet window before a typed search is sent, in milliseconds
    pub debounce_ms: u64,

    /// Lowest price in the catalog; the default lower price filter
    pub price_min: u64,

    /// Highest price in the catalog; the default upper price filter
    pub price_max: u64,

    /// Per-request timeout, in seconds
    pub request_timeout_secs: u64,

    /// Suppress informational output by default
    pub quiet: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            debounce_ms: 300,
            price_min: DEFAULT_PRICE_MIN,
            price_max: DEFAULT_PRICE_MAX,
            request_timeout_secs: 10,
            quiet: false,
        }
    }
}

impl CatalogConfig {
    /// Get the path to the config file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the system config directory cannot be determined.
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ConfigError::Message("Could not determine config directory".to_string())
        })?;

        Ok(config_dir.join("catalogr").join("config.toml"))
    }

    /// Load configuration from the default path and the environment
    ///
    /// A missing file is not an error; defaults apply.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an environment override cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path` and the environment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or an environment override cannot be parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        settings.try_deserialize()
    }

    /// Save configuration to the default path
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config directory cannot be created, the configuration
    /// cannot be serialized to TOML, or the file cannot be written.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to `path`
    ///
    /// # Errors
    ///
    /// See [`CatalogConfig::save`].
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Message(format!("Failed to serialize config: {e}")))?;

        fs::write(path, toml_string)
            .map_err(|e| ConfigError::Message(format!("Failed to write config file: {e}")))?;

        Ok(())
    }

    /// Reject settings the engine cannot work with
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` naming the offending field.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.page_size == 0 {
            return Err(CatalogError::Validation("page_size must be at least 1".into()));
        }
        if self.price_min > self.price_max {
            return Err(CatalogError::Validation(format!(
                "price_min ({}) is above price_max ({})",
                self.price_min, self.price_max
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(CatalogError::Validation(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if self.api_url.trim().is_empty() {
            return Err(CatalogError::Validation("api_url is empty".into()));
        }
        Ok(())
    }

    /// Catalog-wide price bounds
    #[must_use]
    pub const fn price_bounds(&self) -> PriceRange {
        PriceRange::new(self.price_min, self.price_max)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Settings for a `CatalogQueryEngine`
    #[must_use]
    pub const fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            price_bounds: self.price_bounds(),
            page_size: self.page_size,
            debounce: Duration::from_millis(self.debounce_ms),
        }
    }
}
