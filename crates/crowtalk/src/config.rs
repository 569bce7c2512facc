//! Configuration management for crowtalk.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::Location;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "crowtalk";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "fieldwork.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `CROWTALK_`)
/// 2. TOML config file at `~/.config/crowtalk/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Catalog configuration.
    pub catalog: CatalogConfig,
    /// Session configuration.
    pub session: SessionConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/crowtalk/fieldwork.db`
    pub database_path: Option<PathBuf>,
    /// Maximum number of field recordings to keep; older recordings are
    /// pruned when new ones are saved. 0 means unlimited.
    pub max_recordings: usize,
}

/// Catalog-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Path to a TOML category definition file. When unset, the built-in
    /// category table is used.
    pub categories_path: Option<PathBuf>,
    /// Path to a JSON manifest of curated library recordings.
    pub curated_manifest: Option<PathBuf>,
    /// Default viewer latitude used for distance sorting when no position
    /// is passed on the command line.
    pub home_lat: Option<f64>,
    /// Default viewer longitude.
    pub home_lon: Option<f64>,
    /// Name of the home territory; recordings made at this place are badged
    /// as home-territory observations.
    pub home_place: Option<String>,
}

/// Session-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How many trailing events to show in listings.
    pub recent_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { recent_window: 20 }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `CROWTALK_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("CROWTALK_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        match (self.catalog.home_lat, self.catalog.home_lon) {
            (Some(lat), Some(lon)) => {
                if !Location::new(lat, lon).is_valid() {
                    return Err(Error::InvalidLocation { lat, lon });
                }
            }
            (None, None) => {}
            _ => {
                return Err(Error::ConfigValidation {
                    message: "home_lat and home_lon must be set together".to_string(),
                });
            }
        }

        if self.session.recent_window == 0 {
            return Err(Error::ConfigValidation {
                message: "recent_window must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the configured home position, if complete.
    #[must_use]
    pub fn home_location(&self) -> Option<Location> {
        match (self.catalog.home_lat, self.catalog.home_lon) {
            (Some(lat), Some(lon)) => Some(Location::new(lat, lon)),
            _ => None,
        }
    }
}
