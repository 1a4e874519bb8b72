//! Application configuration.
//!
//! Values come from built-in defaults, then an optional TOML file under the
//! user's config directory, then `TRAINROUTE_*` environment variables.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::registry::{StoragePaths, JOURNEYS_FILE, ROUTES_FILE, STATIONS_FILE};

/// Directory under `~/.config` holding the config file.
pub const CONFIG_DIR: &str = "trainroute";
/// Name of the config file.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix of overriding environment variables, e.g. `TRAINROUTE_DATA_DIR`.
pub const ENV_PREFIX: &str = "TRAINROUTE";

const DEFAULT_DATA_DIR: &str = "resources/xml";

const DEFAULT_CONFIG: &str = r#"# trainroute configuration

# Directory holding the data files. Relative paths resolve against the
# working directory.
data_dir = "resources/xml"

stations_file = "stations.xml"
routes_file = "basic_routes.xml"
journeys_file = "journeys.xml"
"#;

/// Resolved application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the three data files.
    pub data_dir: PathBuf,
    /// Stations document, relative to `data_dir`.
    pub stations_file: String,
    /// Basic routes document, relative to `data_dir`.
    pub routes_file: String,
    /// Journeys document, relative to `data_dir`.
    pub journeys_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            stations_file: STATIONS_FILE.to_string(),
            routes_file: ROUTES_FILE.to_string(),
            journeys_file: JOURNEYS_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the default config file location plus the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load with `path` as the (optional) config file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("data_dir", defaults.data_dir.to_string_lossy().to_string())?
            .set_default("stations_file", defaults.stations_file)?
            .set_default("routes_file", defaults.routes_file)?
            .set_default("journeys_file", defaults.journeys_file)?
            .add_source(
                File::from(path.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;

        settings
            .try_deserialize()
            .context("failed to deserialize configuration")
    }

    /// Paths of the three data files.
    pub fn storage_paths(&self) -> StoragePaths {
        StoragePaths {
            stations: self.data_dir.join(&self.stations_file),
            routes: self.data_dir.join(&self.routes_file),
            journeys: self.data_dir.join(&self.journeys_file),
        }
    }
}

/// Default config file location, e.g. `~/.config/trainroute/config.toml`.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(CONFIG_DIR)
        .join(CONFIG_FILE)
}

/// Write the default config file if none exists yet.
pub fn ensure_default_config() -> Result<()> {
    ensure_default_config_at(&config_path())
}

/// Write the default config to `path` unless a file is already there.
pub fn ensure_default_config_at(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write default config {}", path.display()))
}
