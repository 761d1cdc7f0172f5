//! Configuration file handling for wealthflow.
//!
//! The configuration file is stored at `$WEALTH_HOME/config.json` and contains settings such as
//! the number of backup copies to keep and the pivot unit used for cross conversions.

use crate::backup::Backup;
use crate::fx::DEFAULT_PIVOT;
use crate::model::{normalize_code, WealthData};
use crate::store::{JsonStore, Store};
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

const APP_NAME: &str = "wealthflow";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const WEALTH_JSON: &str = "wealth.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$WEALTH_HOME` and from there it loads `$WEALTH_HOME/config.json`. It provides
/// paths to other items that are expected in a certain location within the home directory, and
/// the `Store` that holds the data document.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    data_path: PathBuf,
    config_file: ConfigFile,
    store: Arc<dyn Store>,
}

impl Config {
    /// Creates the data directory, its backups subdirectory and:
    /// - Creates an initial `config.json` file with default settings
    /// - Writes a seeded `wealth.json` unless one is already present
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the root of data directory, e.g. `$HOME/wealthflow`
    /// - `base_unit` - The base unit for a newly seeded data document. It must be one of the
    ///   default units.
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a `config.json`, if `base_unit` is not a
    ///   default unit, or if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>, base_unit: Option<&str>) -> Result<Self> {
        // Create the directory if it does not exist
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the wealthflow home directory")?;

        // Canonicalize the directory path
        let root = utils::canonicalize(&maybe_relative).await?;
        let config_path = root.join(CONFIG_JSON);
        ensure!(
            !config_path.exists(),
            "The directory is already initialized, '{}' exists",
            config_path.display()
        );

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        let data_path = root.join(WEALTH_JSON);
        let store = JsonStore::new(&data_path);
        if data_path.is_file() {
            debug!("Keeping the existing data file {}", data_path.display());
        } else {
            let mut data = WealthData::default();
            if let Some(code) = base_unit {
                data.set_base_unit(code)?;
            }
            store.save(&data).await?;
        }

        Ok(Self {
            root,
            backups,
            config_path,
            data_path,
            config_file,
            store: Arc::new(store),
        })
    }

    /// This will
    /// - validate that `wealth_home` exists and that the config file exists
    /// - load the config file
    /// - validate that the backups directory exists
    /// - return the loaded configuration object
    pub async fn load(wealth_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = wealth_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The wealthflow home directory is missing, run 'wealth init' first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let backups = root.join(BACKUPS);
        if !backups.is_dir() {
            bail!("The backups directory is missing '{}'", backups.display())
        }

        let data_path = root.join(WEALTH_JSON);
        Ok(Self {
            root,
            backups,
            config_path,
            store: Arc::new(JsonStore::new(&data_path)),
            data_path,
            config_file,
        })
    }

    /// Replaces the store, e.g. with an in-memory one.
    pub fn with_store(mut self, store: impl Store + 'static) -> Self {
        self.store = Arc::new(store);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    /// The unit that cross conversions bridge through.
    pub fn pivot_unit(&self) -> &str {
        &self.config_file.pivot_unit
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "wealthflow",
///   "config_version": 1,
///   "backup_copies": 5,
///   "pivot_unit": "USD"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "wealthflow"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep
    backup_copies: u32,

    /// The unit that both sides of a cross conversion must have a rate to
    #[serde(default = "default_pivot")]
    pivot_unit: String,
}

fn default_pivot() -> String {
    DEFAULT_PIVOT.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            pivot_unit: default_pivot(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        let mut config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        config.pivot_unit = normalize_code(&config.pivot_unit);
        ensure!(
            !config.pivot_unit.is_empty(),
            "The pivot_unit in the config file must not be empty"
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    #[cfg(test)]
    fn new(backup_copies: u32, pivot_unit: &str) -> Self {
        Self {
            backup_copies,
            pivot_unit: pivot_unit.to_string(),
            ..Self::default()
        }
    }
}
