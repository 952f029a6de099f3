use super::types::StoreMode;
use crate::error_handling::types::ConfigError;
use log::debug;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Runtime configuration of the tracker.
///
/// Every field can come from a TOML file (`Config::from_file`), a command-line
/// flag, or an environment variable. The `clap` derive covers flags and
/// variables, `serde` covers the file.
///
/// # Examples
///
/// ```toml
/// store_mode = "durable"
/// database_path = "/var/lib/playhive/playhive.sqlite3"
/// data_dir = "/var/lib/playhive"
/// ```
///
/// # Fields Overview
///
/// - `store_mode`: which store serves persistence at startup
/// - `database_path`: SQLite file used in durable mode
/// - `data_dir`: directory holding the local fallback store
#[derive(clap::Args, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Store used from startup.
    ///
    /// `fallback` never touches the database. `durable` uses it until the
    /// first failure, then stays on the local store for the rest of the run.
    ///
    /// # Command Line
    /// Use `--store-mode <durable|fallback>` or `PLAYHIVE_STORE_MODE`
    #[arg(long, env = "PLAYHIVE_STORE_MODE", value_enum, default_value_t = StoreMode::Fallback)]
    pub store_mode: StoreMode,

    /// SQLite database file, created when missing.
    ///
    /// # Command Line
    /// Use `--database-path <PATH>` or `PLAYHIVE_DB_PATH`
    #[arg(long, env = "PLAYHIVE_DB_PATH", default_value = "playhive.sqlite3")]
    pub database_path: PathBuf,

    /// Directory of the local store file.
    ///
    /// # Command Line
    /// Use `--data-dir <PATH>` or `PLAYHIVE_DATA_DIR`
    #[arg(long, env = "PLAYHIVE_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_mode: StoreMode::default(),
            database_path: PathBuf::from("playhive.sqlite3"),
            data_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Reads and validates a TOML configuration file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        debug!("Reading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        let config: Config =
            toml::from_str(&content).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store_mode == StoreMode::Durable && self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue(
                "database_path must be set in durable mode".to_string(),
            ));
        }
        Ok(())
    }
}
