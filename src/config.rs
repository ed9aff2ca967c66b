use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::HistoryError;
use crate::store;

/// History window used when a query names neither `--from` nor `--last`.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Resolved settings. Precedence: CLI flag, then config file, then
/// built-in default.
#[derive(Debug)]
pub struct Config {
    pub db_path: Option<PathBuf>,
    pub default_window: Duration,
}

impl Config {
    /// Load `<config_dir>/histree/config.toml` if present, defaults
    /// otherwise.
    pub fn load() -> Result<Self, HistoryError> {
        let Some(path) = config_file_path() else {
            return Ok(Config::default());
        };
        if !path.exists() {
            return Ok(Config::default());
        }

        let raw = std::fs::read_to_string(&path)?;
        FileConfig::parse(&raw)?.into_config()
    }

    /// Pick the database file: explicit flag, configured path, or the
    /// platform data directory.
    pub fn resolve_db_path(&self, flag: Option<&Path>) -> Result<PathBuf, HistoryError> {
        if let Some(path) = flag {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.db_path {
            return Ok(path.clone());
        }
        store::default_db_path()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: None,
            default_window: DEFAULT_WINDOW,
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "histree")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// On-disk shape of the config file; every key is optional.
#[derive(Debug, Deserialize)]
struct FileConfig {
    db_path: Option<PathBuf>,
    default_window: Option<String>,
}

impl FileConfig {
    fn parse(raw: &str) -> Result<FileConfig, HistoryError> {
        toml::from_str(raw).map_err(|e| HistoryError::Config(format!("bad config file: {e}")))
    }

    fn into_config(self) -> Result<Config, HistoryError> {
        let default_window = match self.default_window {
            Some(raw) => humantime::parse_duration(&raw).map_err(|e| {
                HistoryError::Config(format!("bad default_window '{raw}': {e}"))
            })?,
            None => DEFAULT_WINDOW,
        };

        Ok(Config {
            db_path: self.db_path,
            default_window,
        })
    }
}
