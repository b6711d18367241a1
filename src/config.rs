use crate::core::{DemoError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub examples: ExamplesConfig,
}

/// Connection settings for the sample database.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout_ms: u64,
    pub foreign_keys: bool,
    pub journal_mode: JournalMode,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        DatabaseConfig {
            path: PathBuf::from("sqldemo.db"),
            busy_timeout_ms: 5000,
            foreign_keys: true,
            journal_mode: JournalMode::Wal,
        }
    }
}

impl DatabaseConfig {
    /// Configuration pointing at `path` with every other setting defaulted.
    pub fn at<P: Into<PathBuf>>(path: P) -> Self {
        DatabaseConfig {
            path: path.into(),
            ..DatabaseConfig::default()
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// SQLite journal modes accepted in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JournalMode {
    Delete,
    Truncate,
    Persist,
    Memory,
    Wal,
    Off,
}

impl JournalMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            JournalMode::Delete => "delete",
            JournalMode::Truncate => "truncate",
            JournalMode::Persist => "persist",
            JournalMode::Memory => "memory",
            JournalMode::Wal => "wal",
            JournalMode::Off => "off",
        }
    }
}

/// Which example groups run and with which arguments.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExamplesConfig {
    /// Run the insert/update/delete sequence.
    pub mutations: bool,
    /// Run the transaction, join and stored procedure examples.
    pub advanced: bool,
    pub lookup_id: i64,
    pub search_term: String,
}

impl Default for ExamplesConfig {
    fn default() -> Self {
        ExamplesConfig {
            mutations: false,
            advanced: false,
            lookup_id: 1,
            search_term: "John".to_string(),
        }
    }
}

/// Loads configuration from a TOML file at the given path.
///
/// Missing sections and keys fall back to their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| DemoError::Config(format!("cannot read {}: {}", path.display(), e)))?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config> {
    toml::from_str(content).map_err(|e| DemoError::Config(e.to_string()))
}

/// Default configuration file location: `<config_dir>/sqldemo/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sqldemo").join("config.toml"))
}

/// Resolves the configuration to use.
///
/// An explicit path must exist and parse. Without one, the default location
/// is used when present, otherwise built-in defaults apply.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        debug!("Loading configuration from {}", path.display());
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.is_file() => {
            debug!("Loading configuration from {}", path.display());
            load_config(path)
        }
        _ => {
            debug!("No configuration file found, using defaults");
            Ok(Config::default())
        }
    }
}
