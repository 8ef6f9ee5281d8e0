//! core::config
//!
//! Configuration schema and loading.
//!
//! # Locations
//!
//! Searched in order, first hit wins:
//! 1. An explicit path (`--config`)
//! 2. `$REPOSYNC_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/reposync/config.toml`
//! 4. `~/.reposync/config.toml`
//!
//! Missing files are not an error; defaults are used. An explicit path that
//! does not exist is an error.
//!
//! # Example
//!
//! ```no_run
//! use reposync::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("syncing against remote '{}'", config.global.origin_remote());
//! println!("fetch attempt 1 times out after {:?}", config.retry_policy().timeout_for(1));
//! ```

pub mod schema;

pub use schema::{CredentialsConfig, FetchConfig, GlobalConfig};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::engine::retry::RetryPolicy;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "REPOSYNC_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file '{0}' does not exist")]
    Missing(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed values
    pub global: GlobalConfig,
    /// Where the values came from (`None` when defaults are in use)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// `explicit` takes precedence over every other location and must exist.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed or
    /// validated.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) if !path.exists() => return Err(ConfigError::Missing(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::discover(),
        };

        let global = match &path {
            Some(path) => Self::read(path)?,
            None => GlobalConfig::default(),
        };
        global.validate()?;

        Ok(Self { global, path })
    }

    /// First existing file among the implicit locations.
    fn discover() -> Option<PathBuf> {
        let candidates = [
            std::env::var_os(CONFIG_ENV).map(PathBuf::from),
            std::env::var_os("XDG_CONFIG_HOME")
                .map(|xdg| PathBuf::from(xdg).join("reposync/config.toml")),
            dirs::home_dir().map(|home| home.join(".reposync/config.toml")),
        ];
        candidates.into_iter().flatten().find(|path| path.exists())
    }

    fn read(path: &Path) -> Result<GlobalConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the loaded file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Canonical location for the config file (`~/.reposync/config.toml`).
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".reposync/config.toml"))
    }

    /// Fetch retry policy derived from `[fetch]`.
    pub fn retry_policy(&self) -> RetryPolicy {
        let fetch = self.global.fetch.clone().unwrap_or_default();
        let unit = fetch
            .unit_ms
            .map(Duration::from_millis)
            .unwrap_or(RetryPolicy::DEFAULT_UNIT);
        RetryPolicy::new(unit).with_max_attempts(fetch.max_attempts)
    }
}
