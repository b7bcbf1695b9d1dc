//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. `$DEX_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/dex/config.toml`
//! 3. `~/.dex/config.toml` (canonical write location)
//!
//! A missing file is not an error; defaults are used.
//!
//! # Example
//!
//! ```no_run
//! use dexedit::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! let config = result.config;
//!
//! println!("History limit: {}", config.history_limit());
//! println!("Log filter: {}", config.log_filter());
//! ```

pub mod schema;

pub use schema::{ActionsConfig, DexConfig, ViewGroupsConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::types::ViewGroupId;
use crate::events::DEFAULT_HISTORY_LIMIT;

/// Default `tracing` filter for the `dex` binary.
pub const DEFAULT_LOG_FILTER: &str = "warn";

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

    #[error("failed to write config file '{path}': {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaults applied by the accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Parsed file contents
    pub file: DexConfig,
    /// Path the file was loaded from, if any
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();

        // 1. $DEX_CONFIG
        if let Ok(path) = std::env::var("DEX_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Self::finish(&path, warnings);
            }
            warnings.push(ConfigWarning {
                message: "DEX_CONFIG points to a missing file; ignoring it".into(),
                path,
            });
        }

        // 2. $XDG_CONFIG_HOME/dex/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("dex/config.toml");
            if path.exists() {
                return Self::finish(&path, warnings);
            }
        }

        // 3. ~/.dex/config.toml
        if let Some(home) = dirs::home_dir() {
            let path = home.join(".dex/config.toml");
            if path.exists() {
                return Self::finish(&path, warnings);
            }
        }

        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Load configuration from one explicit file.
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let file = Self::read_config(path)?;
        file.validate()?;
        Ok(Config {
            file,
            path: Some(path.to_path_buf()),
        })
    }

    fn finish(path: &Path, warnings: Vec<ConfigWarning>) -> Result<ConfigLoadResult, ConfigError> {
        Ok(ConfigLoadResult {
            config: Self::load_from(path)?,
            warnings,
        })
    }

    fn read_config(path: &Path) -> Result<DexConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Get the canonical config path.
    ///
    /// Returns `~/.dex/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".dex/config.toml"))
    }

    /// Write config to the canonical location atomically.
    pub fn write_global(config: &DexConfig) -> Result<PathBuf, ConfigError> {
        let path = Self::global_config_path()?;
        config.write(&path)?;
        Ok(path)
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Current user id, if configured.
    pub fn user(&self) -> Option<&str> {
        self.file.user.as_deref()
    }

    /// Navigation back-stack bound.
    ///
    /// Defaults to 50 if not configured.
    pub fn history_limit(&self) -> usize {
        self.file.history_limit.unwrap_or(DEFAULT_HISTORY_LIMIT)
    }

    /// `tracing` filter directive.
    ///
    /// Defaults to `"warn"` if not configured.
    pub fn log_filter(&self) -> &str {
        self.file
            .log_filter
            .as_deref()
            .unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Whether carried-forward members accept additions in minor versions.
    ///
    /// Defaults to `true` if not configured.
    pub fn minor_version_additions(&self) -> bool {
        self.file
            .actions
            .as_ref()
            .and_then(|a| a.minor_version_additions)
            .unwrap_or(true)
    }

    /// View groups locked at startup.
    pub fn locked_view_groups(&self) -> Result<Vec<ViewGroupId>, ConfigError> {
        match &self.file.view_groups {
            Some(groups) => groups.ids(),
            None => Ok(Vec::new()),
        }
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Write a config file atomically.
pub(crate) fn write_config_atomic<T: serde::Serialize>(
    path: &Path,
    config: &T,
) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let contents =
        toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

    // Temp file in the same directory so the rename stays atomic
    let temp_path = path.with_extension("toml.tmp");
    let mut file = fs::File::create(&temp_path).map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    file.write_all(contents.as_bytes())
        .map_err(|e| ConfigError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;

    file.sync_all().map_err(|e| ConfigError::WriteError {
        path: temp_path.clone(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
