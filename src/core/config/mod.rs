//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Compiled-in defaults
//! 2. Config file
//! 3. CLI flags ([`ConfigOverrides`])
//! 4. Interactive startup prompts (not handled here)
//!
//! # Config Locations
//!
//! Searched in order:
//! 1. Explicit path passed by the caller (`--config`)
//! 2. `$MODELCTL_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/modelctl/config.toml`
//! 4. `~/.modelctl/config.toml` (canonical write location)
//!
//! A missing file is not an error. An explicit path that does not exist is.
//!
//! # Example
//!
//! ```no_run
//! use modelctl::core::config::{Config, ConfigOverrides};
//!
//! let config = Config::load(None).unwrap();
//! let session = config.resolve(&ConfigOverrides::default()).unwrap();
//! println!("Target file: {}", session.file_name);
//! ```

pub mod schema;

pub use schema::{FileConfig, SlotsConfig};

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::types::Slot;
use crate::remote::creoson::DEFAULT_SERVER_URL;

/// Default launcher for the host application.
pub const DEFAULT_HOST_PATH: &str =
    "C:/Program Files/PTC/Creo 7.0.1.0/Parametric/bin/nitro_proe_remote.bat";

/// Default target model.
pub const DEFAULT_FILE_NAME: &str = "ar_ka_13k1.prt";

/// Default server working directory.
pub const DEFAULT_WORKING_DIR: &str = "D:/Documents/CREO_API/01";

/// Default host application major version.
pub const DEFAULT_HOST_VERSION: u32 = 7;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "MODELCTL_CONFIG";

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

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),

    #[error("home directory not found")]
    NoHomeDir,
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub host_path: Option<String>,
    pub file_name: Option<String>,
    pub working_dir: Option<String>,
    pub host_version: Option<u32>,
}

/// Sub-menu entries for each batch kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSlots {
    /// Model dimensions
    pub model: Vec<Slot>,
    /// Text dimensions
    pub text: Vec<Slot>,
    /// Text parameters
    pub text_parameters: Vec<Slot>,
}

impl Default for MenuSlots {
    fn default() -> Self {
        Self {
            model: vec![
                Slot::new("w", "width"),
                Slot::new("h", "height"),
                Slot::new("l", "depth"),
            ],
            text: vec![
                Slot::new("t_w", "text width"),
                Slot::new("t_h", "text height"),
                Slot::new("t_l", "text offset"),
            ],
            text_parameters: vec![Slot::new("ak_text", "text")],
        }
    }
}

/// Fully resolved settings handed to the session bootstrapper.
///
/// | option | effect |
/// |---|---|
/// | `server_url` | Creoson endpoint every request is posted to |
/// | `host_path` | launcher used when the host is not running |
/// | `file_name` | model opened at startup and mutated by every batch |
/// | `working_dir` | directory the server is pointed at before opening |
/// | `host_version` | compatibility mode is pinned to this version when it is 7 or newer |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub server_url: String,
    pub host_path: String,
    pub file_name: String,
    pub working_dir: String,
    pub host_version: u32,
    pub slots: MenuSlots,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            host_path: DEFAULT_HOST_PATH.to_string(),
            file_name: DEFAULT_FILE_NAME.to_string(),
            working_dir: DEFAULT_WORKING_DIR.to_string(),
            host_version: DEFAULT_HOST_VERSION,
            slots: MenuSlots::default(),
        }
    }
}

/// Loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Values from the config file
    pub file: FileConfig,
    /// Path to the config file (if loaded)
    path: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// If `explicit` is provided, only that file is read and it must exist.
    /// Otherwise the standard locations are searched.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Some(path.to_path_buf())
            }
            None => Self::search_path(),
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        let file = Self::read_config(&path)?;
        file.validate()?;
        tracing::debug!(path = %path.display(), "loaded config file");

        Ok(Config {
            file,
            path: Some(path),
        })
    }

    /// Find the first existing config file in the standard locations.
    pub fn search_path() -> Option<PathBuf> {
        // 1. Check $MODELCTL_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/modelctl/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("modelctl/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.modelctl/config.toml
        let path = dirs::home_dir()?.join(".modelctl/config.toml");
        path.exists().then_some(path)
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
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
    /// Returns `~/.modelctl/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".modelctl/config.toml"))
    }

    /// Write a config file atomically.
    ///
    /// Creates parent directories if needed. Writes to a temp file in the
    /// same directory, then renames it over the target.
    pub fn write(path: &Path, config: &FileConfig) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.to_path_buf(),
                source: e,
            })?;
        }

        let contents =
            toml::to_string_pretty(config).map_err(|e| ConfigError::InvalidValue(e.to_string()))?;

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

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Creoson endpoint. Defaults to `http://localhost:9056/creoson`.
    pub fn server_url(&self) -> &str {
        self.file.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    /// Host launcher path.
    pub fn host_path(&self) -> &str {
        self.file.host_path.as_deref().unwrap_or(DEFAULT_HOST_PATH)
    }

    /// Target model file.
    pub fn file_name(&self) -> &str {
        self.file.file_name.as_deref().unwrap_or(DEFAULT_FILE_NAME)
    }

    /// Server working directory.
    pub fn working_dir(&self) -> &str {
        self.file.working_dir.as_deref().unwrap_or(DEFAULT_WORKING_DIR)
    }

    /// Host major version. Defaults to 7.
    pub fn host_version(&self) -> u32 {
        self.file.host_version.unwrap_or(DEFAULT_HOST_VERSION)
    }

    /// Sub-menu slots, with defaults for any list not configured.
    pub fn slots(&self) -> MenuSlots {
        let defaults = MenuSlots::default();
        let Some(slots) = &self.file.slots else {
            return defaults;
        };
        MenuSlots {
            model: slots.model.clone().unwrap_or(defaults.model),
            text: slots.text.clone().unwrap_or(defaults.text),
            text_parameters: slots
                .text_parameters
                .clone()
                .unwrap_or(defaults.text_parameters),
        }
    }

    /// Apply CLI overrides and produce the settings for a session.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if an override is invalid.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<SessionConfig, ConfigError> {
        if let Some(url) = &overrides.server_url {
            schema::validate_server_url(url)?;
        }
        if overrides.host_version == Some(0) {
            return Err(ConfigError::InvalidValue(
                "host_version must be greater than 0".to_string(),
            ));
        }
        if matches!(&overrides.file_name, Some(f) if f.trim().is_empty()) {
            return Err(ConfigError::InvalidValue(
                "file_name cannot be empty".to_string(),
            ));
        }

        Ok(SessionConfig {
            server_url: overrides
                .server_url
                .clone()
                .unwrap_or_else(|| self.server_url().to_string()),
            host_path: overrides
                .host_path
                .clone()
                .unwrap_or_else(|| self.host_path().to_string()),
            file_name: overrides
                .file_name
                .clone()
                .unwrap_or_else(|| self.file_name().to_string()),
            working_dir: overrides
                .working_dir
                .clone()
                .unwrap_or_else(|| self.working_dir().to_string()),
            host_version: overrides.host_version.unwrap_or(self.host_version()),
            slots: self.slots(),
        })
    }

    /// The effective file-level configuration, with every default filled in.
    pub fn effective(&self) -> FileConfig {
        let slots = self.slots();
        FileConfig {
            server_url: Some(self.server_url().to_string()),
            host_path: Some(self.host_path().to_string()),
            file_name: Some(self.file_name().to_string()),
            working_dir: Some(self.working_dir().to_string()),
            host_version: Some(self.host_version()),
            slots: Some(SlotsConfig {
                model: Some(slots.model),
                text: Some(slots.text),
                text_parameters: Some(slots.text_parameters),
            }),
        }
    }
}
