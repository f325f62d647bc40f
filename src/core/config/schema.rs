//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Config File
//!
//! Located at (in order of precedence):
//! 1. `--config <path>` if given
//! 2. `$MODELCTL_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/modelctl/config.toml`
//! 4. `~/.modelctl/config.toml` (canonical write location)
//!
//! # Validation
//!
//! Config values are validated after parsing so a bad file is rejected
//! before any connection is attempted.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::Slot;

/// Maximum slots per sub-menu; menu tokens are single digits.
pub const MAX_SLOTS: usize = 10;

/// On-disk configuration.
///
/// Every field is optional; missing fields fall back to compiled-in
/// defaults.
///
/// # Example
///
/// ```toml
/// server_url = "http://localhost:9056/creoson"
/// host_path = "C:/Program Files/PTC/Creo 7.0.1.0/Parametric/bin/nitro_proe_remote.bat"
/// file_name = "ar_ka_13k1.prt"
/// working_dir = "D:/Documents/CREO_API/01"
/// host_version = 7
///
/// [[slots.model]]
/// key = "w"
/// label = "width"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Creoson endpoint URL
    pub server_url: Option<String>,

    /// Host application launcher path
    pub host_path: Option<String>,

    /// Target model file name
    pub file_name: Option<String>,

    /// Server working directory
    pub working_dir: Option<String>,

    /// Operator's host application major version
    pub host_version: Option<u32>,

    /// Sub-menu slot definitions
    pub slots: Option<SlotsConfig>,
}

impl FileConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.server_url {
            validate_server_url(url)?;
        }

        if let Some(file) = &self.file_name {
            if file.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "file_name cannot be empty".to_string(),
                ));
            }
        }

        if self.host_version == Some(0) {
            return Err(ConfigError::InvalidValue(
                "host_version must be greater than 0".to_string(),
            ));
        }

        if let Some(slots) = &self.slots {
            slots.validate()?;
        }

        Ok(())
    }
}

/// Check a server URL has an HTTP scheme.
pub fn validate_server_url(url: &str) -> Result<(), ConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "invalid server_url '{}', must start with http:// or https://",
            url
        )))
    }
}

/// Slot lists for each batch sub-menu.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SlotsConfig {
    /// Model dimensions (numeric)
    pub model: Option<Vec<Slot>>,

    /// Text dimensions (numeric)
    pub text: Option<Vec<Slot>>,

    /// Text parameters (string, forwarded verbatim)
    pub text_parameters: Option<Vec<Slot>>,
}

impl SlotsConfig {
    /// Validate every configured slot list.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, slots) in [
            ("model", &self.model),
            ("text", &self.text),
            ("text_parameters", &self.text_parameters),
        ] {
            if let Some(slots) = slots {
                validate_slots(name, slots)?;
            }
        }
        Ok(())
    }
}

fn validate_slots(name: &str, slots: &[Slot]) -> Result<(), ConfigError> {
    if slots.is_empty() {
        return Err(ConfigError::InvalidValue(format!(
            "slots.{} cannot be empty",
            name
        )));
    }
    if slots.len() > MAX_SLOTS {
        return Err(ConfigError::InvalidValue(format!(
            "slots.{} has {} entries, at most {} allowed",
            name,
            slots.len(),
            MAX_SLOTS
        )));
    }
    for (i, slot) in slots.iter().enumerate() {
        if slot.key.trim().is_empty() {
            return Err(ConfigError::InvalidValue(format!(
                "slots.{}[{}] has an empty key",
                name, i
            )));
        }
        if slots[..i].iter().any(|s| s.key == slot.key) {
            return Err(ConfigError::InvalidValue(format!(
                "slots.{} has duplicate key '{}'",
                name, slot.key
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = FileConfig::default();
        assert!(config.server_url.is_none());
        assert!(config.host_version.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_url() {
        let config = FileConfig {
            server_url: Some("localhost:9056".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_file_name_rejected() {
        let config = FileConfig {
            file_name: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_host_version_rejected() {
        let config = FileConfig {
            host_version: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn duplicate_slot_keys_rejected() {
        let config = FileConfig {
            slots: Some(SlotsConfig {
                model: Some(vec![Slot::new("w", "width"), Slot::new("w", "again")]),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate key 'w'"));
    }

    #[test]
    fn too_many_slots_rejected() {
        let slots = (0..11).map(|i| Slot::new(format!("d{}", i), "x")).collect();
        let config = SlotsConfig {
            text: Some(slots),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = FileConfig {
            server_url: Some("http://localhost:9056/creoson".to_string()),
            host_path: Some("C:/bin/start.bat".to_string()),
            file_name: Some("box.prt".to_string()),
            working_dir: Some("D:/work".to_string()),
            host_version: Some(7),
            slots: Some(SlotsConfig {
                model: Some(vec![Slot::new("w", "width")]),
                text: None,
                text_parameters: Some(vec![Slot::new("ak_text", "text")]),
            }),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: FileConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            file_name = "box.prt"
            unknown_field = true
        "#;

        let result: Result<FileConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
