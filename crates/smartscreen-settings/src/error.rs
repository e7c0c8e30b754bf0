//! Error types for the settings crate.
//!
//! This module provides structured error types for loading and validating
//! the application configuration and the display theme.

use smartscreen_core::ConfigError;
use std::io;
use thiserror::Error;

/// Errors that can occur while loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    /// The file extension is not one we know how to parse.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// A configuration value is invalid.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },
}

impl SettingsError {
    /// Shorthand for [`SettingsError::InvalidSetting`]
    pub fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<SettingsError> for ConfigError {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::InvalidSetting { key, reason } => ConfigError::InvalidValue { key, reason },
            SettingsError::Read { path, source } => ConfigError::LoadFailed {
                path,
                reason: source.to_string(),
            },
            other => ConfigError::LoadFailed {
                path: String::new(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<SettingsError> for smartscreen_core::Error {
    fn from(err: SettingsError) -> Self {
        smartscreen_core::Error::Config(err.into())
    }
}

/// Result type alias for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_error_display() {
        let err = SettingsError::invalid("display.brightness", "must be <= 100");
        assert_eq!(
            err.to_string(),
            "Invalid setting 'display.brightness': must be <= 100"
        );

        let err = SettingsError::UnsupportedFormat("yaml".to_string());
        assert_eq!(err.to_string(), "Unsupported config format: yaml");
    }

    #[test]
    fn test_conversion_to_config_error() {
        let err = SettingsError::invalid("display.port", "empty");
        let config_err: ConfigError = err.into();
        assert_eq!(
            config_err,
            ConfigError::InvalidValue {
                key: "display.port".to_string(),
                reason: "empty".to_string()
            }
        );

        let io_err = io::Error::new(io::ErrorKind::NotFound, "no such file");
        let err = SettingsError::Read {
            path: "config.toml".to_string(),
            source: io_err,
        };
        let core_err: smartscreen_core::Error = err.into();
        assert!(core_err.is_config_error());
    }
}
