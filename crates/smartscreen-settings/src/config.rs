//! Application configuration
//!
//! Provides the strongly-typed configuration the display layer is built
//! from. Files are TOML or JSON, chosen by extension, and are validated once
//! at load time; every missing value falls back to the documented default of
//! its field here and nowhere else.

use crate::error::{SettingsError, SettingsResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use smartscreen_core::{ConfigError, PanelSize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Panel controller revision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Revision {
    /// Turing Smart Screen 3.5"
    A,
    /// XuanFang 3.5"
    B,
    /// No hardware, render to an in-memory canvas
    Simulated,
}

impl FromStr for Revision {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(Self::A),
            "B" => Ok(Self::B),
            "SIMU" => Ok(Self::Simulated),
            _ => Err(ConfigError::UnknownRevision {
                revision: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for Revision {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Revision> for String {
    fn from(revision: Revision) -> Self {
        revision.to_string()
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "A"),
            Self::B => write!(f, "B"),
            Self::Simulated => write!(f, "SIMU"),
        }
    }
}

/// Display connection and behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Controller revision
    pub revision: Revision,
    /// Serial port identifier (e.g. "/dev/ttyACM0", "COM3")
    pub port: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Native (portrait) width in pixels
    pub width: u32,
    /// Native (portrait) height in pixels
    pub height: u32,
    /// Initial brightness in percent
    pub brightness: u8,
    /// Use the 180° rotated variant of the theme orientation
    pub reverse: bool,
    /// Maximum number of pending commands
    pub queue_capacity: usize,
    /// How long a producer may wait for room in a full queue
    pub enqueue_timeout_ms: u64,
    /// Serial read/write timeout
    pub io_timeout_ms: u64,
    /// How long to wait for an acknowledgement
    pub ack_timeout_ms: u64,
    /// Maximum pixel bytes per frame; the revision default when unset
    pub max_payload_bytes: Option<usize>,
    /// Delay after a reset; the revision default when unset
    pub reset_settle_ms: Option<u64>,
    /// PNG file the simulated backend mirrors its canvas to
    pub simulated_output: Option<PathBuf>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            revision: Revision::A,
            port: String::new(),
            baud_rate: 115_200,
            width: 320,
            height: 480,
            brightness: 20,
            reverse: false,
            queue_capacity: 64,
            enqueue_timeout_ms: 1000,
            io_timeout_ms: 1000,
            ack_timeout_ms: 1000,
            max_payload_bytes: None,
            reset_settle_ms: None,
            simulated_output: None,
        }
    }
}

impl DisplayConfig {
    /// Native panel size
    pub fn panel(&self) -> PanelSize {
        PanelSize::new(self.width, self.height)
    }

    /// Maximum pixel bytes per frame: configured value or native width × 8
    pub fn max_payload(&self) -> usize {
        self.max_payload_bytes
            .unwrap_or(self.width as usize * 8)
    }

    /// Producer wait on a full queue
    pub fn enqueue_timeout(&self) -> Duration {
        Duration::from_millis(self.enqueue_timeout_ms)
    }

    /// Serial read/write timeout
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }

    /// Acknowledgement timeout
    pub fn ack_timeout(&self) -> Duration {
        Duration::from_millis(self.ack_timeout_ms)
    }

    /// Validate display settings
    pub fn validate(&self) -> SettingsResult<()> {
        if self.revision != Revision::Simulated && self.port.trim().is_empty() {
            return Err(SettingsError::invalid(
                "display.port",
                "a serial port is required for hardware revisions",
            ));
        }

        if self.baud_rate == 0 {
            return Err(SettingsError::invalid("display.baud_rate", "must be > 0"));
        }

        if self.width == 0 || self.height == 0 {
            return Err(SettingsError::invalid(
                "display.width/height",
                "panel dimensions must be > 0",
            ));
        }

        if self.width > 0xFFFF || self.height > 0xFFFF {
            return Err(SettingsError::invalid(
                "display.width/height",
                "panel dimensions must fit in 16 bits",
            ));
        }

        if self.brightness > 100 {
            return Err(SettingsError::invalid(
                "display.brightness",
                format!("{} is not a percentage", self.brightness),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(SettingsError::invalid("display.queue_capacity", "must be > 0"));
        }

        if self.io_timeout_ms == 0 || self.ack_timeout_ms == 0 {
            return Err(SettingsError::invalid(
                "display.io_timeout_ms/ack_timeout_ms",
                "timeouts must be > 0",
            ));
        }

        // One RGB565 pixel is the smallest payload a frame can carry
        if self.max_payload() < 2 {
            return Err(SettingsError::invalid(
                "display.max_payload_bytes",
                "must hold at least one pixel",
            ));
        }

        Ok(())
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Display settings
    pub display: DisplayConfig,
    /// Theme directory (contains `theme.toml`)
    pub theme: PathBuf,
    /// Directory font names are resolved against
    pub fonts_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            display: DisplayConfig::default(),
            theme: PathBuf::from("res/themes/default"),
            fonts_dir: PathBuf::from("res/fonts"),
        }
    }
}

impl AppConfig {
    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let config: Self = load_structured(path)?;
        config.validate()?;
        tracing::info!(
            "Loaded configuration from {} (revision {}, port '{}')",
            path.display(),
            config.display.revision,
            config.display.port
        );
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> SettingsResult<()> {
        self.display.validate()?;

        if self.theme.as_os_str().is_empty() {
            return Err(SettingsError::invalid("theme", "must not be empty"));
        }

        Ok(())
    }
}

/// Read and deserialize a `.toml` or `.json` file
pub(crate) fn load_structured<T: DeserializeOwned>(path: &Path) -> SettingsResult<T> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
        path: path.display().to_string(),
        source,
    })?;

    if path.extension().is_some_and(|ext| ext == "json") {
        Ok(serde_json::from_str(&content)?)
    } else if path.extension().is_some_and(|ext| ext == "toml") {
        Ok(toml::from_str(&content)?)
    } else {
        Err(SettingsError::UnsupportedFormat(path.display().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revision_parsing() {
        assert_eq!("A".parse::<Revision>(), Ok(Revision::A));
        assert_eq!("b".parse::<Revision>(), Ok(Revision::B));
        assert_eq!("SIMU".parse::<Revision>(), Ok(Revision::Simulated));
        assert_eq!(
            "C".parse::<Revision>(),
            Err(ConfigError::UnknownRevision {
                revision: "C".to_string()
            })
        );
    }

    #[test]
    fn test_defaults() {
        let config = DisplayConfig::default();
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.panel(), PanelSize::new(320, 480));
        assert_eq!(config.max_payload(), 2560);
    }

    #[test]
    fn test_hardware_revision_requires_port() {
        let config = DisplayConfig::default();
        assert!(config.validate().is_err());

        let config = DisplayConfig {
            revision: Revision::Simulated,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_brightness_must_be_percentage() {
        let config = DisplayConfig {
            port: "/dev/ttyACM0".to_string(),
            brightness: 150,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tiny_payload_rejected() {
        let config = DisplayConfig {
            revision: Revision::Simulated,
            max_payload_bytes: Some(1),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
