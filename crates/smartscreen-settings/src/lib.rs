//! SmartScreen Settings Crate
//!
//! Loads the application configuration and the display theme, validates
//! them once, and hands strongly-typed records to the display layer.

pub mod config;
pub mod error;
pub mod theme;

pub use config::{AppConfig, DisplayConfig, Revision};
pub use error::{SettingsError, SettingsResult};
pub use theme::{
    resolve_orientation, BarWidget, ResolvedTheme, StaticImage, StaticText, TextWidget, Theme,
    THEME_FILE,
};
