//! Number formatting options for sensor text widgets.

use serde::{Deserialize, Serialize};

/// Horizontal alignment of a formatted number inside its fixed length
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    /// Padding after the number
    Left,
    /// Padding split around the number
    Center,
    /// Padding before the number
    #[default]
    Right,
}

/// Number of decimals to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Decimals {
    /// Fixed precision
    Fixed(u8),
    /// Precision adapted so the number fills `length` characters
    Auto(AutoDecimals),
}

/// Marker for `decimals = "auto"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoDecimals {
    Auto,
}

impl Default for Decimals {
    fn default() -> Self {
        Self::Fixed(0)
    }
}

/// How a numeric value is turned into widget text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberFormat {
    pub decimals: Decimals,
    pub align: Align,
    /// Width of the number part, in characters
    pub length: usize,
    /// Append the unit
    pub show_unit: bool,
    /// Put a space between number and unit
    pub unit_space: bool,
    /// Force a byte prefix ("K", "M", "G", ...) instead of picking one
    pub unit: Option<String>,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimals: Decimals::default(),
            align: Align::default(),
            length: 3,
            show_unit: false,
            unit_space: true,
            unit: None,
        }
    }
}
