//! Plain data types shared by every SmartScreen crate.

pub mod color;
pub mod format;
pub mod geometry;
pub mod style;

pub use color::Rgb;
pub use format::{Align, AutoDecimals, Decimals, NumberFormat};
pub use geometry::{Orientation, PanelSize, Rect};
pub use style::{
    effective_style, Background, BarOverrides, BarStyle, StyleOverride, TextOverrides, TextStyle,
    Threshold,
};
