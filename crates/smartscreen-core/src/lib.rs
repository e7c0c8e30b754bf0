//! # SmartScreen Core
//!
//! Core types, errors and style records for SmartScreen.
//! Provides panel geometry, colors, resolved drawing styles and the
//! threshold rules that switch between them.

pub mod error;
pub mod types;

pub use error::{
    ConfigError, Error, ParameterError, QueueError, RenderError, Result, TransportError,
};

pub use types::{
    effective_style, Align, AutoDecimals, Background, BarOverrides, BarStyle, Decimals,
    NumberFormat, Orientation, PanelSize, Rect, Rgb, StyleOverride, TextOverrides, TextStyle,
    Threshold,
};
