//! Resolved drawing styles and threshold-driven overrides.
//!
//! Styles are plain values. A [`Threshold`] never mutates the style it
//! applies to; [`effective_style`] returns a new one.

use super::color::Rgb;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What sits behind rendered text or a progress bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Background {
    /// Solid fill
    Color(Rgb),
    /// Full-screen image; the region under the drawing is cut out of it
    Image(PathBuf),
}

impl Default for Background {
    fn default() -> Self {
        Self::Color(Rgb::BLACK)
    }
}

/// Fully-resolved text style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Font file, relative to the fonts directory
    pub font: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Glyph color
    pub font_color: Rgb,
    /// Background behind the glyphs
    pub background: Background,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: "roboto-mono/RobotoMono-Regular.ttf".to_string(),
            font_size: 10,
            font_color: Rgb::WHITE,
            background: Background::Color(Rgb::BLACK),
        }
    }
}

/// Fully-resolved progress bar style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarStyle {
    /// Fill and outline color
    pub bar_color: Rgb,
    /// Draw a one-pixel outline around the whole bar
    pub outline: bool,
    /// Background behind the unfilled part
    pub background: Background,
}

impl Default for BarStyle {
    fn default() -> Self {
        Self {
            bar_color: Rgb::WHITE,
            outline: false,
            background: Background::Color(Rgb::BLACK),
        }
    }
}

/// Partial style that can be laid over a resolved one
pub trait StyleOverride {
    /// Style this override applies to
    type Style: Clone;

    /// Return `base` with every field this override sets replaced
    fn apply(&self, base: &Self::Style) -> Self::Style;
}

/// Overrides for [`TextStyle`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextOverrides {
    pub font: Option<String>,
    pub font_size: Option<u32>,
    pub font_color: Option<Rgb>,
    pub background_color: Option<Rgb>,
    pub background_image: Option<PathBuf>,
}

impl StyleOverride for TextOverrides {
    type Style = TextStyle;

    fn apply(&self, base: &TextStyle) -> TextStyle {
        let mut style = base.clone();
        if let Some(font) = &self.font {
            style.font = font.clone();
        }
        if let Some(size) = self.font_size {
            style.font_size = size;
        }
        if let Some(color) = self.font_color {
            style.font_color = color;
        }
        // An image wins over a color when both are given
        if let Some(color) = self.background_color {
            style.background = Background::Color(color);
        }
        if let Some(image) = &self.background_image {
            style.background = Background::Image(image.clone());
        }
        style
    }
}

/// Overrides for [`BarStyle`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarOverrides {
    pub bar_color: Option<Rgb>,
    pub bar_outline: Option<bool>,
    pub background_color: Option<Rgb>,
    pub background_image: Option<PathBuf>,
}

impl StyleOverride for BarOverrides {
    type Style = BarStyle;

    fn apply(&self, base: &BarStyle) -> BarStyle {
        let mut style = base.clone();
        if let Some(color) = self.bar_color {
            style.bar_color = color;
        }
        if let Some(outline) = self.bar_outline {
            style.outline = outline;
        }
        if let Some(color) = self.background_color {
            style.background = Background::Color(color);
        }
        if let Some(image) = &self.background_image {
            style.background = Background::Image(image.clone());
        }
        style
    }
}

/// Overrides that take effect once a displayed value reaches `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold<O> {
    /// Trigger value (inclusive)
    pub value: f64,
    /// Style changes while triggered
    #[serde(flatten)]
    pub overrides: O,
}

impl<O> Threshold<O> {
    /// Whether `value` triggers this threshold
    pub fn is_triggered(&self, value: f64) -> bool {
        value >= self.value
    }
}

/// Style to draw `value` with: `base`, or `base` with the threshold's
/// overrides when `value` is at or above it
pub fn effective_style<O>(base: &O::Style, rule: Option<&Threshold<O>>, value: f64) -> O::Style
where
    O: StyleOverride,
{
    match rule {
        Some(rule) if rule.is_triggered(value) => rule.overrides.apply(base),
        _ => base.clone(),
    }
}
