//! Display theme
//!
//! A theme describes what is drawn where: static images and text painted
//! once, and the text / bar widgets the statistics refresh redraws. The raw
//! file is mostly optional fields; [`Theme::resolve`] fills every gap from the
//! theme's `[defaults]` table (or the built-in defaults) exactly once, so the
//! drawing code only ever sees complete [`TextStyle`] / [`BarStyle`] values.
//!
//! Entries keep the order they have in the file; static items are painted in
//! that order, so later entries land on top.

use crate::config::load_structured;
use crate::error::SettingsResult;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smartscreen_core::{
    Background, BarOverrides, BarStyle, NumberFormat, Orientation, Rgb, StyleOverride,
    TextOverrides, TextStyle, Threshold,
};
use std::path::{Path, PathBuf};

/// File name of the theme description inside a theme directory
pub const THEME_FILE: &str = "theme.toml";

/// `[display]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDisplay {
    /// "portrait" or "landscape"
    pub orientation: String,
    /// Backplate LED color on panels that have one
    pub rgb_led: Option<Rgb>,
}

impl Default for ThemeDisplay {
    fn default() -> Self {
        Self {
            orientation: "portrait".to_string(),
            rgb_led: None,
        }
    }
}

/// `[defaults]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeDefaults {
    pub font: String,
    pub font_size: u32,
    pub font_color: Rgb,
    pub text_background_color: Rgb,
    pub text_background_image: Option<PathBuf>,
    pub bar_color: Rgb,
    pub bar_outline: bool,
    pub bar_background_color: Rgb,
    pub bar_background_image: Option<PathBuf>,
}

impl Default for ThemeDefaults {
    fn default() -> Self {
        Self {
            font: "roboto-mono/RobotoMono-Regular.ttf".to_string(),
            font_size: 10,
            font_color: Rgb::WHITE,
            text_background_color: Rgb::BLACK,
            text_background_image: None,
            bar_color: Rgb::WHITE,
            bar_outline: false,
            bar_background_color: Rgb::BLACK,
            bar_background_image: None,
        }
    }
}

/// `[static_images.<name>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticImageEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    /// 0 means the image's own width
    #[serde(default)]
    pub width: i32,
    /// 0 means the image's own height
    #[serde(default)]
    pub height: i32,
}

/// `[static_text.<name>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticTextEntry {
    pub text: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(flatten)]
    pub style: TextOverrides,
}

/// `[widgets.text.<name>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextWidgetEntry {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default)]
    pub threshold: Option<Threshold<TextOverrides>>,
    #[serde(flatten)]
    pub style: TextOverrides,
    #[serde(flatten)]
    pub format: NumberFormat,
}

fn default_max_value() -> f64 {
    100.0
}

/// `[widgets.bar.<name>]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarWidgetEntry {
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    pub width: i32,
    pub height: i32,
    #[serde(default)]
    pub min_value: f64,
    #[serde(default = "default_max_value")]
    pub max_value: f64,
    #[serde(default)]
    pub threshold: Option<Threshold<BarOverrides>>,
    #[serde(flatten)]
    pub style: BarOverrides,
}

/// `[widgets]` table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeWidgets {
    pub text: IndexMap<String, TextWidgetEntry>,
    pub bar: IndexMap<String, BarWidgetEntry>,
}

/// Theme as written in `theme.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub display: ThemeDisplay,
    pub defaults: ThemeDefaults,
    pub static_images: IndexMap<String, StaticImageEntry>,
    pub static_text: IndexMap<String, StaticTextEntry>,
    pub widgets: ThemeWidgets,
}

/// A static image, path made absolute
#[derive(Debug, Clone, PartialEq)]
pub struct StaticImage {
    pub name: String,
    pub path: PathBuf,
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A static text with its resolved style
#[derive(Debug, Clone, PartialEq)]
pub struct StaticText {
    pub name: String,
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub style: TextStyle,
}

/// A value-driven text widget
#[derive(Debug, Clone, PartialEq)]
pub struct TextWidget {
    pub x: i32,
    pub y: i32,
    pub style: TextStyle,
    pub format: NumberFormat,
    pub threshold: Option<Threshold<TextOverrides>>,
}

/// A value-driven progress bar widget
#[derive(Debug, Clone, PartialEq)]
pub struct BarWidget {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub min_value: f64,
    pub max_value: f64,
    pub style: BarStyle,
    pub threshold: Option<Threshold<BarOverrides>>,
}

/// Theme with every default applied and every path made absolute
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTheme {
    /// Theme directory
    pub dir: PathBuf,
    /// Orientation keyword from the theme
    pub orientation: String,
    /// Backplate LED color
    pub rgb_led: Rgb,
    /// Style of text without overrides
    pub text_defaults: TextStyle,
    /// Style of bars without overrides
    pub bar_defaults: BarStyle,
    pub static_images: Vec<StaticImage>,
    pub static_texts: Vec<StaticText>,
    pub text_widgets: IndexMap<String, TextWidget>,
    pub bar_widgets: IndexMap<String, BarWidget>,
}

impl ResolvedTheme {
    /// Orientation the panel should be put in, see [`resolve_orientation`]
    pub fn orientation(&self, reverse: bool) -> Orientation {
        resolve_orientation(&self.orientation, reverse)
    }
}

impl Theme {
    /// Load `theme.toml` from a theme directory and resolve it
    pub fn load_from_dir(dir: &Path) -> SettingsResult<ResolvedTheme> {
        let path = dir.join(THEME_FILE);
        let theme: Theme = load_structured(&path)?;
        tracing::info!("Loaded theme from {}", path.display());
        Ok(theme.resolve(dir))
    }

    /// Apply defaults and anchor relative paths at `dir`
    pub fn resolve(self, dir: &Path) -> ResolvedTheme {
        let anchor = |p: &Path| -> PathBuf {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                dir.join(p)
            }
        };
        let anchor_text = |o: TextOverrides| TextOverrides {
            background_image: o.background_image.as_deref().map(anchor),
            ..o
        };
        let anchor_bar = |o: BarOverrides| BarOverrides {
            background_image: o.background_image.as_deref().map(anchor),
            ..o
        };

        let d = &self.defaults;
        let text_defaults = TextStyle {
            font: d.font.clone(),
            font_size: d.font_size,
            font_color: d.font_color,
            background: match &d.text_background_image {
                Some(image) => Background::Image(anchor(image)),
                None => Background::Color(d.text_background_color),
            },
        };
        let bar_defaults = BarStyle {
            bar_color: d.bar_color,
            outline: d.bar_outline,
            background: match &d.bar_background_image {
                Some(image) => Background::Image(anchor(image)),
                None => Background::Color(d.bar_background_color),
            },
        };

        let static_images = self
            .static_images
            .into_iter()
            .map(|(name, entry)| StaticImage {
                name,
                path: anchor(&entry.path),
                x: entry.x,
                y: entry.y,
                width: entry.width,
                height: entry.height,
            })
            .collect();

        let static_texts = self
            .static_text
            .into_iter()
            .map(|(name, entry)| StaticText {
                name,
                text: entry.text,
                x: entry.x,
                y: entry.y,
                style: anchor_text(entry.style).apply(&text_defaults),
            })
            .collect();

        let text_widgets = self
            .widgets
            .text
            .into_iter()
            .map(|(name, entry)| {
                let widget = TextWidget {
                    x: entry.x,
                    y: entry.y,
                    style: anchor_text(entry.style).apply(&text_defaults),
                    format: entry.format,
                    threshold: entry.threshold.map(|t| Threshold {
                        value: t.value,
                        overrides: anchor_text(t.overrides),
                    }),
                };
                (name, widget)
            })
            .collect();

        let bar_widgets = self
            .widgets
            .bar
            .into_iter()
            .map(|(name, entry)| {
                let widget = BarWidget {
                    x: entry.x,
                    y: entry.y,
                    width: entry.width,
                    height: entry.height,
                    min_value: entry.min_value,
                    max_value: entry.max_value,
                    style: anchor_bar(entry.style).apply(&bar_defaults),
                    threshold: entry.threshold.map(|t| Threshold {
                        value: t.value,
                        overrides: anchor_bar(t.overrides),
                    }),
                };
                (name, widget)
            })
            .collect();

        ResolvedTheme {
            dir: dir.to_path_buf(),
            orientation: self.display.orientation,
            rgb_led: self.display.rgb_led.unwrap_or(Rgb::WHITE),
            text_defaults,
            bar_defaults,
            static_images,
            static_texts,
            text_widgets,
            bar_widgets,
        }
    }
}

/// Map the theme orientation keyword and the config `reverse` flag to an
/// [`Orientation`]
///
/// `reverse_portrait` / `reverse_landscape` are still understood but
/// deprecated; unknown keywords fall back to portrait.
pub fn resolve_orientation(keyword: &str, reverse: bool) -> Orientation {
    match keyword.trim().to_ascii_lowercase().as_str() {
        "portrait" if reverse => Orientation::ReversePortrait,
        "portrait" => Orientation::Portrait,
        "landscape" if reverse => Orientation::ReverseLandscape,
        "landscape" => Orientation::Landscape,
        "reverse_portrait" => {
            tracing::warn!(
                "'reverse_portrait' is deprecated as theme orientation, use 'portrait' and set display.reverse in the config"
            );
            Orientation::ReversePortrait
        }
        "reverse_landscape" => {
            tracing::warn!(
                "'reverse_landscape' is deprecated as theme orientation, use 'landscape' and set display.reverse in the config"
            );
            Orientation::ReverseLandscape
        }
        other => {
            tracing::warn!("Orientation '{}' unknown, using portrait", other);
            Orientation::Portrait
        }
    }
}
