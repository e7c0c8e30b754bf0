//! # SmartScreen
//!
//! Driver for small USB serial LCD panels used as system monitors, with
//! support for:
//! - Turing Smart Screen 3.5" (revision A) and XuanFang 3.5" (revision B)
//! - A simulated panel rendering to memory or a PNG file
//! - TOML themes: static images and text, text and progress bar widgets
//!   with threshold-triggered styles
//!
//! ## Architecture
//!
//! SmartScreen is organized as a workspace with multiple crates:
//!
//! 1. **smartscreen-core** - Errors, geometry, colors, styles
//! 2. **smartscreen-settings** - Configuration and theme loading
//! 3. **smartscreen-render** - Text and progress bar rasterization
//! 4. **smartscreen-communication** - Transport, command queue, panel protocols, display facade
//! 5. **smartscreen** - Main binary that integrates all crates

use anyhow::Context;
use std::sync::Arc;

pub use smartscreen_communication::{
    BitmapSource, DeviceState, DisplayBackend, DisplayManager, LcdDisplay, SimulatedBackend,
    SimulatedScreen,
};
pub use smartscreen_core::{
    effective_style, Background, BarStyle, ConfigError, Error, Orientation, PanelSize,
    ParameterError, QueueError, Rect, RenderError, Result, Rgb, TextStyle, Threshold,
    TransportError,
};
pub use smartscreen_render::{format_number, FontRasterizer, Rasterizer};
pub use smartscreen_settings::{AppConfig, DisplayConfig, ResolvedTheme, Revision, Theme};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Open the display described by `config`, bring it up and paint the
/// theme's static content
///
/// Returns once everything is queued; the panel catches up on its own.
pub fn start(config: &AppConfig) -> anyhow::Result<DisplayManager> {
    let rasterizer = Arc::new(FontRasterizer::new(&config.fonts_dir));
    DisplayManager::start(config, rasterizer).with_context(|| {
        format!(
            "starting revision {} display with theme {}",
            config.display.revision,
            config.theme.display()
        )
    })
}

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support
/// - Thread names, so the display worker is easy to spot
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .context("installing the tracing subscriber")?;

    Ok(())
}
