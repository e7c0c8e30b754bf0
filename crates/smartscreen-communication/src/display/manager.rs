//! Theme-driven drawing on top of [`LcdDisplay`].

use super::facade::LcdDisplay;
use smartscreen_core::{effective_style, ConfigError, Result, Rgb};
use smartscreen_render::Rasterizer;
use smartscreen_settings::{AppConfig, BarWidget, DisplayConfig, ResolvedTheme, TextWidget, Theme};
use std::fmt;
use std::sync::Arc;

/// Puts a theme on the panel: power sequence, static content, widgets
pub struct DisplayManager {
    lcd: Arc<LcdDisplay>,
    theme: ResolvedTheme,
    config: DisplayConfig,
}

impl fmt::Debug for DisplayManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisplayManager")
            .field("revision", &self.config.revision)
            .field("theme", &self.theme.dir)
            .finish_non_exhaustive()
    }
}

impl DisplayManager {
    pub fn new(lcd: Arc<LcdDisplay>, theme: ResolvedTheme, config: DisplayConfig) -> Self {
        Self { lcd, theme, config }
    }

    /// Load the configured theme, open the display, bring it up and paint
    /// the theme's static content
    ///
    /// Returns once everything is queued; the panel catches up on its own.
    pub fn start(config: &AppConfig, rasterizer: Arc<dyn Rasterizer>) -> Result<Self> {
        let theme = Theme::load_from_dir(&config.theme).map_err(ConfigError::from)?;
        let lcd = LcdDisplay::open(&config.display, rasterizer)?;

        let manager = Self::new(Arc::new(lcd), theme, config.display.clone());
        manager.initialize_display()?;
        manager.display_static_images()?;
        manager.display_static_text()?;
        Ok(manager)
    }

    pub fn lcd(&self) -> &Arc<LcdDisplay> {
        &self.lcd
    }

    pub fn theme(&self) -> &ResolvedTheme {
        &self.theme
    }

    /// Reset the panel, open the link, light it and rotate it for the theme
    pub fn initialize_display(&self) -> Result<()> {
        self.lcd.reset()?;
        self.lcd.initialize_comm()?;
        self.turn_on()?;
        let orientation = self.theme.orientation(self.config.reverse);
        tracing::info!("Theme orientation: {}", orientation);
        self.lcd.set_orientation(orientation)
    }

    /// Screen on, configured brightness, theme LED color
    pub fn turn_on(&self) -> Result<()> {
        self.lcd.screen_on()?;
        self.lcd.set_brightness(i32::from(self.config.brightness))?;
        self.lcd.set_backplate_led_color(self.theme.rgb_led)
    }

    /// Screen off, LED off
    pub fn turn_off(&self) -> Result<()> {
        self.lcd.screen_off()?;
        self.lcd.set_backplate_led_color(Rgb::BLACK)
    }

    /// Draw every static image of the theme
    ///
    /// Stops at the first error; items already queued stay queued.
    pub fn display_static_images(&self) -> Result<()> {
        for image in &self.theme.static_images {
            tracing::debug!("Drawing static image '{}'", image.name);
            self.lcd.display_bitmap(
                image.path.clone(),
                image.x,
                image.y,
                image.width,
                image.height,
            )?;
        }
        Ok(())
    }

    /// Draw every static text of the theme
    pub fn display_static_text(&self) -> Result<()> {
        for text in &self.theme.static_texts {
            tracing::debug!("Drawing static text '{}'", text.name);
            self.lcd.display_text(&text.text, text.x, text.y, &text.style)?;
        }
        Ok(())
    }

    /// Draw `text` for a widget showing `value`
    ///
    /// The widget's threshold, when reached by `value`, replaces parts of
    /// its style for this draw only.
    pub fn display_text_widget(&self, text: &str, value: f64, widget: &TextWidget) -> Result<()> {
        let style = effective_style(&widget.style, widget.threshold.as_ref(), value);
        self.lcd.display_text(text, widget.x, widget.y, &style)
    }

    /// Draw a progress bar widget at `value`
    pub fn display_bar_widget(&self, value: f64, widget: &BarWidget) -> Result<()> {
        let style = effective_style(&widget.style, widget.threshold.as_ref(), value);
        self.lcd.display_progress_bar(
            widget.x,
            widget.y,
            widget.width,
            widget.height,
            value,
            widget.min_value,
            widget.max_value,
            &style,
        )
    }
}
