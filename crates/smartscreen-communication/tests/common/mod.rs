#![allow(dead_code)]

use image::RgbImage;
use parking_lot::Mutex;
use smartscreen_communication::{LcdDisplay, SimulatedBackend, SimulatedScreen};
use smartscreen_core::{RenderError, Result};
use smartscreen_render::{Rasterizer, Rendered, TextRequest};
use smartscreen_settings::{DisplayConfig, Revision};
use std::sync::Arc;
use std::time::Duration;

pub const IDLE: Duration = Duration::from_secs(5);

/// Draws every character as a 4 × font_size block of the font color
#[derive(Default)]
pub struct BlockRasterizer {
    pub requests: Mutex<Vec<TextRequest>>,
}

impl Rasterizer for BlockRasterizer {
    fn render_text(&self, request: &TextRequest, panel: (u32, u32)) -> Result<Rendered> {
        self.requests.lock().push(request.clone());
        let width = (request.text.chars().count() as u32 * 4).min(panel.0 - request.x);
        let height = request.style.font_size.min(panel.1 - request.y);
        if width == 0 || height == 0 {
            return Err(RenderError::Empty {
                reason: "clipped away".to_string(),
            }
            .into());
        }
        Ok(Rendered {
            x: request.x,
            y: request.y,
            image: RgbImage::from_pixel(width, height, request.style.font_color.into()),
        })
    }
}

pub fn simulated_config() -> DisplayConfig {
    DisplayConfig {
        revision: Revision::Simulated,
        ..Default::default()
    }
}

/// Display on a simulated panel plus a view of its canvas
pub fn simulated_display(
    config: &DisplayConfig,
) -> (LcdDisplay, SimulatedScreen, Arc<BlockRasterizer>) {
    let backend = SimulatedBackend::new(config.panel(), config.max_payload());
    let screen = backend.screen();
    let rasterizer = Arc::new(BlockRasterizer::default());
    let lcd = LcdDisplay::with_backend(config, Box::new(backend), rasterizer.clone()).unwrap();
    (lcd, screen, rasterizer)
}
