//! Text rasterization with TrueType fonts.
//!
//! Fonts are looked up relative to the fonts directory, parsed once with
//! `rusttype` and cached for the lifetime of the rasterizer. Text is drawn
//! the way themes expect it: `(x, y)` is the top-left corner of the line
//! box, the glyphs are blended into the background with their coverage and
//! the result is clipped to the panel.

use crate::background::background_region;
use crate::progress::{render_progress_bar, ProgressBarRequest};
use crate::Rendered;
use parking_lot::Mutex;
use rusttype::{point, Font, PositionedGlyph, Scale};
use smartscreen_core::{ParameterError, Rect, RenderError, Result, Rgb, TextStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One line of text to draw
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub text: String,
    /// Top-left corner in logical panel coordinates
    pub x: u32,
    pub y: u32,
    pub style: TextStyle,
}

/// Turns text and progress bars into bitmaps
///
/// Called on producer threads, never on the display worker.
pub trait Rasterizer: Send + Sync {
    /// Render `request` on a panel of `panel` logical pixels
    fn render_text(&self, request: &TextRequest, panel: (u32, u32)) -> Result<Rendered>;

    /// Render a progress bar
    fn render_progress_bar(&self, request: &ProgressBarRequest) -> Result<Rendered> {
        render_progress_bar(request)
    }
}

/// [`Rasterizer`] backed by TrueType font files
pub struct FontRasterizer {
    fonts_dir: PathBuf,
    cache: Mutex<HashMap<String, Arc<Font<'static>>>>,
}

impl FontRasterizer {
    pub fn new(fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            fonts_dir: fonts_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    /// Load (or fetch from cache) the font named `name`
    pub fn font(&self, name: &str) -> std::result::Result<Arc<Font<'static>>, RenderError> {
        if let Some(font) = self.cache.lock().get(name) {
            return Ok(Arc::clone(font));
        }

        let path = self.fonts_dir.join(name);
        let bytes = std::fs::read(&path).map_err(|e| RenderError::FontLoad {
            font: name.to_string(),
            reason: format!("{}: {}", path.display(), e),
        })?;
        let font = Font::try_from_vec(bytes).ok_or_else(|| RenderError::FontLoad {
            font: name.to_string(),
            reason: "not a TrueType/OpenType font".to_string(),
        })?;
        tracing::debug!("Loaded font {}", path.display());

        let font = Arc::new(font);
        self.cache
            .lock()
            .insert(name.to_string(), Arc::clone(&font));
        Ok(font)
    }
}

/// Bounding box of a laid-out line, in signed panel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TextBox {
    left: i64,
    top: i64,
    right: i64,
    bottom: i64,
}

impl TextBox {
    fn include(&mut self, min_x: i64, min_y: i64, max_x: i64, max_y: i64) {
        self.left = self.left.min(min_x);
        self.top = self.top.min(min_y);
        self.right = self.right.max(max_x);
        self.bottom = self.bottom.max(max_y);
    }

    /// Intersection with a `width` × `height` panel
    fn clip(self, width: u32, height: u32) -> Option<Rect> {
        let left = self.left.max(0);
        let top = self.top.max(0);
        let right = self.right.min(i64::from(width));
        let bottom = self.bottom.min(i64::from(height));
        if right <= left || bottom <= top {
            return None;
        }
        Some(Rect::new(
            left as u32,
            top as u32,
            (right - left) as u32,
            (bottom - top) as u32,
        ))
    }
}

fn text_box(glyphs: &[PositionedGlyph<'_>], x: u32, y: u32, line_height: f32) -> TextBox {
    let left = i64::from(x);
    let top = i64::from(y);
    let advance_end = glyphs
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(x as f32);

    let mut bbox = TextBox {
        left,
        top,
        right: advance_end.ceil() as i64,
        bottom: top + line_height.ceil() as i64,
    };
    for glyph in glyphs {
        if let Some(pb) = glyph.pixel_bounding_box() {
            bbox.include(
                i64::from(pb.min.x),
                i64::from(pb.min.y),
                i64::from(pb.max.x),
                i64::from(pb.max.y),
            );
        }
    }
    bbox
}

impl Rasterizer for FontRasterizer {
    fn render_text(&self, request: &TextRequest, panel: (u32, u32)) -> Result<Rendered> {
        if request.text.is_empty() {
            return Err(ParameterError::EmptyText.into());
        }
        if request.style.font_size == 0 {
            return Err(ParameterError::InvalidFontSize.into());
        }

        let font = self.font(&request.style.font)?;
        let scale = Scale::uniform(request.style.font_size as f32);
        let v_metrics = font.v_metrics(scale);
        let origin = point(request.x as f32, request.y as f32 + v_metrics.ascent);
        let glyphs: Vec<PositionedGlyph<'_>> = font.layout(&request.text, scale, origin).collect();

        let line_height = v_metrics.ascent - v_metrics.descent;
        let area = text_box(&glyphs, request.x, request.y, line_height)
            .clip(panel.0, panel.1)
            .ok_or_else(|| RenderError::Empty {
                reason: format!(
                    "'{}' at ({}, {}) is outside the {}x{} panel",
                    request.text, request.x, request.y, panel.0, panel.1
                ),
            })?;

        let mut canvas = background_region(&request.style.background, area)?;
        let color = request.style.font_color;

        for glyph in &glyphs {
            let Some(pb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = i64::from(pb.min.x) + i64::from(gx) - i64::from(area.x);
                let py = i64::from(pb.min.y) + i64::from(gy) - i64::from(area.y);
                if px < 0 || py < 0 || px >= i64::from(area.width) || py >= i64::from(area.height) {
                    return;
                }
                let (px, py) = (px as u32, py as u32);
                let under = Rgb::from(*canvas.get_pixel(px, py));
                canvas.put_pixel(px, py, color.blend_over(under, coverage).into());
            });
        }

        Ok(Rendered {
            x: area.x,
            y: area.y,
            image: canvas,
        })
    }
}
