//! # SmartScreen Render
//!
//! Turns text, sensor values and progress bars into RGB bitmaps ready to be
//! queued for the panel. Everything here runs on the producer side.

pub mod background;
pub mod format;
pub mod progress;
pub mod rasterizer;

use image::RgbImage;

pub use background::background_region;
pub use format::format_number;
pub use progress::{progress_fill_width, render_progress_bar, ProgressBarRequest};
pub use rasterizer::{FontRasterizer, Rasterizer, TextRequest};

/// A rendered bitmap and where its top-left corner goes on the panel
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub x: u32,
    pub y: u32,
    pub image: RgbImage,
}
