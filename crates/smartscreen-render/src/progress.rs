//! Progress bar rendering.

use crate::background::background_region;
use crate::Rendered;
use image::RgbImage;
use smartscreen_core::{BarStyle, ParameterError, Rect, Result};

/// Everything needed to draw one progress bar
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressBarRequest {
    /// Bar area in panel coordinates
    pub area: Rect,
    pub value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub style: BarStyle,
}

/// Number of filled columns for `value` on a bar `width` pixels wide
///
/// `value` is clamped to `[min, max]` first, so the result never exceeds
/// `width` and never decreases as `value` grows. A NaN value counts as `min`.
pub fn progress_fill_width(
    value: f64,
    min: f64,
    max: f64,
    width: u32,
) -> std::result::Result<u32, ParameterError> {
    // also rejects NaN bounds
    if !(max > min) {
        return Err(ParameterError::InvalidRange { min, max });
    }
    let value = if value.is_nan() {
        min
    } else {
        value.clamp(min, max)
    };
    let ratio = (value - min) / (max - min);
    let filled = (ratio * f64::from(width)).round();
    Ok((filled as u32).min(width))
}

/// Draw a progress bar: background, filled part from the left, optional
/// one-pixel outline in the bar color
pub fn render_progress_bar(request: &ProgressBarRequest) -> Result<Rendered> {
    let area = request.area;
    if area.is_empty() {
        return Err(ParameterError::InvalidSize {
            width: i64::from(area.width),
            height: i64::from(area.height),
        }
        .into());
    }
    let filled = progress_fill_width(
        request.value,
        request.min_value,
        request.max_value,
        area.width,
    )?;

    let mut canvas: RgbImage = background_region(&request.style.background, area)?;
    let color = request.style.bar_color.into();

    for y in 0..area.height {
        for x in 0..filled {
            canvas.put_pixel(x, y, color);
        }
    }

    if request.style.outline {
        let (right, bottom) = (area.width - 1, area.height - 1);
        for x in 0..area.width {
            canvas.put_pixel(x, 0, color);
            canvas.put_pixel(x, bottom, color);
        }
        for y in 0..area.height {
            canvas.put_pixel(0, y, color);
            canvas.put_pixel(right, y, color);
        }
    }

    Ok(Rendered {
        x: area.x,
        y: area.y,
        image: canvas,
    })
}
