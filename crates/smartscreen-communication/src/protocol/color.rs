//! RGB565 pixel payloads.

use image::RgbImage;
use smartscreen_core::{Rect, Rgb};

/// Byte order of each 16-bit pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Encode the pixels of `region` (image coordinates), row by row
///
/// With `rotate_180` the pixels are emitted last to first, which is the
/// same region turned upside down.
pub fn encode_rgb565(image: &RgbImage, region: Rect, endian: Endian, rotate_180: bool) -> Vec<u8> {
    let mut out = Vec::with_capacity(region.area() as usize * 2);
    let mut push = |x: u32, y: u32| {
        let value = Rgb::from(*image.get_pixel(x, y)).to_rgb565();
        match endian {
            Endian::Little => out.extend_from_slice(&value.to_le_bytes()),
            Endian::Big => out.extend_from_slice(&value.to_be_bytes()),
        }
    };

    let rows = region.y..region.y + region.height;
    let cols = region.x..region.x + region.width;
    if rotate_180 {
        for y in rows.rev() {
            for x in cols.clone().rev() {
                push(x, y);
            }
        }
    } else {
        for y in rows {
            for x in cols.clone() {
                push(x, y);
            }
        }
    }
    out
}
