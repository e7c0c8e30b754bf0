//! Splitting bitmaps into frames that fit the payload limit.

use smartscreen_core::Rect;

/// Cut `rect` into windows whose pixel payload fits in `max_payload` bytes
///
/// Windows are bands of whole rows, top to bottom. When a single row is
/// already too large, every row is cut into segments instead. The windows
/// tile `rect` exactly: no gaps, no overlaps.
pub fn chunk_windows(rect: Rect, bytes_per_pixel: usize, max_payload: usize) -> Vec<Rect> {
    if rect.is_empty() {
        return Vec::new();
    }
    let bytes_per_pixel = bytes_per_pixel.max(1);
    let (end_x, end_y) = (rect.x + rect.width, rect.y + rect.height);
    let row_bytes = rect.width as usize * bytes_per_pixel;

    if row_bytes <= max_payload {
        let rows = (max_payload / row_bytes).max(1) as u32;
        return (rect.y..end_y)
            .step_by(rows as usize)
            .map(|y| Rect::new(rect.x, y, rect.width, rows.min(end_y - y)))
            .collect();
    }

    let segment = (max_payload / bytes_per_pixel).max(1) as u32;
    let mut windows = Vec::new();
    for y in rect.y..end_y {
        let mut x = rect.x;
        while x < end_x {
            let width = segment.min(end_x - x);
            windows.push(Rect::new(x, y, width, 1));
            x += width;
        }
    }
    windows
}
