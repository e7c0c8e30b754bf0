//! Revision A controller (Turing Smart Screen 3.5")
//!
//! Every command starts with a 6-byte header packing a 10-bit/10-bit
//! window `(x, y, ex, ey)` followed by the opcode. Bitmaps append their
//! RGB565 little-endian pixels to the header. The panel never answers.

use super::chunking::chunk_windows;
use super::color::{encode_rgb565, Endian};
use super::{After, Bitmap, Codec, DeviceState, Frame};
use smartscreen_core::{Orientation, PanelSize, Rect, Result, Rgb};
use std::time::Duration;

pub const RESET: u8 = 101;
pub const CLEAR: u8 = 102;
pub const SCREEN_OFF: u8 = 108;
pub const SCREEN_ON: u8 = 109;
pub const SET_BRIGHTNESS: u8 = 110;
pub const SET_ORIENTATION: u8 = 121;
pub const DISPLAY_BITMAP: u8 = 197;

/// The device drops off the bus while it reboots
pub const DEFAULT_RESET_SETTLE: Duration = Duration::from_secs(5);

/// Pack the addressing window and opcode into a command header
pub fn header(x: u32, y: u32, ex: u32, ey: u32, opcode: u8) -> [u8; 6] {
    [
        (x >> 2) as u8,
        (((x & 3) << 6) + (y >> 4)) as u8,
        (((y & 15) << 4) + (ex >> 6)) as u8,
        (((ex & 63) << 2) + (ey >> 8)) as u8,
        (ey & 255) as u8,
        opcode,
    ]
}

/// Brightness byte: the controller counts down from 255 (off) to 0 (full)
///
/// Fractions are dropped.
pub fn brightness_level(percent: u8) -> u8 {
    let percent = u32::from(percent.min(100));
    ((100 - percent) * 255 / 100) as u8
}

/// Revision A codec
#[derive(Debug, Clone)]
pub struct RevisionA {
    panel: PanelSize,
    max_payload: usize,
    reset_settle: Duration,
}

impl RevisionA {
    pub fn new(panel: PanelSize, max_payload: usize) -> Self {
        Self {
            panel,
            max_payload,
            reset_settle: DEFAULT_RESET_SETTLE,
        }
    }

    pub fn with_reset_settle(mut self, settle: Duration) -> Self {
        self.reset_settle = settle;
        self
    }

    fn command(opcode: u8) -> Frame {
        Frame::new(header(0, 0, 0, 0, opcode).to_vec())
    }

    fn orientation_frame(&self, orientation: Orientation) -> Frame {
        let (width, height) = self.panel.logical(orientation);
        let mut bytes = vec![0u8; 16];
        bytes[..6].copy_from_slice(&header(0, 0, 0, 0, SET_ORIENTATION));
        bytes[6] = 100 + orientation.code();
        bytes[7..9].copy_from_slice(&(width as u16).to_be_bytes());
        bytes[9..11].copy_from_slice(&(height as u16).to_be_bytes());
        Frame::new(bytes)
    }
}

impl Codec for RevisionA {
    fn revision(&self) -> &str {
        "A"
    }

    fn reset(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![Self::command(RESET).then(After::Reconnect(self.reset_settle))])
    }

    fn initialize_comm(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        // no handshake on this revision
        Ok(Vec::new())
    }

    fn clear(&self, state: &DeviceState) -> Result<Vec<Frame>> {
        // CLEAR is only honoured in portrait
        Ok(vec![
            self.orientation_frame(Orientation::Portrait),
            Self::command(CLEAR),
            self.orientation_frame(state.orientation),
        ])
    }

    fn screen_on(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![Self::command(SCREEN_ON)])
    }

    fn screen_off(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![Self::command(SCREEN_OFF)])
    }

    fn set_brightness(&self, percent: u8, _state: &DeviceState) -> Result<Vec<Frame>> {
        let level = brightness_level(percent);
        Ok(vec![Frame::new(
            header(u32::from(level), 0, 0, 0, SET_BRIGHTNESS).to_vec(),
        )])
    }

    fn set_backplate_led_color(&self, color: Rgb, _state: &DeviceState) -> Result<Vec<Frame>> {
        tracing::debug!("Revision A has no backplate LED, ignoring color {}", color);
        Ok(Vec::new())
    }

    fn set_orientation(
        &self,
        orientation: Orientation,
        _state: &DeviceState,
    ) -> Result<Vec<Frame>> {
        Ok(vec![self.orientation_frame(orientation)])
    }

    fn display_bitmap(&self, bitmap: &Bitmap, _state: &DeviceState) -> Result<Vec<Frame>> {
        let frames = chunk_windows(bitmap.rect(), 2, self.max_payload)
            .into_iter()
            .map(|window| {
                let local = Rect::new(
                    window.x - bitmap.x,
                    window.y - bitmap.y,
                    window.width,
                    window.height,
                );
                let mut bytes = header(
                    window.x,
                    window.y,
                    window.right(),
                    window.bottom(),
                    DISPLAY_BITMAP,
                )
                .to_vec();
                bytes.extend(encode_rgb565(&bitmap.image, local, Endian::Little, false));
                Frame::new(bytes)
            })
            .collect();
        Ok(frames)
    }
}
