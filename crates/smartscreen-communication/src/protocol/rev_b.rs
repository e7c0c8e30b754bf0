//! Revision B controller (XuanFang 3.5")
//!
//! Commands are 10-byte frames `[opcode, p0..p7, opcode]`. The panel only
//! rotates by 90°, so the reverse orientations are drawn upside down by this
//! codec: windows are mirrored through the panel centre and pixels are sent
//! last to first. The HELLO handshake reports which hardware variant is
//! attached, which decides how brightness works and whether there is an
//! RGB backplate LED.

use super::chunking::chunk_windows;
use super::color::{encode_rgb565, Endian};
use super::{Bitmap, Codec, DeviceState, Frame};
use image::RgbImage;
use smartscreen_core::{Orientation, PanelSize, Rect, Result, Rgb, TransportError};
use std::fmt;
use std::time::Duration;

pub const HELLO: u8 = 0xCA;
pub const SET_ORIENTATION: u8 = 0xCB;
pub const DISPLAY_BITMAP: u8 = 0xCC;
pub const SET_LIGHTING: u8 = 0xCD;
pub const SET_BRIGHTNESS: u8 = 0xCE;

pub const FRAME_LEN: usize = 10;

const HELLO_PAYLOAD: &[u8; 5] = b"HELLO";

/// Hardware variant reported in the HELLO answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubRevision {
    /// On/off brightness, no LED
    #[default]
    A01,
    /// Dimmable, no LED
    A02,
    /// On/off brightness, RGB LED
    A11,
    /// Dimmable, RGB LED
    A12,
}

impl SubRevision {
    /// Decode the variant byte; unknown values fall back to A01
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0x0A => Self::A01,
            0x0B => Self::A02,
            0x0C => Self::A11,
            0x0D => Self::A12,
            other => {
                tracing::warn!("Unknown revision B variant 0x{:02X}, assuming A01", other);
                Self::A01
            }
        }
    }

    pub fn has_dimming(self) -> bool {
        matches!(self, Self::A02 | Self::A12)
    }

    /// Flagship models carry the RGB backplate
    pub fn has_led(self) -> bool {
        matches!(self, Self::A11 | Self::A12)
    }
}

impl fmt::Display for SubRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::A01 => "A01",
            Self::A02 => "A02",
            Self::A11 => "A11",
            Self::A12 => "A12",
        };
        write!(f, "{}", name)
    }
}

/// Build a `[opcode, payload.., opcode]` frame, payload zero-padded to 8 bytes
pub fn frame(opcode: u8, payload: &[u8]) -> [u8; FRAME_LEN] {
    let mut bytes = [0u8; FRAME_LEN];
    bytes[0] = opcode;
    let len = payload.len().min(8);
    bytes[1..1 + len].copy_from_slice(&payload[..len]);
    bytes[FRAME_LEN - 1] = opcode;
    bytes
}

/// Revision B codec
#[derive(Debug, Clone)]
pub struct RevisionB {
    panel: PanelSize,
    max_payload: usize,
    reset_settle: Duration,
    sub_revision: SubRevision,
}

impl RevisionB {
    pub fn new(panel: PanelSize, max_payload: usize) -> Self {
        Self {
            panel,
            max_payload,
            reset_settle: Duration::ZERO,
            sub_revision: SubRevision::default(),
        }
    }

    pub fn with_reset_settle(mut self, settle: Duration) -> Self {
        self.reset_settle = settle;
        self
    }

    /// Variant learned from the last handshake (A01 before any)
    pub fn sub_revision(&self) -> SubRevision {
        self.sub_revision
    }

    fn brightness_frame(&self, percent: u8) -> Frame {
        let percent = u32::from(percent.min(100));
        let value = if self.sub_revision.has_dimming() {
            (percent * 255 / 100) as u8
        } else if percent == 0 {
            // 1 switches the backlight off
            1
        } else {
            0
        };
        Frame::new(frame(SET_BRIGHTNESS, &[value]).to_vec())
    }

    fn bitmap_frames(&self, bitmap: &Bitmap, orientation: Orientation) -> Vec<Frame> {
        let (width, height) = self.panel.logical(orientation);
        let reversed = orientation.is_reversed();

        chunk_windows(bitmap.rect(), 2, self.max_payload)
            .into_iter()
            .map(|window| {
                let local = Rect::new(
                    window.x - bitmap.x,
                    window.y - bitmap.y,
                    window.width,
                    window.height,
                );
                let target = if reversed {
                    window.rotated_180(width, height)
                } else {
                    window
                };

                let mut coords = Vec::with_capacity(8);
                for v in [target.x, target.y, target.right(), target.bottom()] {
                    coords.extend_from_slice(&(v as u16).to_be_bytes());
                }
                let mut bytes = frame(DISPLAY_BITMAP, &coords).to_vec();
                bytes.extend(encode_rgb565(&bitmap.image, local, Endian::Big, reversed));
                Frame::new(bytes)
            })
            .collect()
    }
}

impl Codec for RevisionB {
    fn revision(&self) -> &str {
        "B"
    }

    fn reset(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        // no reset command on this controller; forget the handshake and wait
        Ok(vec![Frame::settle(self.reset_settle)])
    }

    fn initialize_comm(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![
            Frame::new(frame(HELLO, HELLO_PAYLOAD).to_vec()).with_ack(FRAME_LEN)
        ])
    }

    fn clear(&self, state: &DeviceState) -> Result<Vec<Frame>> {
        let (width, height) = self.panel.logical(state.orientation);
        let white = Bitmap::new(0, 0, RgbImage::from_pixel(width, height, Rgb::WHITE.into()));
        Ok(self.bitmap_frames(&white, state.orientation))
    }

    fn screen_on(&self, state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![self.brightness_frame(state.brightness)])
    }

    fn screen_off(&self, _state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![self.brightness_frame(0)])
    }

    fn set_brightness(&self, percent: u8, _state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(vec![self.brightness_frame(percent)])
    }

    fn set_backplate_led_color(&self, color: Rgb, _state: &DeviceState) -> Result<Vec<Frame>> {
        if !self.sub_revision.has_led() {
            tracing::debug!(
                "Revision B {} has no backplate LED, ignoring color {}",
                self.sub_revision,
                color
            );
            return Ok(Vec::new());
        }
        Ok(vec![Frame::new(
            frame(SET_LIGHTING, &[color.r, color.g, color.b]).to_vec(),
        )])
    }

    fn set_orientation(
        &self,
        orientation: Orientation,
        _state: &DeviceState,
    ) -> Result<Vec<Frame>> {
        let mode = u8::from(orientation.is_landscape());
        Ok(vec![Frame::new(frame(SET_ORIENTATION, &[mode]).to_vec())])
    }

    fn display_bitmap(&self, bitmap: &Bitmap, state: &DeviceState) -> Result<Vec<Frame>> {
        Ok(self.bitmap_frames(bitmap, state.orientation))
    }

    fn accept_ack(
        &mut self,
        _frame: &Frame,
        response: &[u8],
        state: &mut DeviceState,
    ) -> Result<()> {
        let framed = response.len() == FRAME_LEN
            && response[0] == HELLO
            && response[FRAME_LEN - 1] == HELLO
            && &response[1..6] == HELLO_PAYLOAD;
        if !framed {
            return Err(TransportError::Desync {
                reason: format!("unexpected HELLO answer {:02X?}", response),
            }
            .into());
        }

        self.sub_revision = SubRevision::from_byte(response[6]);
        state.sub_revision = Some(self.sub_revision.to_string());
        tracing::info!("Revision B panel variant {}", self.sub_revision);
        Ok(())
    }
}
