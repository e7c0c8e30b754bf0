//! Panel commands and their wire encodings
//!
//! A [`Command`] is what producers queue. A [`Codec`] turns one command into
//! the [`Frame`]s a given controller revision understands; the worker writes
//! those frames one at a time.

pub mod chunking;
pub mod color;
pub mod rev_a;
pub mod rev_b;

use image::RgbImage;
use smartscreen_core::{Orientation, Rect, Result, Rgb};
use std::fmt;
use std::time::Duration;

pub use chunking::chunk_windows;
pub use rev_a::RevisionA;
pub use rev_b::{RevisionB, SubRevision};

/// Already-rasterized pixels and where they go, in logical coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub x: u32,
    pub y: u32,
    pub image: RgbImage,
}

impl Bitmap {
    pub fn new(x: u32, y: u32, image: RgbImage) -> Self {
        Self { x, y, image }
    }

    /// Window covered by the bitmap
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.image.width(), self.image.height())
    }
}

/// Operation carried by a [`Command`]
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    Reset,
    InitializeComm,
    Clear,
    ScreenOn,
    ScreenOff,
    /// Brightness in percent, already clamped to 0..=100
    SetBrightness(u8),
    SetLedColor(Rgb),
    SetOrientation(Orientation),
    DisplayBitmap(Bitmap),
    /// Rendered text, sent like a bitmap
    DisplayText(Bitmap),
    /// Rendered progress bar, sent like a bitmap
    DisplayProgressBar(Bitmap),
}

impl CommandKind {
    /// Short name used in logs
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::InitializeComm => "init",
            Self::Clear => "clear",
            Self::ScreenOn => "screen-on",
            Self::ScreenOff => "screen-off",
            Self::SetBrightness(_) => "set-brightness",
            Self::SetLedColor(_) => "set-led-color",
            Self::SetOrientation(_) => "set-orientation",
            Self::DisplayBitmap(_) => "display-bitmap",
            Self::DisplayText(_) => "display-text-bitmap",
            Self::DisplayProgressBar(_) => "display-progress-bar",
        }
    }

    /// Pixels to draw, for the three drawing operations
    pub fn bitmap(&self) -> Option<&Bitmap> {
        match self {
            Self::DisplayBitmap(b) | Self::DisplayText(b) | Self::DisplayProgressBar(b) => Some(b),
            _ => None,
        }
    }
}

/// A unit of work submitted to the queue
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Submission number, unique per display
    pub id: u64,
    pub kind: CommandKind,
}

impl Command {
    pub fn new(id: u64, kind: CommandKind) -> Self {
        Self { id, kind }
    }

    pub fn tag(&self) -> &'static str {
        self.kind.tag()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.id, self.tag())
    }
}

/// Best-effort mirror of the panel state
///
/// Written only by the display worker, after a command went through.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceState {
    /// Last brightness set, in percent
    pub brightness: u8,
    /// Screen on
    pub power: bool,
    pub orientation: Orientation,
    pub led: Rgb,
    /// Communication handshake done since the last reset
    pub initialized: bool,
    /// Hardware variant reported by the device, when it reports one
    pub sub_revision: Option<String>,
}

impl DeviceState {
    pub fn new(brightness: u8) -> Self {
        Self {
            brightness: brightness.min(100),
            power: true,
            orientation: Orientation::Portrait,
            led: Rgb::BLACK,
            initialized: false,
            sub_revision: None,
        }
    }

    /// Record the effect of a command that completed
    pub fn apply(&mut self, command: &Command) {
        match &command.kind {
            CommandKind::Reset => self.initialized = false,
            CommandKind::InitializeComm => self.initialized = true,
            CommandKind::ScreenOn => self.power = true,
            CommandKind::ScreenOff => self.power = false,
            CommandKind::SetBrightness(level) => self.brightness = *level,
            CommandKind::SetLedColor(color) => self.led = *color,
            CommandKind::SetOrientation(orientation) => self.orientation = *orientation,
            CommandKind::Clear
            | CommandKind::DisplayBitmap(_)
            | CommandKind::DisplayText(_)
            | CommandKind::DisplayProgressBar(_) => {}
        }
    }
}

impl Default for DeviceState {
    fn default() -> Self {
        Self::new(0)
    }
}

/// What the worker does once a frame is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum After {
    Continue,
    /// Wait before the next frame
    Settle(Duration),
    /// The device re-enumerates: close the port, wait, open it again
    Reconnect(Duration),
}

/// One self-contained message for the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Bytes to write; may be empty for pure delays
    pub bytes: Vec<u8>,
    /// Length of the answer to read back, if the device sends one
    pub ack: Option<usize>,
    pub after: After,
}

impl Frame {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            ack: None,
            after: After::Continue,
        }
    }

    /// Expect an answer of `len` bytes
    pub fn with_ack(mut self, len: usize) -> Self {
        self.ack = Some(len);
        self
    }

    pub fn then(mut self, after: After) -> Self {
        self.after = after;
        self
    }

    /// A frame that writes nothing and just waits
    pub fn settle(delay: Duration) -> Self {
        Self::new(Vec::new()).then(After::Settle(delay))
    }
}

/// Encoder for one controller revision
///
/// Codecs only ever run on the display worker, so they hold no locks. Each
/// capability sees the mirrored state as it was before the command.
pub trait Codec: Send {
    /// Revision name, for logs
    fn revision(&self) -> &str;

    fn reset(&self, state: &DeviceState) -> Result<Vec<Frame>>;

    /// Startup handshake; only called while the link is not initialized
    fn initialize_comm(&self, state: &DeviceState) -> Result<Vec<Frame>>;

    fn clear(&self, state: &DeviceState) -> Result<Vec<Frame>>;

    fn screen_on(&self, state: &DeviceState) -> Result<Vec<Frame>>;

    fn screen_off(&self, state: &DeviceState) -> Result<Vec<Frame>>;

    fn set_brightness(&self, percent: u8, state: &DeviceState) -> Result<Vec<Frame>>;

    /// Revisions without an RGB LED return no frames
    fn set_backplate_led_color(&self, color: Rgb, state: &DeviceState) -> Result<Vec<Frame>>;

    fn set_orientation(&self, orientation: Orientation, state: &DeviceState)
        -> Result<Vec<Frame>>;

    fn display_bitmap(&self, bitmap: &Bitmap, state: &DeviceState) -> Result<Vec<Frame>>;

    /// Check the answer to a frame that asked for one
    fn accept_ack(
        &mut self,
        _frame: &Frame,
        _response: &[u8],
        _state: &mut DeviceState,
    ) -> Result<()> {
        Ok(())
    }

    /// Frames for `command`
    fn encode(&self, command: &Command, state: &DeviceState) -> Result<Vec<Frame>> {
        match &command.kind {
            CommandKind::Reset => self.reset(state),
            CommandKind::InitializeComm if state.initialized => {
                tracing::debug!("{} link already initialized", self.revision());
                Ok(Vec::new())
            }
            CommandKind::InitializeComm => self.initialize_comm(state),
            CommandKind::Clear => self.clear(state),
            CommandKind::ScreenOn => self.screen_on(state),
            CommandKind::ScreenOff => self.screen_off(state),
            CommandKind::SetBrightness(level) => self.set_brightness((*level).min(100), state),
            CommandKind::SetLedColor(color) => self.set_backplate_led_color(*color, state),
            CommandKind::SetOrientation(orientation) => self.set_orientation(*orientation, state),
            CommandKind::DisplayBitmap(bitmap)
            | CommandKind::DisplayText(bitmap)
            | CommandKind::DisplayProgressBar(bitmap) => self.display_bitmap(bitmap, state),
        }
    }
}
