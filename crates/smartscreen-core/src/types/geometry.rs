//! Panel geometry: orientation, panel size and addressing rectangles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical orientation of the panel
///
/// The discriminant is the code Revision A panels expect in their
/// orientation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Natural orientation, USB connector at the bottom
    #[default]
    Portrait = 0,
    /// Portrait rotated by 180°
    ReversePortrait = 1,
    /// Rotated by 90°
    Landscape = 2,
    /// Landscape rotated by 180°
    ReverseLandscape = 3,
}

impl Orientation {
    /// Whether width and height are exchanged relative to the native panel
    pub fn is_landscape(self) -> bool {
        matches!(self, Self::Landscape | Self::ReverseLandscape)
    }

    /// Whether this is one of the 180° rotated variants
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::ReversePortrait | Self::ReverseLandscape)
    }

    /// Code used on the wire by panels that rotate in hardware
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::ReversePortrait => write!(f, "reverse_portrait"),
            Self::Landscape => write!(f, "landscape"),
            Self::ReverseLandscape => write!(f, "reverse_landscape"),
        }
    }
}

/// Native (portrait) pixel size of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSize {
    /// Native width in pixels
    pub width: u32,
    /// Native height in pixels
    pub height: u32,
}

impl PanelSize {
    /// Create a panel size from its native dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Addressable width × height once `orientation` is applied
    pub fn logical(self, orientation: Orientation) -> (u32, u32) {
        if orientation.is_landscape() {
            (self.height, self.width)
        } else {
            (self.width, self.height)
        }
    }

    /// Rectangle covering the whole panel in `orientation`
    pub fn full_rect(self, orientation: Orientation) -> Rect {
        let (width, height) = self.logical(orientation);
        Rect::new(0, 0, width, height)
    }
}

impl Default for PanelSize {
    fn default() -> Self {
        Self::new(320, 480)
    }
}

/// An axis-aligned pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Create a rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive right edge (`x + width - 1`)
    pub fn right(&self) -> u32 {
        self.x + self.width.saturating_sub(1)
    }

    /// Inclusive bottom edge (`y + height - 1`)
    pub fn bottom(&self) -> u32 {
        self.y + self.height.saturating_sub(1)
    }

    /// Number of pixels covered
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Whether the rectangle covers no pixel
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `(px, py)` lies inside the rectangle
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && py >= self.y && px < self.x + self.width && py < self.y + self.height
    }

    /// Intersection with another rectangle, `None` when they do not overlap
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width).min(other.x + other.width);
        let y1 = (self.y + self.height).min(other.y + other.height);
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Rect::new(x0, y0, x1 - x0, y1 - y0))
    }

    /// The rectangle mirrored through the centre of a `width` × `height` area
    ///
    /// Used to emulate 180° rotation on panels that only rotate by 90°.
    pub fn rotated_180(&self, width: u32, height: u32) -> Rect {
        Rect::new(
            width.saturating_sub(self.x + self.width),
            height.saturating_sub(self.y + self.height),
            self.width,
            self.height,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}@({},{})", self.width, self.height, self.x, self.y)
    }
}
