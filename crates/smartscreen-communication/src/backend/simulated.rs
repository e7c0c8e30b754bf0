//! In-memory panel
//!
//! Renders every command into an RGB canvas the size of the logical panel
//! instead of emitting bytes. Bitmaps go through the same chunking as the
//! hardware codecs, so the canvas shows exactly what a device would have
//! reassembled. The canvas can be mirrored to a PNG file after each draw.

use super::DisplayBackend;
use crate::protocol::{chunk_windows, Bitmap, Command, CommandKind, DeviceState};
use image::RgbImage;
use parking_lot::Mutex;
use smartscreen_core::{Orientation, PanelSize, Result, Rgb, TransportError};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
struct Screen {
    canvas: RgbImage,
    orientation: Orientation,
    history: Vec<(u64, &'static str)>,
}

/// Read-only view of a [`SimulatedBackend`], usable from any thread
#[derive(Debug, Clone)]
pub struct SimulatedScreen {
    inner: Arc<Mutex<Screen>>,
}

impl SimulatedScreen {
    /// Copy of the current canvas
    pub fn canvas(&self) -> RgbImage {
        self.inner.lock().canvas.clone()
    }

    /// Logical size of the canvas
    pub fn size(&self) -> (u32, u32) {
        self.inner.lock().canvas.dimensions()
    }

    pub fn orientation(&self) -> Orientation {
        self.inner.lock().orientation
    }

    /// `(id, tag)` of every command executed, in execution order
    pub fn history(&self) -> Vec<(u64, &'static str)> {
        self.inner.lock().history.clone()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        let screen = self.inner.lock();
        let (width, height) = screen.canvas.dimensions();
        (x < width && y < height).then(|| Rgb::from(*screen.canvas.get_pixel(x, y)))
    }
}

/// [`DisplayBackend`] drawing into memory
pub struct SimulatedBackend {
    panel: PanelSize,
    max_payload: usize,
    output: Option<PathBuf>,
    screen: SimulatedScreen,
}

impl SimulatedBackend {
    pub fn new(panel: PanelSize, max_payload: usize) -> Self {
        let (width, height) = panel.logical(Orientation::Portrait);
        let screen = Screen {
            canvas: blank(width, height),
            orientation: Orientation::Portrait,
            history: Vec::new(),
        };
        Self {
            panel,
            max_payload,
            output: None,
            screen: SimulatedScreen {
                inner: Arc::new(Mutex::new(screen)),
            },
        }
    }

    /// Save the canvas to `path` (PNG) after every drawing command
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Handle to inspect the canvas
    pub fn screen(&self) -> SimulatedScreen {
        self.screen.clone()
    }

    fn composite(&self, canvas: &mut RgbImage, bitmap: &Bitmap) {
        let (width, height) = canvas.dimensions();
        for window in chunk_windows(bitmap.rect(), 2, self.max_payload) {
            for y in window.y..window.y + window.height {
                for x in window.x..window.x + window.width {
                    if x >= width || y >= height {
                        continue;
                    }
                    let pixel = *bitmap.image.get_pixel(x - bitmap.x, y - bitmap.y);
                    canvas.put_pixel(x, y, pixel);
                }
            }
        }
    }

    fn save(&self, canvas: &RgbImage) -> Result<()> {
        let Some(path) = &self.output else {
            return Ok(());
        };
        canvas.save(path).map_err(|e| {
            TransportError::WriteFailed {
                port: path.display().to_string(),
                reason: e.to_string(),
            }
            .into()
        })
    }
}

fn blank(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb::WHITE.into())
}

impl DisplayBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn execute(&mut self, command: &Command, _state: &mut DeviceState) -> Result<()> {
        let inner = Arc::clone(&self.screen.inner);
        let mut screen = inner.lock();
        screen.history.push((command.id, command.tag()));

        match &command.kind {
            CommandKind::Clear => {
                screen.canvas.pixels_mut().for_each(|p| *p = Rgb::WHITE.into());
                self.save(&screen.canvas)
            }
            CommandKind::SetOrientation(orientation) => {
                let (width, height) = self.panel.logical(*orientation);
                screen.canvas = blank(width, height);
                screen.orientation = *orientation;
                tracing::debug!("Simulated panel is now {} ({}x{})", orientation, width, height);
                Ok(())
            }
            CommandKind::DisplayBitmap(bitmap)
            | CommandKind::DisplayText(bitmap)
            | CommandKind::DisplayProgressBar(bitmap) => {
                self.composite(&mut screen.canvas, bitmap);
                self.save(&screen.canvas)
            }
            CommandKind::Reset
            | CommandKind::InitializeComm
            | CommandKind::ScreenOn
            | CommandKind::ScreenOff
            | CommandKind::SetBrightness(_)
            | CommandKind::SetLedColor(_) => {
                tracing::trace!("Simulated panel recorded {}", command);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canvas_starts_white() {
        let backend = SimulatedBackend::new(PanelSize::new(4, 6), 8);
        assert_eq!(backend.screen().size(), (4, 6));
        assert_eq!(backend.screen().pixel(3, 5), Some(Rgb::WHITE));
        assert_eq!(backend.screen().pixel(4, 0), None);
    }

    #[test]
    fn test_orientation_recreates_canvas() {
        let mut backend = SimulatedBackend::new(PanelSize::new(4, 6), 8);
        let screen = backend.screen();
        let mut state = DeviceState::default();
        backend
            .execute(
                &Command::new(1, CommandKind::SetOrientation(Orientation::Landscape)),
                &mut state,
            )
            .unwrap();
        assert_eq!(screen.size(), (6, 4));
        assert_eq!(screen.history(), vec![(1, "set-orientation")]);
    }

    #[test]
    fn test_canvas_mirrored_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("screen.png");
        let mut backend = SimulatedBackend::new(PanelSize::new(4, 6), 8).with_output(&path);
        let bitmap = Bitmap::new(1, 1, RgbImage::from_pixel(2, 2, image::Rgb([0, 0, 0])));
        backend
            .execute(
                &Command::new(1, CommandKind::DisplayBitmap(bitmap)),
                &mut DeviceState::default(),
            )
            .unwrap();

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.get_pixel(1, 1).0, [0, 0, 0]);
        assert_eq!(saved.get_pixel(0, 0).0, [255, 255, 255]);
    }
}
