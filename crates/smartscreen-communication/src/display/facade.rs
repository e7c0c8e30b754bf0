//! Revision-independent drawing interface
//!
//! [`LcdDisplay`] is what the rest of the application draws through. Every
//! call validates its parameters, rasterizes text and bars on the calling
//! thread and queues the result; the display worker does the I/O. The
//! revision is picked once, in [`LcdDisplay::open`].

use crate::backend::{DisplayBackend, SimulatedBackend, WireBackend};
use crate::communication::{CommandQueue, ConnectionParams, SerialTransport, WorkerHandle};
use crate::protocol::{Bitmap, Command, CommandKind, DeviceState, RevisionA, RevisionB};
use image::{imageops, RgbImage};
use parking_lot::{Mutex, RwLock};
use smartscreen_core::{
    BarStyle, Orientation, PanelSize, ParameterError, Rect, RenderError, Result, Rgb, TextStyle,
};
use smartscreen_render::{ProgressBarRequest, Rasterizer, Rendered, TextRequest};
use smartscreen_settings::{DisplayConfig, Revision};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Pixels for [`LcdDisplay::display_bitmap`]
#[derive(Debug, Clone)]
pub enum BitmapSource {
    /// Image file, decoded on the calling thread
    Path(PathBuf),
    Image(RgbImage),
}

impl From<PathBuf> for BitmapSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<RgbImage> for BitmapSource {
    fn from(image: RgbImage) -> Self {
        Self::Image(image)
    }
}

/// Clamp any brightness request into 0..=100 percent
pub fn clamp_brightness(percent: i32) -> u8 {
    percent.clamp(0, 100) as u8
}

/// Drawing facade over one panel
pub struct LcdDisplay {
    panel: PanelSize,
    queue: Arc<CommandQueue>,
    worker: Mutex<Option<WorkerHandle>>,
    state: Arc<RwLock<DeviceState>>,
    rasterizer: Arc<dyn Rasterizer>,
    /// Last orientation request and its queue ticket
    orientation: Mutex<(Orientation, u64)>,
    next_id: AtomicU64,
    backend_name: String,
}

impl LcdDisplay {
    /// Build the display described by `config`
    ///
    /// Opens the serial port for hardware revisions; an unusable port is a
    /// configuration error.
    pub fn open(config: &DisplayConfig, rasterizer: Arc<dyn Rasterizer>) -> Result<Self> {
        let panel = config.panel();
        let max_payload = config.max_payload();
        let settle = config.reset_settle_ms.map(Duration::from_millis);

        let backend: Box<dyn DisplayBackend> = match config.revision {
            Revision::A => {
                let mut codec = RevisionA::new(panel, max_payload);
                if let Some(settle) = settle {
                    codec = codec.with_reset_settle(settle);
                }
                let transport = SerialTransport::open(ConnectionParams::from_config(config))?;
                Box::new(WireBackend::new(
                    Box::new(codec),
                    Box::new(transport),
                    config.ack_timeout(),
                ))
            }
            Revision::B => {
                let mut codec = RevisionB::new(panel, max_payload);
                if let Some(settle) = settle {
                    codec = codec.with_reset_settle(settle);
                }
                let transport = SerialTransport::open(ConnectionParams::from_config(config))?;
                Box::new(WireBackend::new(
                    Box::new(codec),
                    Box::new(transport),
                    config.ack_timeout(),
                ))
            }
            Revision::Simulated => {
                let mut backend = SimulatedBackend::new(panel, max_payload);
                if let Some(path) = &config.simulated_output {
                    backend = backend.with_output(path);
                }
                Box::new(backend)
            }
        };

        Self::with_backend(config, backend, rasterizer)
    }

    /// Build a display on top of any backend
    pub fn with_backend(
        config: &DisplayConfig,
        backend: Box<dyn DisplayBackend>,
        rasterizer: Arc<dyn Rasterizer>,
    ) -> Result<Self> {
        let backend_name = backend.name().to_string();
        let queue = Arc::new(CommandQueue::new(
            config.queue_capacity,
            config.enqueue_timeout(),
        ));
        let worker = WorkerHandle::spawn(
            Arc::clone(&queue),
            backend,
            DeviceState::new(config.brightness),
        )?;
        let state = worker.state_handle();
        tracing::info!(
            "Display ready: {} ({}x{})",
            backend_name,
            config.width,
            config.height
        );

        Ok(Self {
            panel: config.panel(),
            queue,
            worker: Mutex::new(Some(worker)),
            state,
            rasterizer,
            orientation: Mutex::new((Orientation::Portrait, 0)),
            next_id: AtomicU64::new(1),
            backend_name,
        })
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Native panel size
    pub fn panel(&self) -> PanelSize {
        self.panel
    }

    /// Orientation coordinates are checked against
    ///
    /// While a [`set_orientation`](Self::set_orientation) is still queued
    /// this is the requested orientation. Once the worker is through with
    /// it, the device mirror decides, so a rotation the panel never
    /// received is not assumed.
    pub fn orientation(&self) -> Orientation {
        let (requested, ticket) = *self.orientation.lock();
        if self.queue.is_done(ticket) {
            self.state.read().orientation
        } else {
            requested
        }
    }

    /// Addressable width and height in the current orientation
    pub fn logical_size(&self) -> (u32, u32) {
        self.panel.logical(self.orientation())
    }

    /// Last state mirrored by the worker
    pub fn device_state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Block until every queued command ran; `false` on timeout
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        self.queue.wait_idle(timeout)
    }

    /// Flush the queue and stop the worker; later calls fail with `Closed`
    pub fn shutdown(&self) {
        if let Some(mut worker) = self.worker.lock().take() {
            worker.stop();
            tracing::info!("Display {} shut down", self.backend_name);
        }
    }

    fn submit(&self, kind: CommandKind) -> Result<()> {
        self.submit_tracked(kind).map(|_| ())
    }

    /// Queue `kind` and return its queue ticket
    fn submit_tracked(&self, kind: CommandKind) -> Result<u64> {
        let command = Command::new(self.next_id.fetch_add(1, Ordering::Relaxed), kind);
        Ok(self.queue.enqueue(command)?)
    }

    fn rejected<T>(&self, operation: &str, err: ParameterError) -> Result<T> {
        tracing::warn!("{} rejected: {}", operation, err);
        Err(err.into())
    }

    /// Check that `(x, y)` lies on the panel and convert it
    fn origin(&self, x: i32, y: i32) -> std::result::Result<(u32, u32), ParameterError> {
        let (width, height) = self.logical_size();
        if x < 0 || y < 0 || x as u32 >= width || y as u32 >= height {
            return Err(ParameterError::OutOfBounds {
                x: i64::from(x),
                y: i64::from(y),
                panel_width: width,
                panel_height: height,
            });
        }
        Ok((x as u32, y as u32))
    }

    pub fn reset(&self) -> Result<()> {
        self.submit(CommandKind::Reset)
    }

    pub fn initialize_comm(&self) -> Result<()> {
        self.submit(CommandKind::InitializeComm)
    }

    pub fn clear(&self) -> Result<()> {
        self.submit(CommandKind::Clear)
    }

    pub fn screen_on(&self) -> Result<()> {
        self.submit(CommandKind::ScreenOn)
    }

    pub fn screen_off(&self) -> Result<()> {
        self.submit(CommandKind::ScreenOff)
    }

    /// Set the backlight; values outside 0..=100 are clamped
    pub fn set_brightness(&self, percent: i32) -> Result<()> {
        let level = clamp_brightness(percent);
        if i32::from(level) != percent {
            tracing::debug!("Brightness {} clamped to {}", percent, level);
        }
        self.submit(CommandKind::SetBrightness(level))
    }

    /// Set the backplate LED; ignored by panels without one
    pub fn set_backplate_led_color(&self, color: Rgb) -> Result<()> {
        self.submit(CommandKind::SetLedColor(color))
    }

    /// Rotate the panel; coordinates of later calls use the new axes
    pub fn set_orientation(&self, orientation: Orientation) -> Result<()> {
        let mut current = self.orientation.lock();
        let ticket = self.submit_tracked(CommandKind::SetOrientation(orientation))?;
        *current = (orientation, ticket);
        Ok(())
    }

    /// Draw an image with its top-left corner at `(x, y)`
    ///
    /// A `width` or `height` of 0 means the image's own size. The drawn area
    /// is cut at the panel edge.
    pub fn display_bitmap(
        &self,
        source: impl Into<BitmapSource>,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        if width < 0 || height < 0 {
            return self.rejected(
                "DisplayBitmap",
                ParameterError::InvalidSize {
                    width: i64::from(width),
                    height: i64::from(height),
                },
            );
        }
        let (x, y) = match self.origin(x, y) {
            Ok(origin) => origin,
            Err(e) => return self.rejected("DisplayBitmap", e),
        };

        let image = match source.into() {
            BitmapSource::Image(image) => image,
            BitmapSource::Path(path) => image::open(&path)
                .map_err(|e| RenderError::ImageLoad {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?
                .to_rgb8(),
        };

        let requested_width = if width == 0 { image.width() } else { width as u32 };
        let requested_height = if height == 0 { image.height() } else { height as u32 };
        let (panel_width, panel_height) = self.logical_size();
        let area = Rect::new(x, y, requested_width, requested_height)
            .intersect(&Rect::new(0, 0, panel_width, panel_height))
            .and_then(|r| r.intersect(&Rect::new(x, y, image.width(), image.height())));
        let Some(area) = area else {
            return self.rejected(
                "DisplayBitmap",
                ParameterError::InvalidSize {
                    width: i64::from(image.width()),
                    height: i64::from(image.height()),
                },
            );
        };

        let image = if area.width == image.width() && area.height == image.height() {
            image
        } else {
            imageops::crop_imm(&image, 0, 0, area.width, area.height).to_image()
        };
        self.submit(CommandKind::DisplayBitmap(Bitmap::new(x, y, image)))
    }

    /// Render `text` and draw it with its top-left corner at `(x, y)`
    pub fn display_text(&self, text: &str, x: i32, y: i32, style: &TextStyle) -> Result<()> {
        if text.is_empty() {
            return self.rejected("DisplayText", ParameterError::EmptyText);
        }
        if style.font_size == 0 {
            return self.rejected("DisplayText", ParameterError::InvalidFontSize);
        }
        let (x, y) = match self.origin(x, y) {
            Ok(origin) => origin,
            Err(e) => return self.rejected("DisplayText", e),
        };

        let request = TextRequest {
            text: text.to_string(),
            x,
            y,
            style: style.clone(),
        };
        let Rendered { x, y, image } = self.rasterizer.render_text(&request, self.logical_size())?;
        self.submit(CommandKind::DisplayText(Bitmap::new(x, y, image)))
    }

    /// Render and draw a progress bar; `value` is clamped to the range
    #[allow(clippy::too_many_arguments)]
    pub fn display_progress_bar(
        &self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        value: f64,
        min_value: f64,
        max_value: f64,
        style: &BarStyle,
    ) -> Result<()> {
        if width <= 0 || height <= 0 {
            return self.rejected(
                "DisplayProgressBar",
                ParameterError::InvalidSize {
                    width: i64::from(width),
                    height: i64::from(height),
                },
            );
        }
        let (ox, oy) = match self.origin(x, y) {
            Ok(origin) => origin,
            Err(e) => return self.rejected("DisplayProgressBar", e),
        };
        let (panel_width, panel_height) = self.logical_size();
        if i64::from(ox) + i64::from(width) > i64::from(panel_width)
            || i64::from(oy) + i64::from(height) > i64::from(panel_height)
        {
            return self.rejected(
                "DisplayProgressBar",
                ParameterError::Overflow {
                    x: i64::from(x),
                    y: i64::from(y),
                    width: i64::from(width),
                    height: i64::from(height),
                    panel_width,
                    panel_height,
                },
            );
        }
        if !(max_value > min_value) {
            return self.rejected(
                "DisplayProgressBar",
                ParameterError::InvalidRange {
                    min: min_value,
                    max: max_value,
                },
            );
        }

        let request = ProgressBarRequest {
            area: Rect::new(ox, oy, width as u32, height as u32),
            value,
            min_value,
            max_value,
            style: style.clone(),
        };
        let Rendered { x, y, image } = self.rasterizer.render_progress_bar(&request)?;
        self.submit(CommandKind::DisplayProgressBar(Bitmap::new(x, y, image)))
    }
}

impl Drop for LcdDisplay {
    fn drop(&mut self) {
        self.shutdown();
    }
}
