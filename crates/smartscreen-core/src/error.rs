//! Error handling for SmartScreen
//!
//! Provides error types for every layer of the display pipeline:
//! - Configuration errors (fatal at construction)
//! - Parameter errors (a drawing call is rejected before encoding)
//! - Transport errors (a queued command is dropped, the worker continues)
//! - Queue errors (backpressure and shutdown)
//! - Render errors (font or background image could not be produced)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Configuration error type
///
/// Raised while building the display from configuration. The process is
/// expected to stop before entering its refresh loop.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Revision selector is not one of the supported panels
    #[error("Unknown display revision '{revision}'")]
    UnknownRevision {
        /// The revision string found in the configuration.
        revision: String,
    },

    /// Serial port could not be used
    #[error("Invalid port '{port}': {reason}")]
    InvalidPort {
        /// The configured port identifier.
        port: String,
        /// Why the port was rejected.
        reason: String,
    },

    /// A configuration value is invalid
    #[error("Invalid configuration value '{key}': {reason}")]
    InvalidValue {
        /// The offending key.
        key: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Configuration or theme file could not be loaded
    #[error("Failed to load {path}: {reason}")]
    LoadFailed {
        /// The file that failed to load.
        path: String,
        /// The underlying reason.
        reason: String,
    },
}

/// Parameter error type
///
/// A drawing call was given values that cannot be encoded. Nothing is queued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// Width or height is zero or negative
    #[error("Invalid size {width}x{height}")]
    InvalidSize {
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
    },

    /// Origin lies outside the addressable panel area
    #[error("Position ({x}, {y}) outside panel {panel_width}x{panel_height}")]
    OutOfBounds {
        /// Requested x.
        x: i64,
        /// Requested y.
        y: i64,
        /// Logical panel width.
        panel_width: u32,
        /// Logical panel height.
        panel_height: u32,
    },

    /// Rectangle extends past the panel edge where clipping is not allowed
    #[error("Area {width}x{height} at ({x}, {y}) overflows panel {panel_width}x{panel_height}")]
    Overflow {
        /// Requested x.
        x: i64,
        /// Requested y.
        y: i64,
        /// Requested width.
        width: i64,
        /// Requested height.
        height: i64,
        /// Logical panel width.
        panel_width: u32,
        /// Logical panel height.
        panel_height: u32,
    },

    /// Min/max range of a progress bar is empty
    #[error("Invalid range: min {min} must be lower than max {max}")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },

    /// Text to display is empty
    #[error("Text must not be empty")]
    EmptyText,

    /// Font size is zero
    #[error("Font size must be > 0")]
    InvalidFontSize,
}

/// Transport error type
///
/// Raised on the worker while writing a command to the panel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Port is closed
    #[error("Port {port} is not open")]
    NotOpen {
        /// The port identifier.
        port: String,
    },

    /// Writing to the port failed
    #[error("Write to {port} failed: {reason}")]
    WriteFailed {
        /// The port identifier.
        port: String,
        /// The underlying reason.
        reason: String,
    },

    /// Reading from the port failed
    #[error("Read from {port} failed: {reason}")]
    ReadFailed {
        /// The port identifier.
        port: String,
        /// The underlying reason.
        reason: String,
    },

    /// The device did not answer in time
    #[error("Acknowledgement timeout after {timeout_ms}ms")]
    AckTimeout {
        /// The timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The device answered something the protocol does not expect
    #[error("Protocol desync: {reason}")]
    Desync {
        /// What was wrong with the answer.
        reason: String,
    },
}

/// Queue error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    /// The queue stayed full for the whole enqueue wait
    #[error("Command queue full (capacity {capacity}) after {timeout_ms}ms")]
    Full {
        /// Queue capacity.
        capacity: usize,
        /// How long the producer waited.
        timeout_ms: u64,
    },

    /// The queue no longer accepts commands
    #[error("Command queue is closed")]
    Closed,
}

/// Render error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Font file missing or unreadable
    #[error("Failed to load font {font}: {reason}")]
    FontLoad {
        /// Font path as configured.
        font: String,
        /// The underlying reason.
        reason: String,
    },

    /// Image file missing or unreadable
    #[error("Failed to load image {path}: {reason}")]
    ImageLoad {
        /// Image path.
        path: String,
        /// The underlying reason.
        reason: String,
    },

    /// Rendered area is empty after clipping to the panel
    #[error("Nothing to draw: {reason}")]
    Empty {
        /// Why nothing was produced.
        reason: String,
    },
}

/// Main error type for SmartScreen
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Parameter error
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Transport error
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Queue error
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Render error
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Check if this is a parameter error
    pub fn is_parameter_error(&self) -> bool {
        matches!(self, Error::Parameter(_))
    }

    /// Check if this is a transport error
    pub fn is_transport_error(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Io(_))
    }

    /// Check if this is a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::Transport(TransportError::AckTimeout { .. })
                | Error::Queue(QueueError::Full { .. })
        )
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
