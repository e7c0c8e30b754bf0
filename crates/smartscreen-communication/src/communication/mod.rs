//! Byte transport and command queue
//!
//! The [`Transport`] trait is the only thing the protocol layer knows about
//! the wire. [`serial::SerialTransport`] is the real implementation; tests
//! plug in recording mocks.

pub mod queue;
pub mod serial;

use smartscreen_core::Result;
use smartscreen_settings::DisplayConfig;
use std::time::Duration;

pub use queue::{CommandQueue, QueueItem, WorkerHandle, WorkerStats};
pub use serial::SerialTransport;

/// Serial connection parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// Port identifier (e.g. "/dev/ttyACM0", "COM3")
    pub port: String,
    pub baud_rate: u32,
    /// Read and write timeout
    pub timeout: Duration,
    /// RTS/CTS hardware flow control
    pub flow_control: bool,
}

impl ConnectionParams {
    /// Parameters for the panel described by `config`
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            port: config.port.clone(),
            baud_rate: config.baud_rate,
            timeout: config.io_timeout(),
            flow_control: true,
        }
    }
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            port: String::new(),
            baud_rate: 115_200,
            timeout: Duration::from_secs(1),
            flow_control: true,
        }
    }
}

/// Blocking byte channel to the panel
///
/// Only the display worker thread touches a transport.
pub trait Transport: Send {
    /// Write every byte of `data`
    fn write_all(&mut self, data: &[u8]) -> Result<()>;

    /// Read exactly `len` bytes, giving up after `timeout`
    fn read_exact(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>>;

    /// Open the port again (after a device reset re-enumerated it)
    fn reopen(&mut self) -> Result<()>;

    /// Release the port; a later write reopens it
    fn close(&mut self);

    /// Port identifier, for logs
    fn port_name(&self) -> &str;

    fn is_open(&self) -> bool;
}
