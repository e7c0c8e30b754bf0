//! Serial port transport
//!
//! Opens the panel's USB CDC port through the `serialport` crate with
//! hardware flow control. A write on a closed port reopens it first, so a
//! reset that failed to reconnect does not wedge every later command.

use super::{ConnectionParams, Transport};
use serialport::SerialPort;
use smartscreen_core::{ConfigError, Result, TransportError};
use std::io::{self, Read, Write};
use std::time::{Duration, Instant};

/// [`Transport`] over a real serial port
pub struct SerialTransport {
    params: ConnectionParams,
    port: Option<Box<dyn SerialPort>>,
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("params", &self.params)
            .field("open", &self.port.is_some())
            .finish()
    }
}

fn open_port(params: &ConnectionParams) -> std::result::Result<Box<dyn SerialPort>, ConfigError> {
    if params.port.trim().is_empty() {
        return Err(ConfigError::InvalidPort {
            port: params.port.clone(),
            reason: "no port configured".to_string(),
        });
    }

    serialport::new(&params.port, params.baud_rate)
        .timeout(params.timeout)
        .flow_control(if params.flow_control {
            serialport::FlowControl::Hardware
        } else {
            serialport::FlowControl::None
        })
        .open()
        .map_err(|e| {
            tracing::warn!("Failed to open serial port {}: {}", params.port, e);
            ConfigError::InvalidPort {
                port: params.port.clone(),
                reason: e.to_string(),
            }
        })
}

impl SerialTransport {
    /// Open the port described by `params`
    ///
    /// An empty port name or a port that cannot be opened is a configuration
    /// error.
    pub fn open(params: ConnectionParams) -> Result<Self> {
        let port = open_port(&params)?;
        tracing::info!(
            "Opened serial port {} at {} baud",
            params.port,
            params.baud_rate
        );
        Ok(Self {
            params,
            port: Some(port),
        })
    }

    pub fn params(&self) -> &ConnectionParams {
        &self.params
    }

    fn write_failed(&self, e: impl std::fmt::Display) -> TransportError {
        TransportError::WriteFailed {
            port: self.params.port.clone(),
            reason: e.to_string(),
        }
    }
}

impl Transport for SerialTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.port.is_none() {
            tracing::debug!("Port {} is closed, reopening before write", self.params.port);
            self.reopen()?;
        }
        let Some(port) = self.port.as_mut() else {
            return Err(TransportError::NotOpen {
                port: self.params.port.clone(),
            }
            .into());
        };

        if let Err(e) = port.write_all(data).and_then(|_| port.flush()) {
            let err = self.write_failed(e);
            // next write goes through a fresh open
            self.port = None;
            return Err(err.into());
        }
        Ok(())
    }

    fn read_exact(&mut self, len: usize, timeout: Duration) -> Result<Vec<u8>> {
        let port_name = self.params.port.clone();
        let port = self
            .port
            .as_mut()
            .ok_or(TransportError::NotOpen { port: port_name.clone() })?;

        let deadline = Instant::now() + timeout;
        let mut buf = vec![0u8; len];
        let mut filled = 0;

        while filled < len {
            match port.read(&mut buf[filled..]) {
                Ok(0) => {}
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    return Err(TransportError::ReadFailed {
                        port: port_name,
                        reason: e.to_string(),
                    }
                    .into())
                }
            }
            if filled < len && Instant::now() >= deadline {
                return Err(TransportError::AckTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into());
            }
        }
        Ok(buf)
    }

    fn reopen(&mut self) -> Result<()> {
        self.port = None;
        let port = open_port(&self.params).map_err(|_| TransportError::NotOpen {
            port: self.params.port.clone(),
        })?;
        self.port = Some(port);
        tracing::info!("Reopened serial port {}", self.params.port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::debug!("Closed serial port {}", self.params.port);
        }
    }

    fn port_name(&self) -> &str {
        &self.params.port
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }
}
