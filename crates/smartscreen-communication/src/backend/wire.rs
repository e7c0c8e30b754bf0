//! Codec + transport backend.

use super::DisplayBackend;
use crate::communication::Transport;
use crate::protocol::{After, Codec, Command, DeviceState, Frame};
use smartscreen_core::Result;
use std::time::Duration;

/// Encodes commands with a revision codec and writes them to a transport
pub struct WireBackend {
    name: String,
    codec: Box<dyn Codec>,
    transport: Box<dyn Transport>,
    ack_timeout: Duration,
}

impl WireBackend {
    pub fn new(codec: Box<dyn Codec>, transport: Box<dyn Transport>, ack_timeout: Duration) -> Self {
        let name = format!("revision {} on {}", codec.revision(), transport.port_name());
        Self {
            name,
            codec,
            transport,
            ack_timeout,
        }
    }

    fn send_frame(&mut self, frame: &Frame, state: &mut DeviceState) -> Result<()> {
        if !frame.bytes.is_empty() {
            self.transport.write_all(&frame.bytes)?;
        }
        if let Some(len) = frame.ack {
            let response = self.transport.read_exact(len, self.ack_timeout)?;
            self.codec.accept_ack(frame, &response, state)?;
        }
        Ok(())
    }
}

impl DisplayBackend for WireBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&mut self, command: &Command, state: &mut DeviceState) -> Result<()> {
        let frames = self.codec.encode(command, state)?;
        let total = frames.len();

        for (index, frame) in frames.iter().enumerate() {
            let sent = self.send_frame(frame, state);

            if let Err(e) = sent {
                if total > 1 {
                    tracing::warn!(
                        "Command {} failed at frame {}/{}, abandoning the rest",
                        command,
                        index + 1,
                        total
                    );
                }
                return Err(e);
            }

            match frame.after {
                After::Continue => {}
                After::Settle(delay) => {
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                }
                After::Reconnect(delay) => {
                    tracing::info!(
                        "Waiting {:?} for {} to come back",
                        delay,
                        self.transport.port_name()
                    );
                    self.transport.close();
                    std::thread::sleep(delay);
                    self.transport.reopen()?;
                }
            }
        }

        tracing::trace!("Command {} sent in {} frame(s)", command, total);
        Ok(())
    }

    fn shutdown(&mut self) {
        self.transport.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{CommandKind, RevisionA, RevisionB};
    use parking_lot::Mutex;
    use smartscreen_core::{PanelSize, TransportError};
    use std::collections::VecDeque;
    use std::sync::Arc;

    #[derive(Default)]
    struct Wire {
        written: Vec<Vec<u8>>,
        answers: VecDeque<Vec<u8>>,
        fail_after: Option<usize>,
        reopened: usize,
    }

    #[derive(Clone, Default)]
    struct MockTransport(Arc<Mutex<Wire>>);

    impl Transport for MockTransport {
        fn write_all(&mut self, data: &[u8]) -> Result<()> {
            let mut wire = self.0.lock();
            if wire.fail_after == Some(wire.written.len()) {
                return Err(TransportError::WriteFailed {
                    port: "mock".to_string(),
                    reason: "unplugged".to_string(),
                }
                .into());
            }
            wire.written.push(data.to_vec());
            Ok(())
        }

        fn read_exact(&mut self, _len: usize, timeout: Duration) -> Result<Vec<u8>> {
            self.0.lock().answers.pop_front().ok_or_else(|| {
                TransportError::AckTimeout {
                    timeout_ms: timeout.as_millis() as u64,
                }
                .into()
            })
        }

        fn reopen(&mut self) -> Result<()> {
            self.0.lock().reopened += 1;
            Ok(())
        }

        fn close(&mut self) {}

        fn port_name(&self) -> &str {
            "mock"
        }

        fn is_open(&self) -> bool {
            true
        }
    }

    fn backend(codec: Box<dyn Codec>, transport: &MockTransport) -> WireBackend {
        WireBackend::new(codec, Box::new(transport.clone()), Duration::from_millis(5))
    }

    #[test]
    fn test_chunked_bitmap_stops_at_first_failure() {
        let transport = MockTransport::default();
        transport.0.lock().fail_after = Some(1);
        let codec = RevisionA::new(PanelSize::default(), 640);
        let mut backend = backend(Box::new(codec), &transport);

        let image = image::RgbImage::new(320, 3);
        let command = Command::new(
            1,
            CommandKind::DisplayBitmap(crate::protocol::Bitmap::new(0, 0, image)),
        );
        assert!(backend
            .execute(&command, &mut DeviceState::default())
            .is_err());
        // first band went out, the other two were abandoned
        assert_eq!(transport.0.lock().written.len(), 1);
    }

    #[test]
    fn test_missing_hello_answer_times_out() {
        let transport = MockTransport::default();
        let mut backend = backend(
            Box::new(RevisionB::new(PanelSize::default(), 2560)),
            &transport,
        );
        let err = backend
            .execute(
                &Command::new(1, CommandKind::InitializeComm),
                &mut DeviceState::default(),
            )
            .unwrap_err();
        assert!(err.is_timeout());
    }

    #[test]
    fn test_hello_answer_updates_state() {
        let transport = MockTransport::default();
        let mut answer = vec![0xCA, b'H', b'E', b'L', b'L', b'O', 0x0C, 0, 0, 0xCA];
        transport.0.lock().answers.push_back(answer.clone());
        let mut backend = backend(
            Box::new(RevisionB::new(PanelSize::default(), 2560)),
            &transport,
        );
        let mut state = DeviceState::default();
        backend
            .execute(&Command::new(1, CommandKind::InitializeComm), &mut state)
            .unwrap();
        assert_eq!(state.sub_revision.as_deref(), Some("A11"));

        // once initialized the handshake is skipped
        state.initialized = true;
        answer[6] = 0x0A;
        transport.0.lock().answers.push_back(answer);
        backend
            .execute(&Command::new(2, CommandKind::InitializeComm), &mut state)
            .unwrap();
        assert_eq!(transport.0.lock().written.len(), 1);
    }

    #[test]
    fn test_reset_reopens_port() {
        let transport = MockTransport::default();
        let codec = RevisionA::new(PanelSize::default(), 2560).with_reset_settle(Duration::ZERO);
        let mut backend = backend(Box::new(codec), &transport);
        backend
            .execute(&Command::new(1, CommandKind::Reset), &mut DeviceState::default())
            .unwrap();
        assert_eq!(transport.0.lock().reopened, 1);
    }
}
