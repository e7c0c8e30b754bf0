mod common;

use common::{simulated_config, simulated_display, BlockRasterizer, IDLE};
use image::RgbImage;
use parking_lot::Mutex;
use smartscreen_communication::protocol::rev_a;
use smartscreen_communication::{LcdDisplay, RevisionA, Transport, WireBackend};
use smartscreen_core::{Orientation, PanelSize, QueueError, Result, TransportError};
use std::sync::Arc;
use std::time::Duration;

/// Records written frames; fails any frame carrying `fail_opcode`
#[derive(Clone)]
struct FlakyTransport {
    written: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_opcode: u8,
}

impl Transport for FlakyTransport {
    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if data.get(5) == Some(&self.fail_opcode) {
            return Err(TransportError::WriteFailed {
                port: "flaky".to_string(),
                reason: "cable pulled".to_string(),
            }
            .into());
        }
        self.written.lock().push(data.to_vec());
        Ok(())
    }

    fn read_exact(&mut self, _len: usize, timeout: Duration) -> Result<Vec<u8>> {
        Err(TransportError::AckTimeout {
            timeout_ms: timeout.as_millis() as u64,
        }
        .into())
    }

    fn reopen(&mut self) -> Result<()> {
        Ok(())
    }

    fn close(&mut self) {}

    fn port_name(&self) -> &str {
        "flaky"
    }

    fn is_open(&self) -> bool {
        true
    }
}

#[test]
fn test_commands_execute_in_submission_order() {
    let (lcd, screen, _) = simulated_display(&simulated_config());
    lcd.screen_on().unwrap();
    lcd.set_brightness(10).unwrap();
    lcd.clear().unwrap();
    assert!(lcd.wait_idle(IDLE));

    let history = screen.history();
    let tags: Vec<_> = history.iter().map(|(_, tag)| *tag).collect();
    assert_eq!(tags, vec!["screen-on", "set-brightness", "clear"]);
    assert!(history.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn test_concurrent_producers_never_interleave() {
    let (lcd, screen, _) = simulated_display(&simulated_config());
    let lcd = Arc::new(lcd);

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let lcd = Arc::clone(&lcd);
            std::thread::spawn(move || {
                for _ in 0..10 {
                    lcd.screen_on().unwrap();
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }
    assert!(lcd.wait_idle(IDLE));

    let history = screen.history();
    assert_eq!(history.len(), 40);
    // ids are handed out at submission, so execution order is id order
    assert!(history.windows(2).all(|w| w[0].0 < w[1].0));
}

#[test]
fn test_failed_command_is_dropped_and_next_one_runs() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let transport = FlakyTransport {
        written: Arc::clone(&written),
        fail_opcode: rev_a::SET_BRIGHTNESS,
    };
    let config = simulated_config();
    let backend = WireBackend::new(
        Box::new(RevisionA::new(PanelSize::default(), 2560)),
        Box::new(transport),
        Duration::from_millis(10),
    );
    let lcd =
        LcdDisplay::with_backend(&config, Box::new(backend), Arc::new(BlockRasterizer::default()))
            .unwrap();

    lcd.screen_on().unwrap(); // A
    lcd.set_brightness(80).unwrap(); // B, fails on the wire
    lcd.screen_off().unwrap(); // C
    assert!(lcd.wait_idle(IDLE));

    let opcodes: Vec<u8> = written.lock().iter().map(|frame| frame[5]).collect();
    assert_eq!(opcodes, vec![rev_a::SCREEN_ON, rev_a::SCREEN_OFF]);

    let state = lcd.device_state();
    // B never reached the panel, so the mirror keeps the configured level
    assert_eq!(state.brightness, config.brightness);
    assert!(!state.power);
}

#[test]
fn test_failed_rotation_keeps_old_coordinate_space() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let transport = FlakyTransport {
        written: Arc::clone(&written),
        fail_opcode: rev_a::SET_ORIENTATION,
    };
    let config = simulated_config();
    let backend = WireBackend::new(
        Box::new(RevisionA::new(PanelSize::default(), 2560)),
        Box::new(transport),
        Duration::from_millis(10),
    );
    let lcd =
        LcdDisplay::with_backend(&config, Box::new(backend), Arc::new(BlockRasterizer::default()))
            .unwrap();

    lcd.set_orientation(Orientation::Landscape).unwrap();
    assert!(lcd.wait_idle(IDLE));
    assert_eq!(lcd.device_state().orientation, Orientation::Portrait);
    assert_eq!(lcd.orientation(), Orientation::Portrait);
    assert_eq!(lcd.logical_size(), (320, 480));

    // x = 400 only exists in landscape
    let err = lcd
        .display_bitmap(RgbImage::new(8, 8), 400, 0, 0, 0)
        .unwrap_err();
    assert!(err.is_parameter_error());
    assert!(lcd.wait_idle(IDLE));
    assert!(written.lock().is_empty());
}

#[test]
fn test_queued_rotation_applies_to_later_calls() {
    let (lcd, screen, _) = simulated_display(&simulated_config());
    lcd.set_orientation(Orientation::Landscape).unwrap();
    // accepted right away, before the worker got to the rotation
    lcd.display_bitmap(RgbImage::new(8, 8), 400, 0, 0, 0)
        .unwrap();
    assert!(lcd.wait_idle(IDLE));
    assert_eq!(lcd.orientation(), Orientation::Landscape);
    assert_eq!(screen.history().len(), 2);
}

#[test]
fn test_shutdown_flushes_then_rejects() {
    let (lcd, screen, _) = simulated_display(&simulated_config());
    for _ in 0..5 {
        lcd.screen_on().unwrap();
    }
    lcd.set_brightness(55).unwrap();
    lcd.shutdown();
    assert_eq!(screen.history().len(), 6);
    // the last mirrored state outlives the worker
    assert_eq!(lcd.device_state().brightness, 55);

    let err = lcd.screen_off().unwrap_err();
    assert!(matches!(
        err,
        smartscreen_core::Error::Queue(QueueError::Closed)
    ));
}
