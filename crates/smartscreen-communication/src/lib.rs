//! # SmartScreen Communication
//!
//! Everything between a drawing call and the bytes on the serial line:
//! the serial transport, the single-writer command queue, the revision A
//! and revision B codecs, the simulated panel and the [`LcdDisplay`]
//! facade that ties them together.

pub mod backend;
pub mod communication;
pub mod display;
pub mod protocol;

pub use backend::{DisplayBackend, SimulatedBackend, SimulatedScreen, WireBackend};
pub use communication::{
    CommandQueue, ConnectionParams, QueueItem, SerialTransport, Transport, WorkerHandle,
    WorkerStats,
};
pub use display::{clamp_brightness, BitmapSource, DisplayManager, LcdDisplay};
pub use protocol::{
    chunk_windows, After, Bitmap, Codec, Command, CommandKind, DeviceState, Frame, RevisionA,
    RevisionB, SubRevision,
};
