//! Where queued commands end up
//!
//! The display worker hands every command to one [`DisplayBackend`]:
//! either a codec writing to a serial transport ([`WireBackend`]) or an
//! in-memory canvas ([`SimulatedBackend`]).

pub mod simulated;
pub mod wire;

use crate::protocol::{Command, DeviceState};
use smartscreen_core::Result;

pub use simulated::{SimulatedBackend, SimulatedScreen};
pub use wire::WireBackend;

/// Executes commands on behalf of the display worker
pub trait DisplayBackend: Send {
    /// Name for logs
    fn name(&self) -> &str;

    /// Carry out `command`; `state` is the mirror as it was before it
    ///
    /// An error drops the command. The worker records the effect of the
    /// command in `state` only when this returns `Ok`.
    fn execute(&mut self, command: &Command, state: &mut DeviceState) -> Result<()>;

    /// Called once when the worker stops
    fn shutdown(&mut self) {}
}
