use crate::error::Result;
use crate::types::{Direction, LauncherId};
use std::time::Duration;

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

/// A single instruction for the physical device layer. `Fire` and `Reset`
/// block for a device-fixed delay inside the transport; `Move` blocks for
/// the caller-specified duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction, Duration),
    Stop,
    Fire,
    Reset,
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// Seam to the physical actuation layer (USB control transfers in the
/// reference hardware). The core only ever drives it through this trait;
/// a failed send is an `ActuationFault` carrying the device's report.
pub trait Transport {
    /// How many launcher devices are attached right now.
    fn device_count(&self) -> usize;

    /// Send one blocking command to the device backing `id`.
    fn send(&self, id: LauncherId, command: Command) -> Result<()>;
}

// ---------------------------------------------------------------------------
// NoopTransport
// ---------------------------------------------------------------------------

/// Transport with no hardware behind it: reports a fixed device count,
/// accepts every command, applies no delays. Used when running without the
/// launcher rig attached.
#[derive(Debug, Clone)]
pub struct NoopTransport {
    pub devices: usize,
}

impl NoopTransport {
    pub fn new(devices: usize) -> Self {
        Self { devices }
    }
}

impl Transport for NoopTransport {
    fn device_count(&self) -> usize {
        self.devices
    }

    fn send(&self, id: LauncherId, command: Command) -> Result<()> {
        tracing::debug!(launcher = id.0, ?command, "noop transport");
        Ok(())
    }
}
