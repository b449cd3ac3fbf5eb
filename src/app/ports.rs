//! Port traits — the boundary between the IO core and the hardware.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ IoService (domain)
//! ```
//!
//! Driven adapters (register-level GPIO, the I2C peripheral, the event
//! sink) implement these traits. The core consumes them via generics, so
//! the dispatcher and the pulse scheduler never touch hardware directly
//! and the whole engine runs on the host against simulation adapters.

use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Native GPIO port (driven adapter: domain → registers)
// ───────────────────────────────────────────────────────────────

/// Direction of an IO line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Input,
    Output,
}

/// Register-level access to the microcontroller's own ports.
///
/// `port` is the native port index (0 = A .. 7 = H), `pin` the bit within
/// it. Register writes cannot fail, so the operations are infallible.
pub trait GpioPort {
    /// Program direction, then drive the output latch.
    fn init(&mut self, port: u8, pin: u8, direction: Direction, state: bool);

    /// Drive the output latch.
    fn write(&mut self, port: u8, pin: u8, state: bool);

    /// Read the input register bit.
    fn read(&mut self, port: u8, pin: u8) -> bool;

    /// Invert the output latch. Implementations use the hardware toggle
    /// register where the part has one, read-invert-write otherwise.
    fn toggle(&mut self, port: u8, pin: u8);

    /// Program the direction register only.
    fn set_direction(&mut self, port: u8, pin: u8, direction: Direction);
}

// ───────────────────────────────────────────────────────────────
// I2C port (driven adapter: domain → bus peripheral)
// ───────────────────────────────────────────────────────────────

/// Raw I2C transactions for the extended-IO expanders.
///
/// Callers must own the bus from a single cooperative thread; the port
/// does not serialize access itself. Faults are surfaced, never retried.
pub trait I2cPort {
    /// Write `bytes` to the device at 7-bit address `addr`.
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError>;

    /// Fill `buf` from the device at 7-bit address `addr`.
    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → telemetry)
// ───────────────────────────────────────────────────────────────

/// The core emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go (CAN telemetry,
/// serial log, test recorder).
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
