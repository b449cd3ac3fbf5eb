//! Outbound events from the IO service.
//!
//! Emitted through the [`EventSink`](super::ports::EventSink) port;
//! adapters decide where they go (CAN telemetry frames, serial log,
//! test recorder).

use super::commands::XpsCommand;

/// Telemetry-relevant happenings in the IO core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEvent {
    /// A command verb was applied to an output.
    CommandApplied { output: u8, command: XpsCommand },
    /// One or more pulses expired this pass; output state should be
    /// re-announced.
    PulsesExpired,
}
