//! Inbound commands to the IO service.
//!
//! The protocol layer decodes bus frames into these already-typed values;
//! the core never sees raw frames.

/// Digital command verbs applied to one output context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpsCommand {
    /// Drive the output high now.
    SetOn,
    /// Drive the output low now.
    SetOff,
    /// Invert the output now.
    Toggle,
    /// Drive high now, restore low after the command's duration.
    PulseOn,
    /// Drive low now, restore high after the command's duration.
    PulseOff,
    /// Stop a running pulse and restore its reset level.
    PulseCancel,
    /// Cancel any pulse and return to the configured idle level.
    Reset,
}

/// A decoded command addressed to one logical output.
#[derive(Debug, Clone, Copy)]
pub struct OutputCommand {
    /// Index into the board output table.
    pub output: u8,
    pub command: XpsCommand,
    /// Pulse duration; ignored by the immediate verbs.
    pub duration_ms: u32,
}
