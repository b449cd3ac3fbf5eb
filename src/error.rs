//! Unified error types for the relaynode IO core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! command-handling path's error handling uniform. All variants are `Copy`
//! so they can be passed back through the protocol layer without
//! allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the IO core funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The pin descriptor is reserved on this board variant, or a pulse
    /// verb was requested in a build without pulse support.
    NotSupported,
    /// The pulse pool has no free record.
    ResourceExhausted,
    /// An I2C transaction failed.
    Bus(BusError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotSupported => write!(f, "not supported"),
            Self::ResourceExhausted => write!(f, "pulse pool exhausted"),
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// I2C bus faults
// ---------------------------------------------------------------------------

/// Fault taxonomy surfaced by the I2C port. Never retried inside the core;
/// a persistent bus fault is a hardware problem for the caller to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// The device did not acknowledge its address or a data byte.
    NoAcknowledge,
    /// Bus-level fault (stuck line, lost arbitration).
    Bus,
    /// Anything the underlying peripheral cannot classify.
    Other,
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAcknowledge => write!(f, "no acknowledge"),
            Self::Bus => write!(f, "bus fault"),
            Self::Other => write!(f, "unclassified fault"),
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
