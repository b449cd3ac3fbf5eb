//! I2C port-expander shadow driver.
//!
//! The expander (PCF8574 class) has no per-pin write: every transaction
//! rewrites all eight quasi-bidirectional lines. The driver therefore
//! keeps a `shadow` byte mirroring the last intended output state and
//! flushes the whole byte on any single-pin mutation.
//!
//! "Input" direction is emulated: the shadow bit is forced high so the
//! chip's weak pull-up lets an external open-drain driver pull the line
//! low. Reading returns the true line level for such pins and the last
//! driven level for outputs.
//!
//! ## Failure mode
//!
//! A bus fault during a flush leaves `shadow` at the *attempted* value —
//! no rollback. The next successful flush resynchronizes the chip.
//! Persistent faults are a hardware problem; the driver never retries.
//!
//! ## Read cache
//!
//! With `buffered_read` enabled, reads are served from a one-slot cache
//! until [`invalidate`](ExtioDevice::invalidate) is called. The expander's
//! change-notify interrupt line owns that contract: the ISR signals the
//! owning thread (see [`crate::events`]), which invalidates before its
//! next read. Invalidation is explicit, never automatic.

use log::debug;

use crate::app::ports::{Direction, I2cPort};
use crate::error::BusError;

/// Driver state for one expander chip.
pub struct ExtioDevice {
    addr: u8,
    shadow: u8,
    cached_read: Option<u8>,
    buffered_read: bool,
}

impl ExtioDevice {
    /// New device at 7-bit `addr`. The shadow starts all-low; the board
    /// bring-up decides what actually gets driven first.
    pub fn new(addr: u8, buffered_read: bool) -> Self {
        Self {
            addr,
            shadow: 0,
            cached_read: None,
            buffered_read,
        }
    }

    /// The expander's bus address.
    pub fn addr(&self) -> u8 {
        self.addr
    }

    /// Last intended output byte.
    pub fn shadow(&self) -> u8 {
        self.shadow
    }

    /// Drive one pin.
    pub fn write_pin(&mut self, bus: &mut impl I2cPort, pin: u8, state: bool) -> Result<(), BusError> {
        if state {
            self.shadow |= 1 << pin;
        } else {
            self.shadow &= !(1 << pin);
        }
        debug!("extio 0x{:02x}: write pin {} state {}", self.addr, pin, state);
        self.flush(bus)
    }

    /// Invert one pin.
    pub fn toggle_pin(&mut self, bus: &mut impl I2cPort, pin: u8) -> Result<(), BusError> {
        self.shadow ^= 1 << pin;
        self.flush(bus)
    }

    /// Update several pins in one transaction: bits of `value` selected by
    /// `mask` replace the corresponding shadow bits.
    pub fn write_mask(&mut self, bus: &mut impl I2cPort, mask: u8, value: u8) -> Result<(), BusError> {
        self.shadow = (self.shadow & !mask) | (value & mask);
        self.flush(bus)
    }

    /// Emulated direction control: switching to input forces the shadow
    /// bit high to enable the pull-up read path; switching to output
    /// keeps the last driven value. Either way the byte is flushed.
    pub fn set_direction(
        &mut self,
        bus: &mut impl I2cPort,
        pin: u8,
        direction: Direction,
    ) -> Result<(), BusError> {
        if direction == Direction::Input {
            self.shadow |= 1 << pin;
        }
        self.flush(bus)
    }

    /// Read one pin's line level.
    pub fn read_pin(&mut self, bus: &mut impl I2cPort, pin: u8) -> Result<bool, BusError> {
        Ok(self.read_state(bus)? & (1 << pin) != 0)
    }

    /// Read the whole input byte, through the cache when enabled.
    pub fn read_state(&mut self, bus: &mut impl I2cPort) -> Result<u8, BusError> {
        if self.buffered_read {
            if let Some(value) = self.cached_read {
                return Ok(value);
            }
        }

        let mut buf = [0u8; 1];
        bus.read(self.addr, &mut buf)?;
        debug!("extio 0x{:02x}: read 0x{:02x}", self.addr, buf[0]);

        if self.buffered_read {
            self.cached_read = Some(buf[0]);
        }
        Ok(buf[0])
    }

    /// Drop the cached input byte. Must run after the change-notify
    /// interrupt and before the next read, or reads return stale data.
    pub fn invalidate(&mut self) {
        self.cached_read = None;
    }

    fn flush(&mut self, bus: &mut impl I2cPort) -> Result<(), BusError> {
        bus.write(self.addr, &[self.shadow])
    }
}
