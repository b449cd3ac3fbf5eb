//! Bridge from `embedded-hal` I2C implementations to the crate's bus port.
//!
//! Lets any HAL's blocking I2C peripheral drive the extended-IO expanders
//! without the core depending on a concrete HAL. The rich HAL error is
//! collapsed into the core's [`BusError`] taxonomy; detail beyond that is
//! not actionable here (faults are surfaced, not retried).

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};

use crate::app::ports::I2cPort;
use crate::error::BusError;

/// Newtype adapter implementing [`I2cPort`] over an `embedded-hal` bus.
pub struct HalI2c<T>(T);

impl<T> HalI2c<T> {
    pub fn new(bus: T) -> Self {
        Self(bus)
    }

    /// Give the wrapped peripheral back (e.g. for bus recovery).
    pub fn into_inner(self) -> T {
        self.0
    }
}

fn map_err(kind: ErrorKind) -> BusError {
    match kind {
        ErrorKind::NoAcknowledge(_) => BusError::NoAcknowledge,
        ErrorKind::Bus | ErrorKind::ArbitrationLoss => BusError::Bus,
        _ => BusError::Other,
    }
}

impl<T: I2c> I2cPort for HalI2c<T> {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.0.write(addr, bytes).map_err(|e| map_err(e.kind()))
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.0.read(addr, buf).map_err(|e| map_err(e.kind()))
    }
}
