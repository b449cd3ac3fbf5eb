//! In-memory simulation backends for host-side tests.
//!
//! [`SimGpio`] models the microcontroller's port registers (direction,
//! output latch, input register) and [`SimI2c`] models the I2C bus with
//! one or more quasi-bidirectional expander chips hanging off it,
//! including the open-drain + pull-up electrical behavior and fault
//! injection. No real hardware is touched; integration tests drive the
//! whole core against these.

use crate::app::ports::{Direction, GpioPort, I2cPort};
use crate::error::BusError;

// ───────────────────────────────────────────────────────────────
// Native GPIO simulation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default)]
struct SimPort {
    /// Output latch byte.
    output: u8,
    /// Direction register, bit set = output.
    direction: u8,
    /// Externally applied input levels.
    input: u8,
}

/// Simulated register-level GPIO across eight ports.
pub struct SimGpio {
    ports: [SimPort; 8],
    ops: usize,
}

impl SimGpio {
    pub fn new() -> Self {
        Self {
            ports: [SimPort::default(); 8],
            ops: 0,
        }
    }

    /// Total register operations performed, for zero-access assertions.
    pub fn ops(&self) -> usize {
        self.ops
    }

    /// Apply an external level to an input pin.
    pub fn set_input(&mut self, port: u8, pin: u8, state: bool) {
        let p = &mut self.ports[port as usize];
        if state {
            p.input |= 1 << pin;
        } else {
            p.input &= !(1 << pin);
        }
    }

    /// Observe the output latch without counting as a register access.
    pub fn output_level(&self, port: u8, pin: u8) -> bool {
        self.ports[port as usize].output & (1 << pin) != 0
    }
}

impl Default for SimGpio {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for SimGpio {
    fn init(&mut self, port: u8, pin: u8, direction: Direction, state: bool) {
        self.set_direction(port, pin, direction);
        self.write(port, pin, state);
    }

    fn write(&mut self, port: u8, pin: u8, state: bool) {
        self.ops += 1;
        let p = &mut self.ports[port as usize];
        if state {
            p.output |= 1 << pin;
        } else {
            p.output &= !(1 << pin);
        }
    }

    fn read(&mut self, port: u8, pin: u8) -> bool {
        self.ops += 1;
        let p = &self.ports[port as usize];
        // The input register reflects the driven latch for outputs and
        // the external level for inputs.
        if p.direction & (1 << pin) != 0 {
            p.output & (1 << pin) != 0
        } else {
            p.input & (1 << pin) != 0
        }
    }

    fn toggle(&mut self, port: u8, pin: u8) {
        self.ops += 1;
        self.ports[port as usize].output ^= 1 << pin;
    }

    fn set_direction(&mut self, port: u8, pin: u8, direction: Direction) {
        self.ops += 1;
        let p = &mut self.ports[port as usize];
        match direction {
            Direction::Output => p.direction |= 1 << pin,
            Direction::Input => p.direction &= !(1 << pin),
        }
    }
}

// ───────────────────────────────────────────────────────────────
// I2C bus + expander chip simulation
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct SimChip {
    addr: u8,
    /// Written latch; a cleared bit sinks the line low, a set bit releases
    /// it to the weak pull-up. Chips power up all-high.
    latch: u8,
    /// External open-drain drivers currently pulling lines low.
    ext_low: u8,
}

/// Simulated I2C bus with expander chips.
pub struct SimI2c {
    chips: Vec<SimChip>,
    writes: usize,
    reads: usize,
    fail_writes: bool,
    fail_reads: bool,
}

impl SimI2c {
    /// Bus with one chip per address in `addrs`.
    pub fn new(addrs: &[u8]) -> Self {
        Self {
            chips: addrs
                .iter()
                .map(|&addr| SimChip {
                    addr,
                    latch: 0xFF,
                    ext_low: 0,
                })
                .collect(),
            writes: 0,
            reads: 0,
            fail_writes: false,
            fail_reads: false,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn reads(&self) -> usize {
        self.reads
    }

    /// Make subsequent writes fail with `NoAcknowledge`.
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Make subsequent reads fail with `NoAcknowledge`.
    pub fn fail_reads(&mut self, fail: bool) {
        self.fail_reads = fail;
    }

    /// The chip's written latch byte.
    pub fn latch(&self, addr: u8) -> u8 {
        self.chip(addr).latch
    }

    /// Actual line levels: a line is high only if the latch releases it
    /// and nothing external pulls it low.
    pub fn line_levels(&self, addr: u8) -> u8 {
        let chip = self.chip(addr);
        chip.latch & !chip.ext_low
    }

    /// Simulate an external open-drain driver on one line.
    pub fn set_external_low(&mut self, addr: u8, pin: u8, pulled_low: bool) {
        let chip = self.chip_mut(addr);
        if pulled_low {
            chip.ext_low |= 1 << pin;
        } else {
            chip.ext_low &= !(1 << pin);
        }
    }

    fn chip(&self, addr: u8) -> &SimChip {
        self.chips
            .iter()
            .find(|c| c.addr == addr)
            .expect("no sim chip at address")
    }

    fn chip_mut(&mut self, addr: u8) -> &mut SimChip {
        self.chips
            .iter_mut()
            .find(|c| c.addr == addr)
            .expect("no sim chip at address")
    }
}

impl I2cPort for SimI2c {
    fn write(&mut self, addr: u8, bytes: &[u8]) -> Result<(), BusError> {
        self.writes += 1;
        if self.fail_writes {
            return Err(BusError::NoAcknowledge);
        }
        let chip = self
            .chips
            .iter_mut()
            .find(|c| c.addr == addr)
            .ok_or(BusError::NoAcknowledge)?;
        if let Some(&last) = bytes.last() {
            chip.latch = last;
        }
        Ok(())
    }

    fn read(&mut self, addr: u8, buf: &mut [u8]) -> Result<(), BusError> {
        self.reads += 1;
        if self.fail_reads {
            return Err(BusError::NoAcknowledge);
        }
        let levels = {
            let chip = self
                .chips
                .iter()
                .find(|c| c.addr == addr)
                .ok_or(BusError::NoAcknowledge)?;
            chip.latch & !chip.ext_low
        };
        buf.fill(levels);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpio_read_follows_direction() {
        let mut gpio = SimGpio::new();
        gpio.init(2, 0, Direction::Output, true);
        assert!(gpio.read(2, 0));

        gpio.set_direction(2, 0, Direction::Input);
        assert!(!gpio.read(2, 0));
        gpio.set_input(2, 0, true);
        assert!(gpio.read(2, 0));
    }

    #[test]
    fn missing_chip_nacks() {
        let mut bus = SimI2c::new(&[0x20]);
        assert_eq!(bus.write(0x27, &[0x00]), Err(BusError::NoAcknowledge));
        let mut buf = [0u8; 1];
        assert_eq!(bus.read(0x27, &mut buf), Err(BusError::NoAcknowledge));
    }

    #[test]
    fn chip_powers_up_released_high() {
        let bus = SimI2c::new(&[0x20]);
        assert_eq!(bus.line_levels(0x20), 0xFF);
    }
}
