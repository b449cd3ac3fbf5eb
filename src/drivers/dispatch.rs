//! Virtual pin dispatcher.
//!
//! One addressing scheme, two physically different backends:
//!
//! ```text
//!                      ┌─────────────────┐
//!   PinDescriptor ──▶  │   VirtualPins   │ ──▶ GpioPort (registers)
//!                      │                 │ ──▶ ExtioDevice ──▶ I2cPort
//!                      └─────────────────┘
//! ```
//!
//! Every operation decodes the descriptor and routes to the native GPIO
//! port or the expander shadow driver. Descriptors with the active flag
//! clear are rejected with `NotSupported` before any backend access.

use crate::app::ports::{Direction, GpioPort, I2cPort};
use crate::config::NodeConfig;
use crate::drivers::extio::ExtioDevice;
use crate::error::{Error, Result};
use crate::pins::{Backend, PinDescriptor};

/// The dispatcher owns both backends and the per-expander driver state.
pub struct VirtualPins<G: GpioPort, B: I2cPort> {
    gpio: G,
    bus: B,
    extio: heapless::Vec<ExtioDevice, 8>,
}

impl<G: GpioPort, B: I2cPort> VirtualPins<G, B> {
    /// Build the dispatcher from the injected backends and the configured
    /// expander set.
    pub fn new(gpio: G, bus: B, config: &NodeConfig) -> Self {
        let mut extio = heapless::Vec::new();
        for addr in config.extio_addresses {
            // The descriptor's device field is 3 bits wide, so capacity 8
            // covers every addressable expander.
            let _ = extio.push(ExtioDevice::new(addr, config.extio_buffered_read));
        }
        Self { gpio, bus, extio }
    }

    /// Program direction and initial level.
    pub fn init(&mut self, descr: PinDescriptor, direction: Direction, state: bool) -> Result<()> {
        match self.route(descr)? {
            Backend::NativeGpio => {
                self.gpio.init(descr.device_index(), descr.pin(), direction, state);
                Ok(())
            }
            Backend::ExtendedIo => {
                let (dev, bus) = self.extio_mut(descr)?;
                dev.set_direction(bus, descr.pin(), direction)?;
                if direction == Direction::Output {
                    dev.write_pin(bus, descr.pin(), state)?;
                }
                Ok(())
            }
        }
    }

    /// Drive an output level.
    pub fn write(&mut self, descr: PinDescriptor, state: bool) -> Result<()> {
        match self.route(descr)? {
            Backend::NativeGpio => {
                self.gpio.write(descr.device_index(), descr.pin(), state);
                Ok(())
            }
            Backend::ExtendedIo => {
                let (dev, bus) = self.extio_mut(descr)?;
                dev.write_pin(bus, descr.pin(), state)?;
                Ok(())
            }
        }
    }

    /// Invert an output.
    pub fn toggle(&mut self, descr: PinDescriptor) -> Result<()> {
        match self.route(descr)? {
            Backend::NativeGpio => {
                self.gpio.toggle(descr.device_index(), descr.pin());
                Ok(())
            }
            Backend::ExtendedIo => {
                let (dev, bus) = self.extio_mut(descr)?;
                dev.toggle_pin(bus, descr.pin())?;
                Ok(())
            }
        }
    }

    /// Read the line level. For expander outputs this reflects the last
    /// driven level; for expander inputs, the true external level.
    pub fn read(&mut self, descr: PinDescriptor) -> Result<bool> {
        match self.route(descr)? {
            Backend::NativeGpio => Ok(self.gpio.read(descr.device_index(), descr.pin())),
            Backend::ExtendedIo => {
                let (dev, bus) = self.extio_mut(descr)?;
                Ok(dev.read_pin(bus, descr.pin())?)
            }
        }
    }

    /// Program direction without touching the output level, except that an
    /// expander pin switching to input gets its pull-up forced (see the
    /// shadow driver's emulated-direction semantics).
    pub fn set_direction(&mut self, descr: PinDescriptor, direction: Direction) -> Result<()> {
        match self.route(descr)? {
            Backend::NativeGpio => {
                self.gpio.set_direction(descr.device_index(), descr.pin(), direction);
                Ok(())
            }
            Backend::ExtendedIo => {
                let (dev, bus) = self.extio_mut(descr)?;
                dev.set_direction(bus, descr.pin(), direction)?;
                Ok(())
            }
        }
    }

    /// Invalidate the read cache of expander `device`.
    pub fn invalidate_extio(&mut self, device: u8) {
        if let Some(dev) = self.extio.get_mut(device as usize) {
            dev.invalidate();
        }
    }

    /// Shared access to an expander's driver state (shadow read-back,
    /// bring-up masked writes).
    pub fn extio_device(&mut self, device: u8) -> Option<(&mut ExtioDevice, &mut B)> {
        let dev = self.extio.get_mut(device as usize)?;
        Some((dev, &mut self.bus))
    }

    /// The native GPIO backend, for lines outside the descriptor scheme.
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    /// The bus peripheral, shared with other I2C devices on the board.
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    fn route(&self, descr: PinDescriptor) -> Result<Backend> {
        if !descr.is_active() {
            return Err(Error::NotSupported);
        }
        Ok(descr.backend())
    }

    fn extio_mut(&mut self, descr: PinDescriptor) -> Result<(&mut ExtioDevice, &mut B)> {
        // A descriptor naming an unconfigured expander is as unavailable
        // as an inactive one.
        self.extio
            .get_mut(descr.device_index() as usize)
            .map(|dev| (dev, &mut self.bus))
            .ok_or(Error::NotSupported)
    }
}
