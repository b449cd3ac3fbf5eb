//! XPS ("extended pin state") command engine.
//!
//! One [`XpsContext`] per controllable output binds a descriptor to its
//! board-configured idle level and at most one in-flight pulse. The
//! engine interprets the protocol layer's digital command verbs into
//! dispatcher writes and scheduler calls; it never parses frames.
//!
//! Verb semantics worth knowing:
//! - `SetOn`/`SetOff` deliberately do NOT cancel a running pulse on the
//!   same context; its scheduled restoration will still fire. The pulse
//!   verbs and `Reset` do cancel.
//! - A new pulse replaces the previous one without restoring its reset
//!   level first, so back-to-back pulse commands don't flicker the pin.
//! - `reset_state` here is the configured idle level of the output,
//!   distinct from the transient reset level each pulse carries.

use crate::app::commands::XpsCommand;
use crate::app::ports::{GpioPort, I2cPort};
use crate::drivers::dispatch::VirtualPins;
use crate::error::{Error, Result};
use crate::pins::PinDescriptor;
#[cfg(feature = "pulse")]
use crate::pulse::{PulseHandle, PulseScheduler};

/// Per-output command state.
#[derive(Debug)]
pub struct XpsContext {
    descr: PinDescriptor,
    /// Board-configured idle level, applied by `Reset`.
    reset_state: bool,
    #[cfg(feature = "pulse")]
    active_pulse: Option<PulseHandle>,
}

impl XpsContext {
    pub fn new(descr: PinDescriptor, reset_state: bool) -> Self {
        Self {
            descr,
            reset_state,
            #[cfg(feature = "pulse")]
            active_pulse: None,
        }
    }

    pub fn descriptor(&self) -> PinDescriptor {
        self.descr
    }

    pub fn reset_state(&self) -> bool {
        self.reset_state
    }

    /// Whether this context has a pulse pending.
    #[cfg(feature = "pulse")]
    pub fn pulse_active<const N: usize>(&self, pulses: &PulseScheduler<N>) -> bool {
        self.active_pulse.is_some_and(|h| pulses.is_active(h))
    }

    /// Apply one command verb.
    #[cfg(feature = "pulse")]
    pub fn apply<G: GpioPort, B: I2cPort, const N: usize>(
        &mut self,
        pins: &mut VirtualPins<G, B>,
        pulses: &PulseScheduler<N>,
        cmd: XpsCommand,
        duration_ms: u32,
    ) -> Result<()> {
        if !self.descr.is_active() {
            return Err(Error::NotSupported);
        }

        match cmd {
            XpsCommand::SetOn => pins.write(self.descr, true),
            XpsCommand::SetOff => pins.write(self.descr, false),
            XpsCommand::Toggle => pins.toggle(self.descr),

            XpsCommand::PulseOn | XpsCommand::PulseOff => {
                // Drop the previous pulse without snapping the pin back,
                // then arm the replacement.
                if let Some(h) = self.active_pulse.take() {
                    pulses.cancel(pins, h, false);
                }
                let level = cmd == XpsCommand::PulseOn;
                self.active_pulse = pulses.trigger(pins, self.descr, level, duration_ms, None);
                if duration_ms != 0 && self.active_pulse.is_none() {
                    return Err(Error::ResourceExhausted);
                }
                Ok(())
            }
            XpsCommand::PulseCancel => {
                if let Some(h) = self.active_pulse.take() {
                    pulses.cancel(pins, h, true);
                }
                Ok(())
            }
            XpsCommand::Reset => {
                if let Some(h) = self.active_pulse.take() {
                    pulses.cancel(pins, h, true);
                }
                pins.write(self.descr, self.reset_state)
            }
        }
    }

    /// Apply one command verb. Without pulse support the pulse verbs
    /// degrade to the `Reset`-equivalent immediate write.
    #[cfg(not(feature = "pulse"))]
    pub fn apply<G: GpioPort, B: I2cPort>(
        &mut self,
        pins: &mut VirtualPins<G, B>,
        cmd: XpsCommand,
        _duration_ms: u32,
    ) -> Result<()> {
        if !self.descr.is_active() {
            return Err(Error::NotSupported);
        }

        match cmd {
            XpsCommand::SetOn => pins.write(self.descr, true),
            XpsCommand::SetOff => pins.write(self.descr, false),
            XpsCommand::Toggle => pins.toggle(self.descr),
            XpsCommand::PulseOn
            | XpsCommand::PulseOff
            | XpsCommand::PulseCancel
            | XpsCommand::Reset => pins.write(self.descr, self.reset_state),
        }
    }
}
