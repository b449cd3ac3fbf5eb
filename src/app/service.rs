//! IO service — the hexagonal core.
//!
//! [`IoService`] owns the per-output command contexts, the virtual pin
//! dispatcher and the pulse scheduler, and exposes a clean,
//! hardware-agnostic API to the protocol layer:
//!
//! ```text
//!  OutputCommand ──▶ ┌─────────────────────────┐ ──▶ EventSink
//!                    │        IoService        │
//!                    │  XPS · dispatch · pulse │ ──▶ GpioPort / I2cPort
//!  process(now_ms) ─▶└─────────────────────────┘
//! ```
//!
//! The owning cooperative thread calls [`process`](IoService::process)
//! once per pass and sizes its idle wait with
//! [`idle_wait`](IoService::idle_wait); `handle_command` may be called
//! from another cooperative thread between passes.

use log::{info, warn};

use crate::config::NodeConfig;
use crate::drivers::dispatch::VirtualPins;
use crate::error::{Error, Result};
use crate::events::ExtioEventChannel;
use crate::pins::{self, Backend, PinDescriptor};
#[cfg(feature = "pulse")]
use crate::pulse::PulseScheduler;
#[cfg(feature = "pulse")]
use crate::config::PULSE_POOL_CAPACITY;
use crate::xps::XpsContext;

use super::commands::OutputCommand;
use super::events::AppEvent;
use super::ports::{Direction, EventSink, GpioPort, I2cPort};

/// The IO service orchestrates command handling and pulse servicing for
/// every output in the board table.
pub struct IoService<G: GpioPort, B: I2cPort> {
    pins: VirtualPins<G, B>,
    outputs: heapless::Vec<XpsContext, { pins::OUTPUT_COUNT }>,
    #[cfg(feature = "pulse")]
    pulses: PulseScheduler<PULSE_POOL_CAPACITY>,
    extio_events: &'static ExtioEventChannel,
}

impl<G: GpioPort, B: I2cPort> IoService<G, B> {
    /// Validate the configuration, build the dispatcher and bring the
    /// board up: native outputs are programmed to their idle levels one
    /// by one, then each expander gets its whole idle byte in a single
    /// masked write.
    ///
    /// `now_ms` primes the pulse clock. An expander that fails its
    /// bring-up flush is logged and left for the next write to
    /// resynchronize; only a bad configuration is fatal here.
    pub fn new(
        gpio: G,
        bus: B,
        config: &NodeConfig,
        extio_events: &'static ExtioEventChannel,
        now_ms: u32,
    ) -> Result<Self> {
        config.validate()?;

        let mut pins = VirtualPins::new(gpio, bus, config);
        let mut outputs = heapless::Vec::new();

        for (i, &descr) in pins::OUTPUT_TABLE.iter().enumerate() {
            let reset_state = config.reset_states[i];
            if descr.is_active() && descr.backend() == Backend::NativeGpio {
                pins.init(descr, Direction::Output, reset_state)?;
            }
            // Table and context capacity are the same constant.
            let _ = outputs.push(XpsContext::new(descr, reset_state));
        }

        for device in 0..config.extio_addresses.len() as u8 {
            let (mask, value) = Self::extio_idle_bits(device, config);
            if mask == 0 {
                continue;
            }
            if let Some((dev, bus)) = pins.extio_device(device) {
                if let Err(e) = dev.write_mask(bus, mask, value) {
                    warn!("extio {}: bring-up flush failed: {}", device, e);
                }
            }
        }

        info!(
            "io service up: {} outputs, {} expander(s)",
            outputs.len(),
            config.extio_addresses.len()
        );

        #[cfg(not(feature = "pulse"))]
        let _ = now_ms;

        Ok(Self {
            pins,
            outputs,
            #[cfg(feature = "pulse")]
            pulses: PulseScheduler::new(now_ms),
            extio_events,
        })
    }

    /// Idle byte of one expander, assembled from the board table and the
    /// configured reset levels.
    fn extio_idle_bits(device: u8, config: &NodeConfig) -> (u8, u8) {
        let mut mask = 0u8;
        let mut value = 0u8;
        for (i, &descr) in pins::OUTPUT_TABLE.iter().enumerate() {
            if descr.is_active()
                && descr.backend() == Backend::ExtendedIo
                && descr.device_index() == device
            {
                mask |= 1 << descr.pin();
                if config.reset_states[i] {
                    value |= 1 << descr.pin();
                }
            }
        }
        (mask, value)
    }

    /// Apply one decoded command and report it to the sink.
    pub fn handle_command(&mut self, cmd: OutputCommand, sink: &mut impl EventSink) -> Result<()> {
        let ctx = self
            .outputs
            .get_mut(cmd.output as usize)
            .ok_or(Error::NotSupported)?;

        #[cfg(feature = "pulse")]
        ctx.apply(&mut self.pins, &self.pulses, cmd.command, cmd.duration_ms)?;
        #[cfg(not(feature = "pulse"))]
        ctx.apply(&mut self.pins, cmd.command, cmd.duration_ms)?;

        sink.emit(&AppEvent::CommandApplied {
            output: cmd.output,
            command: cmd.command,
        });
        Ok(())
    }

    /// One scheduler pass: consume pending change-notify signals, then
    /// fire expired pulses. Returns true if anything fired, so the caller
    /// knows to re-announce output state.
    pub fn process(&mut self, now_ms: u32, sink: &mut impl EventSink) -> bool {
        while let Ok(change) = self.extio_events.try_receive() {
            self.pins.invalidate_extio(change.device);
        }
        self.process_pulses(now_ms, sink)
    }

    #[cfg(feature = "pulse")]
    fn process_pulses(&mut self, now_ms: u32, sink: &mut impl EventSink) -> bool {
        let fired = self.pulses.process(&mut self.pins, now_ms);
        if fired {
            sink.emit(&AppEvent::PulsesExpired);
        }
        fired
    }

    #[cfg(not(feature = "pulse"))]
    fn process_pulses(&mut self, _now_ms: u32, _sink: &mut impl EventSink) -> bool {
        false
    }

    /// Upper bound for the main loop's idle sleep: the delay until the
    /// next pulse expiry, or `None` when nothing is scheduled.
    #[cfg(feature = "pulse")]
    pub fn idle_wait(&self) -> Option<u32> {
        self.pulses.remaining()
    }

    #[cfg(not(feature = "pulse"))]
    pub fn idle_wait(&self) -> Option<u32> {
        None
    }

    /// Whether output `output` has a pulse in flight.
    #[cfg(feature = "pulse")]
    pub fn pulse_active(&self, output: u8) -> bool {
        self.outputs
            .get(output as usize)
            .is_some_and(|ctx| ctx.pulse_active(&self.pulses))
    }

    /// Read back one output's current level for telemetry.
    pub fn read_output(&mut self, output: u8) -> Result<bool> {
        let descr = self.descriptor(output)?;
        self.pins.read(descr)
    }

    /// Last driven byte of expander `device`, for state announcements.
    pub fn extio_shadow(&mut self, device: u8) -> Option<u8> {
        self.pins.extio_device(device).map(|(dev, _)| dev.shadow())
    }

    /// Number of outputs in the board table.
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// The dispatcher, for the node's other device drivers that share the
    /// backends (temperature sensors on the same bus, status LEDs on
    /// spare native pins).
    pub fn pins_mut(&mut self) -> &mut VirtualPins<G, B> {
        &mut self.pins
    }

    fn descriptor(&self, output: u8) -> Result<PinDescriptor> {
        self.outputs
            .get(output as usize)
            .map(XpsContext::descriptor)
            .ok_or(Error::NotSupported)
    }
}
