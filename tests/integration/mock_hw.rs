//! Shared test fixtures: a recording event sink and a service factory
//! over the simulation adapters.

use relaynode::adapters::sim::{SimGpio, SimI2c};
use relaynode::app::events::AppEvent;
use relaynode::app::ports::EventSink;
use relaynode::app::service::IoService;
use relaynode::config::NodeConfig;
use relaynode::events::ExtioEventChannel;

/// Records every emitted event so tests can assert on the history.
pub struct RecordSink {
    pub events: Vec<AppEvent>,
}

#[allow(dead_code)]
impl RecordSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn last(&self) -> Option<&AppEvent> {
        self.events.last()
    }
}

impl EventSink for RecordSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(*event);
    }
}

/// Service over fresh sim backends with a test-private event channel.
pub fn make_service(
    config: &NodeConfig,
) -> (IoService<SimGpio, SimI2c>, &'static ExtioEventChannel) {
    // Each test leaks its own channel so parallel tests never share one.
    let channel: &'static ExtioEventChannel = Box::leak(Box::new(ExtioEventChannel::new()));
    let service = IoService::new(
        SimGpio::new(),
        SimI2c::new(&config.extio_addresses),
        config,
        channel,
        0,
    )
    .expect("service bring-up failed");
    (service, channel)
}
