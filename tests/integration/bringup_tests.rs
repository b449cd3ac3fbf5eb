//! Board bring-up: outputs must land on their configured idle levels,
//! with one bus transaction per expander.

use crate::mock_hw::make_service;
use relaynode::config::NodeConfig;

// Output table layout: 0..=7 native (OC1..OC4, RL1..RL4), 8..=15 EIO0..EIO7.

#[test]
fn native_outputs_idle_at_reset_levels() {
    let mut config = NodeConfig::default();
    config.reset_states[2] = true; // OC3 idles high
    let (mut service, _) = make_service(&config);

    assert!(!service.read_output(0).unwrap());
    assert!(service.read_output(2).unwrap());
    assert!(!service.read_output(5).unwrap());
}

#[test]
fn expander_gets_one_masked_write() {
    let mut config = NodeConfig::default();
    config.extio_buffered_read = false;
    config.reset_states[8] = true; // EIO0
    config.reset_states[11] = true; // EIO3
    let (mut service, _) = make_service(&config);

    let bus = service.pins_mut().bus_mut();
    assert_eq!(bus.writes(), 1);
    assert_eq!(bus.latch(0x20), 0b0000_1001);

    assert!(service.read_output(8).unwrap());
    assert!(!service.read_output(9).unwrap());
    assert!(service.read_output(11).unwrap());
}

#[test]
fn shadow_reflects_idle_byte() {
    let mut config = NodeConfig::default();
    config.reset_states[15] = true; // EIO7
    let (mut service, _) = make_service(&config);

    assert_eq!(service.extio_shadow(0), Some(0b1000_0000));
    assert_eq!(service.extio_shadow(3), None);
}

#[test]
fn invalid_config_is_rejected() {
    use relaynode::adapters::sim::{SimGpio, SimI2c};
    use relaynode::app::service::IoService;
    use relaynode::events::ExtioEventChannel;

    let mut config = NodeConfig::default();
    config.extio_addresses[0] = 0x02; // reserved address range
    let channel: &'static ExtioEventChannel = Box::leak(Box::new(ExtioEventChannel::new()));

    let result = IoService::new(
        SimGpio::new(),
        SimI2c::new(&[0x02]),
        &config,
        channel,
        0,
    );
    assert!(matches!(result, Err(relaynode::Error::Config(_))));
}

#[test]
fn bringup_survives_absent_expander() {
    use relaynode::adapters::sim::{SimGpio, SimI2c};
    use relaynode::app::service::IoService;
    use relaynode::events::ExtioEventChannel;

    let config = NodeConfig::default();
    let channel: &'static ExtioEventChannel = Box::leak(Box::new(ExtioEventChannel::new()));

    // Bus with no chip at the configured address: the flush NAKs, the
    // service still comes up and native outputs work.
    let mut service =
        IoService::new(SimGpio::new(), SimI2c::new(&[]), &config, channel, 0).unwrap();
    assert!(!service.read_output(4).unwrap());
}
