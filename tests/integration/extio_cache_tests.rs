//! Change-notify invalidation contract: the ISR hook enqueues a signal,
//! the next service pass invalidates the read cache, and only then do
//! reads see the new line level.

use crate::mock_hw::{make_service, RecordSink};
use relaynode::config::NodeConfig;
use relaynode::events::ExtioChange;

#[test]
fn cached_reads_refresh_only_after_notify() {
    let mut config = NodeConfig::default();
    config.extio_buffered_read = true;
    config.reset_states[8] = true; // EIO0 idles released high
    let (mut service, channel) = make_service(&config);
    let mut sink = RecordSink::new();

    // First read fills the cache from the bus.
    assert!(service.read_output(8).unwrap());
    let reads = service.pins_mut().bus_mut().reads();

    // An external open-drain driver pulls the line low. Without the
    // change-notify signal the stale cache still answers.
    service.pins_mut().bus_mut().set_external_low(0x20, 0, true);
    assert!(service.read_output(8).unwrap());
    assert_eq!(service.pins_mut().bus_mut().reads(), reads);

    // ISR signal, then a service pass: the cache is dropped and the next
    // read hits the bus.
    channel.try_send(ExtioChange { device: 0 }).unwrap();
    service.process(0, &mut sink);
    assert!(!service.read_output(8).unwrap());
    assert_eq!(service.pins_mut().bus_mut().reads(), reads + 1);
}

#[test]
fn unbuffered_reads_always_hit_the_bus() {
    let mut config = NodeConfig::default();
    config.extio_buffered_read = false;
    let (mut service, _) = make_service(&config);

    let reads = service.pins_mut().bus_mut().reads();
    service.read_output(9).unwrap();
    service.read_output(9).unwrap();
    assert_eq!(service.pins_mut().bus_mut().reads(), reads + 2);
}

#[test]
fn notify_for_unknown_device_is_harmless() {
    let (mut service, channel) = make_service(&NodeConfig::default());
    let mut sink = RecordSink::new();

    channel.try_send(ExtioChange { device: 7 }).unwrap();
    service.process(0, &mut sink);
    assert!(service.read_output(8).is_ok());
}
