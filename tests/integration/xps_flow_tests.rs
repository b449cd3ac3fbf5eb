//! Full command-dispatch chain: decoded command → XPS engine →
//! dispatcher → simulated backends, with pulse servicing by the
//! scheduler pass.

use crate::mock_hw::{make_service, RecordSink};
use relaynode::app::commands::{OutputCommand, XpsCommand};
use relaynode::app::events::AppEvent;
use relaynode::config::NodeConfig;
use relaynode::Error;

fn cmd(output: u8, command: XpsCommand, duration_ms: u32) -> OutputCommand {
    OutputCommand {
        output,
        command,
        duration_ms,
    }
}

#[test]
fn set_and_toggle_drive_native_output() {
    let (mut service, _) = make_service(&NodeConfig::default());
    let mut sink = RecordSink::new();

    service
        .handle_command(cmd(4, XpsCommand::SetOn, 0), &mut sink)
        .unwrap();
    assert!(service.read_output(4).unwrap());

    service
        .handle_command(cmd(4, XpsCommand::Toggle, 0), &mut sink)
        .unwrap();
    assert!(!service.read_output(4).unwrap());

    assert_eq!(
        sink.events,
        vec![
            AppEvent::CommandApplied {
                output: 4,
                command: XpsCommand::SetOn
            },
            AppEvent::CommandApplied {
                output: 4,
                command: XpsCommand::Toggle
            },
        ]
    );
}

#[test]
fn set_drives_expander_output() {
    let (mut service, _) = make_service(&NodeConfig::default());
    let mut sink = RecordSink::new();

    service
        .handle_command(cmd(10, XpsCommand::SetOn, 0), &mut sink)
        .unwrap();
    assert!(service.read_output(10).unwrap());
    assert_eq!(service.extio_shadow(0), Some(0b0000_0100));
}

#[test]
fn unknown_output_index_is_not_supported() {
    let (mut service, _) = make_service(&NodeConfig::default());
    let mut sink = RecordSink::new();

    assert_eq!(
        service.handle_command(cmd(42, XpsCommand::SetOn, 0), &mut sink),
        Err(Error::NotSupported)
    );
    assert!(sink.events.is_empty());
}

#[cfg(feature = "pulse")]
mod pulses {
    use super::*;

    #[test]
    fn pulse_lifecycle_through_the_service() {
        let (mut service, _) = make_service(&NodeConfig::default());
        let mut sink = RecordSink::new();

        service
            .handle_command(cmd(5, XpsCommand::PulseOn, 500), &mut sink)
            .unwrap();
        assert!(service.read_output(5).unwrap());
        assert!(service.pulse_active(5));
        assert_eq!(service.idle_wait(), Some(500));

        // Early pass: nothing fires, wait shrinks.
        assert!(!service.process(200, &mut sink));
        assert_eq!(service.idle_wait(), Some(300));
        assert!(service.read_output(5).unwrap());

        // Expiry pass: the pin reverts and the sink hears about it.
        assert!(service.process(600, &mut sink));
        assert!(!service.read_output(5).unwrap());
        assert!(!service.pulse_active(5));
        assert_eq!(service.idle_wait(), None);
        assert_eq!(sink.last(), Some(&AppEvent::PulsesExpired));
    }

    #[test]
    fn pulse_on_expander_output() {
        let (mut service, _) = make_service(&NodeConfig::default());
        let mut sink = RecordSink::new();

        service
            .handle_command(cmd(12, XpsCommand::PulseOn, 250), &mut sink)
            .unwrap();
        assert!(service.read_output(12).unwrap());

        service.process(250, &mut sink);
        assert!(!service.read_output(12).unwrap());
        assert_eq!(service.extio_shadow(0), Some(0));
    }

    #[test]
    fn reset_cancels_pulse_and_applies_idle_level() {
        let mut config = NodeConfig::default();
        config.reset_states[6] = true; // RL3 idles high
        let (mut service, _) = make_service(&config);
        let mut sink = RecordSink::new();

        service
            .handle_command(cmd(6, XpsCommand::PulseOff, 1000), &mut sink)
            .unwrap();
        assert!(!service.read_output(6).unwrap());

        service
            .handle_command(cmd(6, XpsCommand::Reset, 0), &mut sink)
            .unwrap();
        assert!(service.read_output(6).unwrap());
        assert!(!service.pulse_active(6));
        assert_eq!(service.idle_wait(), None);
    }

    #[test]
    fn concurrent_pulses_expire_independently() {
        let (mut service, _) = make_service(&NodeConfig::default());
        let mut sink = RecordSink::new();

        service
            .handle_command(cmd(0, XpsCommand::PulseOn, 1000), &mut sink)
            .unwrap();
        service
            .handle_command(cmd(1, XpsCommand::PulseOn, 500), &mut sink)
            .unwrap();

        assert!(service.process(600, &mut sink));
        assert!(service.read_output(0).unwrap());
        assert!(!service.read_output(1).unwrap());

        assert!(service.process(1100, &mut sink));
        assert!(!service.read_output(0).unwrap());
    }
}
