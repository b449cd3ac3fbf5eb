//! Interrupt-to-thread signalling.
//!
//! The expander's change-notify line fires a hardware interrupt when any
//! of its pins change. The ISR must not touch driver state, so it only
//! enqueues a message here; the cooperative thread owning the IO service
//! drains the channel and invalidates the affected read cache before its
//! next read. Bounded `embassy-sync` channels keep this allocation-free
//! and safe from interrupt context.
//!
//! ```text
//! ┌──────────────┐  ExtioChange   ┌───────────────┐
//! │  change ISR  │───────────────▶│  IoService     │
//! │  (try_send)  │                │  .process()    │
//! └──────────────┘                └───────────────┘
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// A change-notify edge from one expander.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtioChange {
    /// Extended-IO device index.
    pub device: u8,
}

/// Channel depth; edges collapse into cache invalidations, so a shallow
/// queue suffices.
pub const EXTIO_EVENT_DEPTH: usize = 4;

/// Channel type shared by the ISR hook and the service.
pub type ExtioEventChannel = Channel<CriticalSectionRawMutex, ExtioChange, EXTIO_EVENT_DEPTH>;

static EXTIO_EVENTS: ExtioEventChannel = Channel::new();

/// The process-wide channel instance used by the firmware. Tests build
/// their own channels for isolation.
pub fn extio_event_channel() -> &'static ExtioEventChannel {
    &EXTIO_EVENTS
}

/// ISR hook: signal that expander `device` changed. Never blocks; returns
/// `false` if the queue was full (the pending invalidation already covers
/// the change).
pub fn notify_extio_change(device: u8) -> bool {
    EXTIO_EVENTS.try_send(ExtioChange { device }).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_queue_drops_but_reports() {
        static CH: ExtioEventChannel = Channel::new();
        for _ in 0..EXTIO_EVENT_DEPTH {
            assert!(CH.try_send(ExtioChange { device: 0 }).is_ok());
        }
        assert!(CH.try_send(ExtioChange { device: 0 }).is_err());

        assert_eq!(CH.try_receive().unwrap(), ExtioChange { device: 0 });
        assert!(CH.try_send(ExtioChange { device: 1 }).is_ok());
    }
}
