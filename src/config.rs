//! Node configuration parameters.
//!
//! Compile-time capacities live here as constants; everything a deployment
//! can tune without reflashing sits in [`NodeConfig`], which the embedding
//! firmware loads from its settings store and hands to
//! [`IoService::new`](crate::app::service::IoService::new).

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins::OUTPUT_COUNT;

/// Simultaneous pulse capacity: pool slots shared by all outputs.
pub const PULSE_POOL_CAPACITY: usize = 4;

/// Number of I2C expander devices on the board.
pub const EXTIO_DEVICE_COUNT: usize = 1;

/// Core node configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// 7-bit I2C address of each expander, in device-index order.
    pub extio_addresses: [u8; EXTIO_DEVICE_COUNT],

    /// Serve expander reads from the change-notify-invalidated cache
    /// instead of issuing a bus transaction per read.
    pub extio_buffered_read: bool,

    /// Idle level of each output, in board-table order. Applied at
    /// bring-up and by the `Reset` verb.
    pub reset_states: [bool; OUTPUT_COUNT],
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            // PCF8574 base address, A2..A0 strapped low.
            extio_addresses: [0x20],
            extio_buffered_read: true,
            // Relays and open collectors idle released.
            reset_states: [false; OUTPUT_COUNT],
        }
    }
}

impl NodeConfig {
    /// Range-check the configuration. Invalid values are rejected, not
    /// clamped, so a corrupted settings blob cannot half-apply.
    pub fn validate(&self) -> Result<()> {
        for addr in self.extio_addresses {
            if !(0x08..=0x77).contains(&addr) {
                return Err(Error::Config("extio address outside 7-bit range"));
            }
        }
        Ok(())
    }
}
