//! relaynode IO core library.
//!
//! Output control for a CAN home-automation node: a packed pin-descriptor
//! addressing scheme dispatched over native GPIO and I2C-expanded
//! backends, a fixed-capacity pulse scheduler, and the XPS command engine
//! the protocol layer drives. All hardware access flows through port
//! traits, so the whole core runs on the host against the simulation
//! adapters.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod events;
pub mod pins;
#[cfg(feature = "pulse")]
pub mod pulse;
pub mod xps;

mod error;

pub mod adapters;
pub mod drivers;

pub use error::{BusError, Error, Result};
