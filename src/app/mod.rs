//! Application layer: the IO service and its port boundary.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
