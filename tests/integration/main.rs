//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a slice of the IO core
//! against the simulation adapters. All tests run on the host with no
//! real hardware required.

mod bringup_tests;
mod extio_cache_tests;
mod mock_hw;
mod xps_flow_tests;
