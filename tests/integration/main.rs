//! Integration test driver for the `tests/integration/` submodules.
//!
//! Each `mod` below maps to a file that exercises one slice of the
//! controller against the mock board. All tests run on the host with no
//! real hardware required.

#![cfg(not(target_os = "espidf"))]

mod controller_tests;
mod diagnostics_tests;
mod mock_hw;
