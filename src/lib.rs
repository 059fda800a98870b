//! PlantCtrl firmware library.
//!
//! Exposes the decision core and its adapters for integration testing and
//! the firmware binary. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod irrigation;
pub mod pins;
pub mod plant;
pub mod power;

// Hardware-facing modules; the ESP-IDF paths are cfg-gated inside.
pub mod adapters;
pub mod drivers;
pub mod sensors;
