//! Application core: decision logic with no direct I/O.
//!
//! The [`service::Controller`] ties together sensing, irrigation, the
//! power scheduler and the diagnostic menu. All interaction with hardware
//! happens through **port traits** defined in [`ports`], keeping this layer
//! fully testable without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
