//! Actuator drivers and raw peripheral helpers.

pub mod button;
pub mod hw_init;
pub mod pump;
