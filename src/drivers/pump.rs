//! Pump output driver.
//!
//! Each plant slot has one pump on a plain digital output (active HIGH).
//! The driver is a dumb actuator: whether a pump may run is decided by the
//! irrigation policy, never here. It only tracks the last commanded state
//! so callers can tell transitions from repeats.

use crate::app::ports::{GpioPort, PinMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PumpDriver {
    pin: i32,
    active: bool,
}

impl PumpDriver {
    pub const fn new(pin: i32) -> Self {
        Self { pin, active: false }
    }

    /// Configure the output and drive it low.
    pub fn init(&mut self, gpio: &mut impl GpioPort) {
        gpio.set_pin_mode(self.pin, PinMode::Output);
        gpio.digital_write(self.pin, false);
        self.active = false;
    }

    /// Drive the output. The pin is always written; the return value is
    /// `true` only when the commanded state changed.
    pub fn set(&mut self, gpio: &mut impl GpioPort, on: bool) -> bool {
        gpio.digital_write(self.pin, on);
        let changed = self.active != on;
        self.active = on;
        changed
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }
}
