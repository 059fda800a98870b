//! Polled, debounced self-test button.
//!
//! ## Hardware
//!
//! Active-low momentary switch with external pull-up. The control loop
//! samples the pin once per tick; a level only counts once it has been
//! stable for [`DEBOUNCE_MS`].
//!
//! ```text
//!   raw   ‾‾‾\_/‾\____________________/‾‾‾‾‾‾
//!   out   ‾‾‾‾‾‾‾‾‾‾‾\_______________________/‾‾‾   (after 50 ms stable)
//! ```

use crate::app::ports::{GpioPort, PinMode};

pub const DEBOUNCE_MS: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DebounceState {
    Stable,
    Settling { level: bool, since_ms: u64 },
}

pub struct ButtonDriver {
    gpio: i32,
    pressed: bool,
    state: DebounceState,
}

impl ButtonDriver {
    pub fn new(gpio: i32) -> Self {
        Self {
            gpio,
            pressed: false,
            state: DebounceState::Stable,
        }
    }

    /// GPIO pin this button is attached to.
    pub fn gpio(&self) -> i32 {
        self.gpio
    }

    pub fn init(&self, gpio: &mut impl GpioPort) {
        gpio.set_pin_mode(self.gpio, PinMode::Input);
    }

    /// Debounced level, `true` while held down.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Sample the pin and return the debounced level.
    pub fn poll(&mut self, gpio: &mut impl GpioPort, now_ms: u64) -> bool {
        let raw_pressed = !gpio.digital_read(self.gpio);
        self.update(raw_pressed, now_ms)
    }

    /// Feed one raw sample (`true` = pressed) taken at `now_ms`.
    pub fn update(&mut self, raw_pressed: bool, now_ms: u64) -> bool {
        match self.state {
            DebounceState::Stable => {
                if raw_pressed != self.pressed {
                    self.state = DebounceState::Settling {
                        level: raw_pressed,
                        since_ms: now_ms,
                    };
                }
            }
            DebounceState::Settling { level, since_ms } => {
                if raw_pressed != level {
                    // bounced; restart from the current level
                    self.state = if raw_pressed == self.pressed {
                        DebounceState::Stable
                    } else {
                        DebounceState::Settling {
                            level: raw_pressed,
                            since_ms: now_ms,
                        }
                    };
                } else if now_ms.saturating_sub(since_ms) >= DEBOUNCE_MS {
                    self.pressed = level;
                    self.state = DebounceState::Stable;
                }
            }
        }
        self.pressed
    }
}
