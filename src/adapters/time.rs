//! Monotonic clock adapter.
//!
//! - **`target_os = "espidf"`**: wraps `esp_timer_get_time()`, which
//!   restarts from zero on every deep-sleep wake.
//! - **host**: `std::time::Instant` captured at construction.

use crate::app::ports::ClockPort;

/// Milliseconds since wake.
pub struct SystemClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Microseconds since wake.
    #[cfg(target_os = "espidf")]
    pub fn uptime_us(&self) -> u64 {
        crate::drivers::hw_init::now_us()
    }

    /// Microseconds since construction.
    #[cfg(not(target_os = "espidf"))]
    pub fn uptime_us(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl ClockPort for SystemClock {
    fn millis(&self) -> u64 {
        self.uptime_us() / 1_000
    }
}
