//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller (domain)
//! ```
//!
//! Driven adapters (GPIO/ADC, radio and deep sleep, the temperature probe
//! bus, telemetry, settings storage) implement these traits. The
//! [`Controller`](super::service::Controller) consumes them via generics,
//! so the domain core never touches hardware directly.

use embedded_hal::delay::DelayNs;

use crate::config::ControllerConfig;

// ───────────────────────────────────────────────────────────────
// Raw hardware boundary
// ───────────────────────────────────────────────────────────────

/// Electrical mode of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
    Analog,
}

/// Synchronous GPIO/ADC access.
///
/// Settling delays go through the [`DelayNs`] supertrait.
pub trait GpioPort: DelayNs {
    fn set_pin_mode(&mut self, pin: i32, mode: PinMode);

    fn digital_read(&mut self, pin: i32) -> bool;

    fn digital_write(&mut self, pin: i32, high: bool);

    /// Raw 12-bit ADC sample (0..=4095).
    fn analog_read(&mut self, pin: i32) -> u16;

    /// Length of the next pulse at `level` on `pin`, in microseconds.
    /// Returns `None` when no pulse completes within `timeout_us`.
    fn pulse_in(&mut self, pin: i32, level: bool, timeout_us: u32) -> Option<u32>;
}

/// Radio and low-power control.
pub trait PowerPort {
    /// Shut the radio down. ADC2 is only usable while the radio is off.
    fn radio_off(&mut self);

    /// Bring the radio back up after an ADC2 acquisition.
    fn radio_on(&mut self);

    /// Arm the wake timer (if any) and suspend.
    ///
    /// On target this never returns; no in-memory state survives. Host
    /// adapters record the request and return.
    fn deep_sleep(&mut self, wake_after_us: Option<u64>);
}

/// Monotonic millisecond clock, counted from wake.
pub trait ClockPort {
    fn millis(&self) -> u64;
}

/// Temperature probe bus.
pub trait TemperaturePort {
    /// Read up to `out.len()` probes into `out`.
    /// Returns how many probes answered.
    fn read_temperatures(&mut self, out: &mut [f32]) -> usize;
}

/// Everything the control loop needs from the board.
pub trait Board: GpioPort + PowerPort + ClockPort + TemperaturePort {}

impl<T: GpioPort + PowerPort + ClockPort + TemperaturePort> Board for T {}

// ───────────────────────────────────────────────────────────────
// Telemetry sink (domain → device fabric)
// ───────────────────────────────────────────────────────────────

/// Write-only property channel. Adapters decide where events go
/// (serial log, the device fabric's publisher, a test recorder).
pub trait TelemetrySink {
    fn publish(&mut self, event: &super::events::TelemetryEvent);
}

// ───────────────────────────────────────────────────────────────
// Settings port (domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists controller settings.
///
/// Implementations MUST validate before persisting. Invalid values are
/// rejected with [`ConfigError::ValidationFailed`], never clamped.
pub trait SettingsPort {
    /// Load settings. Returns [`ControllerConfig::default()`] if nothing is stored.
    fn load(&self) -> Result<ControllerConfig, ConfigError>;

    /// Validate and persist settings.
    fn save(&mut self, config: &ControllerConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`SettingsPort`] operations and keyed setting updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Stored settings failed deserialization.
    Corrupted,
    /// A field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// The key does not name a known setting.
    UnknownKey,
    /// Generic I/O error from the storage backend.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Corrupted => write!(f, "settings corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::UnknownKey => write!(f, "unknown setting"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}
