//! Unified error types for the PlantCtrl firmware.
//!
//! A single `Error` enum that every subsystem can convert into. All variants
//! are `Copy` so they can be passed around the control loop without
//! allocation. None of them is fatal: the control loop resolves sensor
//! errors to safe defaults, and command/config errors are reported back to
//! whoever issued the request.

use core::fmt;

use crate::app::ports::ConfigError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A sensor reading was indeterminate and has been discarded.
    Sensor(SensorError),
    /// A remote actuator command was rejected.
    Command(CommandError),
    /// A setting failed validation or could not be loaded.
    Config(ConfigError),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Command(e) => write!(f, "command: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

/// Why a reading was resolved to its safe default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The ranging echo never returned within the pulse timeout.
    PulseTimeout,
    /// Solar voltage too low to power the level-switch circuitry.
    SolarTooWeak,
    /// Reading is outside the physically plausible range.
    OutOfRange,
    /// Level switches report a physically impossible combination.
    Inconsistent,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PulseTimeout => write!(f, "echo pulse timed out"),
            Self::SolarTooWeak => write!(f, "solar voltage too low for sensors"),
            Self::OutOfRange => write!(f, "reading out of range"),
            Self::Inconsistent => write!(f, "inconsistent level switches"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Command errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// Ranged (multi-value) commands are not supported; only scalar control.
    RangeNotSupported,
    /// Payload is not one of the accepted on/off spellings.
    InvalidPayload,
    /// The addressed pump does not belong to a configured plant.
    NoSuchPump,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RangeNotSupported => write!(f, "ranged command not supported"),
            Self::InvalidPayload => write!(f, "invalid payload"),
            Self::NoSuchPump => write!(f, "no such pump"),
        }
    }
}

impl From<CommandError> for Error {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
