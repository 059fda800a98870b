//! Reservoir level monitoring.
//!
//! Two hardware variants exist, chosen per board:
//!
//! ```text
//!   FloatSwitches ── empty mark ─┐
//!                  ── low mark ──┼─▶ water available? remaining %
//!                  ── overflow ──┘      (trusted only with enough sun)
//!
//!   Ultrasonic    ── trigger ──▶ echo pulse ──▶ distance (cm)
//!                                             ──▶ water available? remaining %
//! ```
//!
//! Acquisition ([`ReservoirMonitor::acquire`]) and evaluation
//! ([`ReservoirMonitor::evaluate`]) are split so that the decision logic is
//! testable without a pin in sight. Anything that cannot be interpreted
//! resolves to [`ReservoirStatus::indeterminate`]: not available, remaining
//! unknown.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{GpioPort, PinMode};
use crate::config::ControllerConfig;
use crate::error::SensorError;
use crate::pins;

/// Echo wait limit for the ranging sensor (µs). Roughly 5 m round trip.
pub const ECHO_TIMEOUT_US: u32 = 30_000;

/// Speed of sound in cm/µs.
const SOUND_CM_PER_US: f32 = 0.0343;

/// Level sensing hardware fitted to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservoirKind {
    FloatSwitches,
    Ultrasonic,
}

/// Float switch states; `true` means the switch at that mark is submerged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchLevels {
    pub at_empty_mark: bool,
    pub at_low_mark: bool,
    pub overflow: bool,
}

/// Raw reservoir observation, one per sensor variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservoirReading {
    Switches(SwitchLevels),
    /// Distance from the sensor to the surface; `None` on echo timeout.
    DistanceCm(Option<u16>),
}

/// Interpreted reservoir state, recomputed every irrigation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReservoirStatus {
    pub water_available: bool,
    /// `None` when the remaining amount cannot be determined.
    pub remaining_percent: Option<u8>,
    /// Why the status is indeterminate, if it is.
    pub fault: Option<SensorError>,
}

impl ReservoirStatus {
    pub const fn indeterminate(fault: Option<SensorError>) -> Self {
        Self {
            water_available: false,
            remaining_percent: None,
            fault,
        }
    }

    /// Remaining percentage with `-1` standing in for "unknown".
    pub fn remaining_or_sentinel(&self) -> i16 {
        self.remaining_percent.map_or(-1, i16::from)
    }
}

impl Default for ReservoirStatus {
    fn default() -> Self {
        Self::indeterminate(None)
    }
}

/// Round-trip echo time → distance, truncated to whole centimetres.
pub fn echo_to_distance_cm(duration_us: u32) -> u16 {
    let cm = duration_us as f32 * SOUND_CM_PER_US / 2.0;
    cm.min(f32::from(u16::MAX)) as u16
}

// ───────────────────────────────────────────────────────────────
// Variants
// ───────────────────────────────────────────────────────────────

/// Two (three with overflow) float switches powered from the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscreteSwitchMonitor {
    /// Below this panel voltage the switches are unpowered and read garbage.
    pub min_solar_volts: f32,
}

impl DiscreteSwitchMonitor {
    pub fn evaluate(&self, levels: SwitchLevels, solar_volts: Option<f32>) -> ReservoirStatus {
        let powered = solar_volts.is_some_and(|v| v > self.min_solar_volts);
        if !powered {
            debug!("Reservoir: switches unpowered (solar {:?} V)", solar_volts);
            return ReservoirStatus::indeterminate(Some(SensorError::SolarTooWeak));
        }

        let remaining = match (levels.at_empty_mark, levels.at_low_mark) {
            (true, true) => 50,
            (true, false) => 10,
            (false, false) => 0,
            (false, true) => {
                warn!("Reservoir: low-mark switch wet while empty-mark switch is dry");
                return ReservoirStatus::indeterminate(Some(SensorError::Inconsistent));
            }
        };

        ReservoirStatus {
            water_available: levels.at_empty_mark,
            remaining_percent: Some(remaining),
            fault: None,
        }
    }
}

/// Ultrasonic distance sensor looking down at the water surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangingMonitor {
    /// Configured maximum level distance (cm), never zero.
    pub max_level_cm: u16,
}

impl RangingMonitor {
    pub fn evaluate(&self, distance_cm: Option<u16>) -> ReservoirStatus {
        let Some(distance) = distance_cm else {
            return ReservoirStatus::indeterminate(Some(SensorError::PulseTimeout));
        };
        let max = u32::from(self.max_level_cm.max(1));
        let gone = (100 * u32::from(distance) / max).min(100);

        ReservoirStatus {
            water_available: u32::from(distance) <= max,
            remaining_percent: Some((100 - gone) as u8),
            fault: None,
        }
    }
}

/// The board's reservoir sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReservoirMonitor {
    DiscreteSwitch(DiscreteSwitchMonitor),
    Ranging(RangingMonitor),
}

impl ReservoirMonitor {
    pub fn from_config(config: &ControllerConfig) -> Self {
        match config.reservoir {
            ReservoirKind::FloatSwitches => Self::DiscreteSwitch(DiscreteSwitchMonitor {
                min_solar_volts: config.calibration.switch_solar_volts,
            }),
            ReservoirKind::Ultrasonic => Self::Ranging(RangingMonitor {
                max_level_cm: config.water_max_level_cm,
            }),
        }
    }

    pub fn kind(&self) -> ReservoirKind {
        match self {
            Self::DiscreteSwitch(_) => ReservoirKind::FloatSwitches,
            Self::Ranging(_) => ReservoirKind::Ultrasonic,
        }
    }

    /// Configure the reservoir pins for this variant.
    pub fn init_pins(&self, gpio: &mut impl GpioPort) {
        match self {
            Self::DiscreteSwitch(_) => {
                gpio.set_pin_mode(pins::WATER_EMPTY_GPIO, PinMode::Input);
                gpio.set_pin_mode(pins::WATER_LOW_GPIO, PinMode::Input);
                gpio.set_pin_mode(pins::WATER_OVERFLOW_GPIO, PinMode::Input);
            }
            Self::Ranging(_) => {
                gpio.set_pin_mode(pins::WATER_EMPTY_GPIO, PinMode::Output);
                gpio.digital_write(pins::WATER_EMPTY_GPIO, false);
                gpio.set_pin_mode(pins::WATER_LOW_GPIO, PinMode::Input);
            }
        }
    }

    /// Take one raw observation. The sensor supply must already be on.
    pub fn acquire(&self, gpio: &mut impl GpioPort) -> ReservoirReading {
        match self {
            Self::DiscreteSwitch(_) => ReservoirReading::Switches(SwitchLevels {
                at_empty_mark: gpio.digital_read(pins::WATER_EMPTY_GPIO),
                at_low_mark: gpio.digital_read(pins::WATER_LOW_GPIO),
                overflow: gpio.digital_read(pins::WATER_OVERFLOW_GPIO),
            }),
            Self::Ranging(_) => {
                let trigger = pins::WATER_EMPTY_GPIO;
                gpio.digital_write(trigger, false);
                gpio.delay_us(2);
                gpio.digital_write(trigger, true);
                gpio.delay_us(10);
                gpio.digital_write(trigger, false);

                let echo = gpio.pulse_in(pins::WATER_LOW_GPIO, true, ECHO_TIMEOUT_US);
                ReservoirReading::DistanceCm(echo.map(echo_to_distance_cm))
            }
        }
    }

    /// Interpret an observation. A reading from the other variant is indeterminate.
    pub fn evaluate(&self, reading: &ReservoirReading, solar_volts: Option<f32>) -> ReservoirStatus {
        let status = match (self, reading) {
            (Self::DiscreteSwitch(m), ReservoirReading::Switches(levels)) => {
                m.evaluate(*levels, solar_volts)
            }
            (Self::Ranging(m), ReservoirReading::DistanceCm(distance)) => m.evaluate(*distance),
            _ => ReservoirStatus::indeterminate(None),
        };
        if let Some(fault) = status.fault {
            debug!("Reservoir: indeterminate ({fault})");
        }
        status
    }
}
