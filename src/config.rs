//! System configuration parameters
//!
//! Everything the controller reads from the settings store, plus the
//! board-specific calibration constants. Values arrive through the
//! device-fabric settings (keyed by the names in [`SettingKey`]) and are
//! persisted by the [`SettingsPort`](crate::app::ports::SettingsPort).

use serde::{Deserialize, Serialize};

use crate::app::ports::ConfigError;
use crate::irrigation::MoisturePolarity;
use crate::sensors::reservoir::ReservoirKind;
use crate::sensors::voltage::VoltageDivider;

/// Number of plant slots on the board.
pub const MAX_PLANTS: usize = 6;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    // --- Sleep ---
    /// Deep-sleep duration between duty cycles (ms). 0 disables deep sleep.
    pub deep_sleep_ms: u32,
    /// Deep-sleep duration used when the panel reports night (ms). 0 = use `deep_sleep_ms`.
    pub night_sleep_ms: u32,

    // --- Watering ---
    /// Pump run budget in seconds. Signed in the settings store; the magnitude is used.
    pub watering_secs: i32,
    /// Number of configured plant slots (0..=MAX_PLANTS).
    pub plant_count: u8,
    /// Per-plant calibrated moisture value at which the pump triggers.
    pub moisture_triggers: [u16; MAX_PLANTS],
    /// Which side of the trigger means "soil is dry".
    pub moisture_polarity: MoisturePolarity,

    // --- Reservoir ---
    /// Level sensing hardware fitted to this board.
    pub reservoir: ReservoirKind,
    /// Ranging variant: distance (cm) at which the reservoir counts as full scale.
    pub water_max_level_cm: u16,

    // --- Timing ---
    /// Minimum awake time before the scheduler may request sleep (seconds).
    pub min_run_time_secs: u32,
    /// Extra margin past the watering ceiling before a forced sleep (ms).
    pub ceiling_margin_ms: u32,
    /// Interval between irrigation evaluations (ms).
    pub irrigation_interval_ms: u32,
    /// Battery/solar telemetry interval (ms).
    pub power_report_interval_ms: u32,
    /// Temperature probe read interval (ms).
    pub temperature_interval_ms: u32,

    // --- Board ---
    pub calibration: HardwareCalibration,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Sleep
            deep_sleep_ms: 0,
            night_sleep_ms: 0,

            // Watering
            watering_secs: 60,
            plant_count: 0,
            moisture_triggers: [0; MAX_PLANTS],
            moisture_polarity: MoisturePolarity::DryBelowTrigger,

            // Reservoir
            reservoir: ReservoirKind::FloatSwitches,
            water_max_level_cm: 50,

            // Timing
            min_run_time_secs: 5,
            ceiling_margin_ms: 5_000,
            irrigation_interval_ms: 10_000,
            power_report_interval_ms: 1_500,
            temperature_interval_ms: 30_000,

            calibration: HardwareCalibration::default(),
        }
    }
}

/// Hardware calibration values. These belong to the board, not to policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareCalibration {
    /// Battery divider (raw ADC counts → volts).
    pub battery: VoltageDivider,
    /// Solar panel divider (raw ADC counts → volts).
    pub solar: VoltageDivider,
    /// Below this battery voltage the sleep time is stretched and the device sleeps at once.
    pub min_battery_volts: f32,
    /// Below this panel voltage it is night.
    pub min_solar_volts: f32,
    /// Float switches are only powered (and trusted) above this panel voltage.
    pub switch_solar_volts: f32,
    /// Sleep-time multiplier applied on an empty battery.
    pub empty_battery_multiplier: u32,
}

impl Default for HardwareCalibration {
    fn default() -> Self {
        Self {
            // 1:2 divider in front of the 3.3 V ADC
            battery: VoltageDivider::new(3.3 * 2.0 / 4095.0, 0.0),
            // 1:6 divider on the panel input
            solar: VoltageDivider::new(3.3 * 6.0 / 4095.0, 0.0),
            min_battery_volts: 3.5,
            min_solar_volts: 4.0,
            switch_solar_volts: 6.0,
            empty_battery_multiplier: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Keyed settings
// ---------------------------------------------------------------------------

/// Setting names as exposed by the device-fabric settings store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    DeepSleep,
    NightSleep,
    Watering,
    Plants,
    WaterMaxLevel,
    /// Moisture trigger of the plant at this slot index.
    MoistTrigger(usize),
}

impl SettingKey {
    /// Parse a settings-store key (`"deepsleep"`, `"moist3"`, ...).
    pub fn parse(key: &str) -> Option<Self> {
        match key {
            "deepsleep" => Some(Self::DeepSleep),
            "nightsleep" => Some(Self::NightSleep),
            "watering" => Some(Self::Watering),
            "plants" => Some(Self::Plants),
            "watermaxlevel" => Some(Self::WaterMaxLevel),
            _ => {
                let slot: usize = key.strip_prefix("moist")?.parse().ok()?;
                (1..=MAX_PLANTS)
                    .contains(&slot)
                    .then_some(Self::MoistTrigger(slot - 1))
            }
        }
    }
}

impl ControllerConfig {
    /// Deep sleep is enabled whenever a default sleep duration is configured.
    pub fn deep_sleep_enabled(&self) -> bool {
        self.deep_sleep_ms > 0
    }

    /// Watering budget magnitude in milliseconds.
    pub fn watering_ms(&self) -> u64 {
        u64::from(self.watering_secs.unsigned_abs()) * 1000
    }

    /// Minimum awake time in milliseconds.
    pub fn min_run_time_ms(&self) -> u64 {
        u64::from(self.min_run_time_secs) * 1000
    }

    /// Moisture trigger for a plant slot.
    pub fn moisture_trigger(&self, slot: usize) -> u16 {
        self.moisture_triggers.get(slot).copied().unwrap_or(0)
    }

    /// Apply one keyed setting.
    ///
    /// The candidate is validated as a whole before it is committed, so a
    /// refused value leaves the previous one in effect.
    pub fn apply(&mut self, key: SettingKey, value: i64) -> Result<(), ConfigError> {
        let mut candidate = self.clone();
        match key {
            SettingKey::DeepSleep => {
                candidate.deep_sleep_ms = u32::try_from(value)
                    .map_err(|_| ConfigError::ValidationFailed("deepsleep must be >= 0"))?;
            }
            SettingKey::NightSleep => {
                candidate.night_sleep_ms = u32::try_from(value)
                    .map_err(|_| ConfigError::ValidationFailed("nightsleep must be >= 0"))?;
            }
            SettingKey::Watering => {
                candidate.watering_secs = i32::try_from(value)
                    .map_err(|_| ConfigError::ValidationFailed("watering out of range"))?;
            }
            SettingKey::Plants => {
                candidate.plant_count = u8::try_from(value)
                    .map_err(|_| ConfigError::ValidationFailed("plants must be 0–6"))?;
            }
            SettingKey::WaterMaxLevel => {
                candidate.water_max_level_cm = u16::try_from(value)
                    .map_err(|_| ConfigError::ValidationFailed("watermaxlevel must be 1–500"))?;
            }
            SettingKey::MoistTrigger(slot) => {
                let trigger = u16::try_from(value)
                    .map_err(|_| ConfigError::ValidationFailed("moist trigger must be 0–4095"))?;
                let Some(entry) = candidate.moisture_triggers.get_mut(slot) else {
                    return Err(ConfigError::UnknownKey);
                };
                *entry = trigger;
            }
        }
        candidate.validate()?;
        *self = candidate;
        Ok(())
    }

    /// Range-check every field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        const DAY_MS: u32 = 24 * 60 * 60 * 1000;

        if self.deep_sleep_ms > DAY_MS {
            return Err(ConfigError::ValidationFailed("deepsleep must be at most 24 h"));
        }
        if self.night_sleep_ms > DAY_MS {
            return Err(ConfigError::ValidationFailed("nightsleep must be at most 24 h"));
        }
        if self.watering_secs.unsigned_abs() > 3600 {
            return Err(ConfigError::ValidationFailed("watering must be within ±3600 s"));
        }
        if usize::from(self.plant_count) > MAX_PLANTS {
            return Err(ConfigError::ValidationFailed("plants must be 0–6"));
        }
        if self.moisture_triggers.iter().any(|&t| t > 4095) {
            return Err(ConfigError::ValidationFailed("moist trigger must be 0–4095"));
        }
        if !(1..=500).contains(&self.water_max_level_cm) {
            return Err(ConfigError::ValidationFailed("watermaxlevel must be 1–500"));
        }
        if self.irrigation_interval_ms == 0
            || self.power_report_interval_ms == 0
            || self.temperature_interval_ms == 0
        {
            return Err(ConfigError::ValidationFailed("intervals must be non-zero"));
        }
        self.calibration.validate()
    }
}

impl HardwareCalibration {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.battery.is_valid() || !self.solar.is_valid() {
            return Err(ConfigError::ValidationFailed("divider scale must be positive"));
        }
        if !(1..=100).contains(&self.empty_battery_multiplier) {
            return Err(ConfigError::ValidationFailed(
                "empty_battery_multiplier must be 1–100",
            ));
        }
        if !(self.min_battery_volts.is_finite()
            && self.min_solar_volts.is_finite()
            && self.switch_solar_volts.is_finite())
        {
            return Err(ConfigError::ValidationFailed("voltage thresholds must be finite"));
        }
        Ok(())
    }
}
