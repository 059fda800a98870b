//! Sleep planning and the per-tick sleep decision.
//!
//! Two questions, asked at different times:
//!
//! ```text
//!   wake ──▶ plan(battery, solar) ──▶ SleepPlan { how long, sleep now? }
//!
//!   tick ──▶ evaluate(elapsed, pump, water) ──▶ StayAwake | Sleep(reason)
//! ```
//!
//! Rules, checked in order by [`PowerScheduler::evaluate`] (all require deep
//! sleep to be enabled):
//!
//! | Rule     | Condition                                              |
//! |----------|--------------------------------------------------------|
//! | Idle     | past min run time, no pump running, no water           |
//! | Maximum  | past min run + watering + margin                       |
//! | Ceiling  | past min run + watering                                |

use log::{info, warn};

use crate::config::ControllerConfig;

/// Why the wake timer was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanReason {
    /// No sleep duration configured; the device stays awake.
    NoTimer,
    Default,
    Night,
    EmptyBattery,
}

/// Decided once per wake from the first calibrated power readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepPlan {
    pub wake_after_ms: Option<u64>,
    /// Skip the duty cycle and suspend on the first tick.
    pub sleep_immediately: bool,
    pub reason: PlanReason,
}

impl SleepPlan {
    pub fn wake_after_us(&self) -> Option<u64> {
        self.wake_after_ms.map(|ms| ms.saturating_mul(1000))
    }
}

/// Why the loop decided to suspend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepReason {
    /// Nothing running and no water to run with.
    Idle,
    /// Watering budget exhausted.
    Ceiling,
    /// Hard upper bound on time awake.
    Maximum,
    /// Battery below the minimum at wake.
    EmptyBattery,
}

impl core::fmt::Display for SleepReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Idle => write!(f, "nothing to do"),
            Self::Ceiling => write!(f, "watering time over"),
            Self::Maximum => write!(f, "maximum awake time reached"),
            Self::EmptyBattery => write!(f, "battery empty"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepDecision {
    StayAwake,
    Sleep(SleepReason),
}

#[derive(Debug, Clone, Copy)]
pub struct PowerScheduler {
    deep_sleep_ms: u64,
    night_sleep_ms: u64,
    min_run_ms: u64,
    watering_ms: u64,
    margin_ms: u64,
    min_battery_volts: f32,
    min_solar_volts: f32,
    empty_battery_multiplier: u64,
}

impl PowerScheduler {
    pub fn new(config: &ControllerConfig) -> Self {
        Self {
            deep_sleep_ms: u64::from(config.deep_sleep_ms),
            night_sleep_ms: u64::from(config.night_sleep_ms),
            min_run_ms: config.min_run_time_ms(),
            watering_ms: config.watering_ms(),
            margin_ms: u64::from(config.ceiling_margin_ms),
            min_battery_volts: config.calibration.min_battery_volts,
            min_solar_volts: config.calibration.min_solar_volts,
            empty_battery_multiplier: u64::from(config.calibration.empty_battery_multiplier),
        }
    }

    pub fn deep_sleep_enabled(&self) -> bool {
        self.deep_sleep_ms > 0
    }

    /// Choose the wake timer. Unknown readings never trigger night or empty-battery handling.
    pub fn plan(&self, battery_volts: Option<f32>, solar_volts: Option<f32>) -> SleepPlan {
        let night = solar_volts.is_some_and(|v| v < self.min_solar_volts);
        let empty = battery_volts.is_some_and(|v| v < self.min_battery_volts);

        if empty && self.deep_sleep_enabled() {
            let ms = self.deep_sleep_ms.saturating_mul(self.empty_battery_multiplier);
            warn!(
                "PowerScheduler: battery {:?} V below {} V, sleeping {} ms",
                battery_volts, self.min_battery_volts, ms
            );
            return SleepPlan {
                wake_after_ms: Some(ms),
                sleep_immediately: true,
                reason: PlanReason::EmptyBattery,
            };
        }

        let plan = if night && self.night_sleep_ms > 0 {
            SleepPlan {
                wake_after_ms: Some(self.night_sleep_ms),
                sleep_immediately: false,
                reason: PlanReason::Night,
            }
        } else if self.deep_sleep_enabled() {
            SleepPlan {
                wake_after_ms: Some(self.deep_sleep_ms),
                sleep_immediately: false,
                reason: PlanReason::Default,
            }
        } else {
            SleepPlan {
                wake_after_ms: None,
                sleep_immediately: false,
                reason: PlanReason::NoTimer,
            }
        };
        info!("PowerScheduler: plan {:?}", plan);
        plan
    }

    /// Per-tick decision. `elapsed_ms` counts from wake.
    pub fn evaluate(&self, elapsed_ms: u64, pump_active: bool, water_available: bool) -> SleepDecision {
        if !self.deep_sleep_enabled() || elapsed_ms < self.min_run_ms {
            return SleepDecision::StayAwake;
        }
        if !pump_active && !water_available {
            return SleepDecision::Sleep(SleepReason::Idle);
        }
        let ceiling = self.min_run_ms + self.watering_ms;
        if elapsed_ms >= ceiling + self.margin_ms {
            return SleepDecision::Sleep(SleepReason::Maximum);
        }
        if elapsed_ms >= ceiling {
            return SleepDecision::Sleep(SleepReason::Ceiling);
        }
        SleepDecision::StayAwake
    }
}
