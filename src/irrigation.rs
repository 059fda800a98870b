//! Irrigation policy: which plant gets water this cycle.
//!
//! Every cycle, for each configured plant:
//!
//! 1. calibrate the freshly acquired moisture batch and publish it,
//! 2. compare against the plant's trigger,
//! 3. run the pump only if the plant is dry, the reservoir has water, and
//!    no other pump was started this cycle.
//!
//! At most one pump runs at a time. Pump ON/OFF telemetry goes out on
//! transitions only.

use heapless::Vec;
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::app::events::TelemetryEvent;
use crate::app::ports::{GpioPort, TelemetrySink};
use crate::config::MAX_PLANTS;
use crate::plant::Plant;
use crate::sensors::reservoir::ReservoirStatus;

/// How the sensor output relates to soil wetness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoisturePolarity {
    /// Lower readings mean drier soil.
    DryBelowTrigger,
    /// Higher readings mean drier soil (capacitive probes).
    DryAboveTrigger,
}

impl MoisturePolarity {
    pub fn needs_water(self, calibrated: u16, trigger: u16) -> bool {
        match self {
            Self::DryBelowTrigger => calibrated < trigger,
            Self::DryAboveTrigger => calibrated > trigger,
        }
    }
}

/// What one irrigation cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleOutcome {
    /// Slot whose pump runs after this cycle.
    pub watering: Option<usize>,
}

#[derive(Debug, Clone, Copy)]
pub struct IrrigationPolicy {
    polarity: MoisturePolarity,
}

impl IrrigationPolicy {
    pub fn new(polarity: MoisturePolarity) -> Self {
        Self { polarity }
    }

    /// Pick the plant to water: the first dry one, if there is water at all.
    ///
    /// `readings` pairs each plant's calibrated value (if any) with its trigger.
    pub fn select(&self, readings: &[(Option<u16>, u16)], water_available: bool) -> Option<usize> {
        if !water_available {
            return None;
        }
        readings.iter().position(|&(value, trigger)| {
            value.is_some_and(|v| self.polarity.needs_water(v, trigger))
        })
    }

    /// Evaluate `plants` (the configured slots only) and drive their pumps.
    pub fn run_cycle(
        &self,
        plants: &mut [Plant],
        triggers: &[u16],
        reservoir: &ReservoirStatus,
        gpio: &mut impl GpioPort,
        sink: &mut impl TelemetrySink,
    ) -> CycleOutcome {
        let mut readings: Vec<(Option<u16>, u16), MAX_PLANTS> = Vec::new();
        for plant in plants.iter_mut() {
            let value = plant.calibrate();
            match plant.moisture_percent() {
                Some(percent) => sink.publish(&TelemetryEvent::Moisture {
                    node: plant.node(),
                    percent,
                }),
                None => warn!("Irrigation: no moisture batch for {}", plant.node()),
            }
            let trigger = triggers.get(plant.slot()).copied().unwrap_or(0);
            // capacity equals MAX_PLANTS; extra plants are never passed in
            let _ = readings.push((value, trigger));
        }

        let chosen = self.select(&readings, reservoir.water_available);

        for (index, plant) in plants.iter_mut().enumerate() {
            let on = chosen == Some(index);
            if plant.set_pump(gpio, on) {
                if on {
                    info!("Irrigation: {} needs water, pump on", plant.node());
                } else {
                    info!("Irrigation: {} pump off", plant.node());
                }
                sink.publish(&TelemetryEvent::PumpSwitch {
                    node: plant.node(),
                    on,
                });
            }
        }

        CycleOutcome {
            watering: chosen.map(|index| plants[index].slot()),
        }
    }
}
