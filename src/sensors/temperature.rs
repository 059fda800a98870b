//! Temperature probes on the shared 1-Wire bus.
//!
//! Probe 0 sits on the control board, probe 1 (if fitted) measures
//! ambient. Readings outside the plausible window are discarded, never
//! published.

use log::{info, warn};

use crate::app::ports::TemperaturePort;
use crate::error::SensorError;

/// Probes the bus is scanned for.
pub const MAX_PROBES: usize = 2;

/// Value the bus driver reports for "no conversion"; doubles as the lower bound.
pub const PROBE_NO_READING_C: f32 = -999.0;
/// Anything at or above this is a bus error.
pub const PROBE_MAX_C: f32 = 85.0;

/// Which probe a temperature came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Board-mounted probe.
    Control,
    /// Secondary (ambient) probe.
    Ambient,
}

impl Probe {
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Control),
            1 => Some(Self::Ambient),
            _ => None,
        }
    }

    /// Telemetry property name.
    pub fn property(&self) -> &'static str {
        match self {
            Self::Control => "control",
            Self::Ambient => "temp",
        }
    }
}

/// Open interval (-999, 85) °C.
pub fn is_plausible(celsius: f32) -> bool {
    celsius > PROBE_NO_READING_C && celsius < PROBE_MAX_C
}

pub fn check_reading(celsius: f32) -> Result<f32, SensorError> {
    if is_plausible(celsius) {
        Ok(celsius)
    } else {
        Err(SensorError::OutOfRange)
    }
}

/// One pass over the bus.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureReadings {
    pub control: Option<f32>,
    pub ambient: Option<f32>,
}

impl TemperatureReadings {
    pub fn get(&self, probe: Probe) -> Option<f32> {
        match probe {
            Probe::Control => self.control,
            Probe::Ambient => self.ambient,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Probe, f32)> + '_ {
        [Probe::Control, Probe::Ambient]
            .into_iter()
            .filter_map(|p| self.get(p).map(|c| (p, c)))
    }
}

/// Read all probes, dropping implausible values.
pub fn read_probes(bus: &mut impl TemperaturePort) -> TemperatureReadings {
    let mut raw = [PROBE_NO_READING_C; MAX_PROBES];
    let answered = bus.read_temperatures(&mut raw).min(MAX_PROBES);

    let mut readings = TemperatureReadings::default();
    for (index, &celsius) in raw.iter().enumerate().take(answered) {
        let Some(probe) = Probe::from_index(index) else {
            continue;
        };
        let celsius = match check_reading(celsius) {
            Ok(celsius) => celsius,
            Err(e) => {
                warn!("Temperature: probe {} {} ({:.2} C), discarded", index, e, celsius);
                continue;
            }
        };
        match probe {
            Probe::Control => readings.control = Some(celsius),
            Probe::Ambient => readings.ambient = Some(celsius),
        }
    }
    readings
}

/// The first conversions after power-up are stale; read twice and throw them away.
pub fn warm_up(bus: &mut impl TemperaturePort) {
    let mut scratch = [PROBE_NO_READING_C; MAX_PROBES];
    let first = bus.read_temperatures(&mut scratch);
    let second = bus.read_temperatures(&mut scratch);
    info!("Temperature: {} probe(s) on bus after warm-up", first.max(second));
}
