//! Temperature bus placeholder.
//!
//! The 1-Wire driver lives outside this crate. Until one is plugged into
//! [`HardwareAdapter`](super::hardware::HardwareAdapter), this bus answers
//! with no probes, so temperature telemetry is simply skipped.

use crate::app::ports::TemperaturePort;

#[derive(Debug, Default, Clone, Copy)]
pub struct NullProbeBus;

impl TemperaturePort for NullProbeBus {
    fn read_temperatures(&mut self, _out: &mut [f32]) -> usize {
        0
    }
}
