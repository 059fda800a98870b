//! Raw ADC counts → volts through a resistive divider.

use serde::{Deserialize, Serialize};

/// Full-scale reading of the 12-bit ADC.
pub const ADC_FULL_SCALE: u16 = 4095;

/// ADC reference used when a channel is reported without its own divider.
pub const ADC_REF_VOLTS: f32 = 3.3;

/// Affine transform `volts = raw * volts_per_count + offset_volts`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoltageDivider {
    pub volts_per_count: f32,
    pub offset_volts: f32,
}

impl VoltageDivider {
    pub const fn new(volts_per_count: f32, offset_volts: f32) -> Self {
        Self {
            volts_per_count,
            offset_volts,
        }
    }

    pub fn to_volts(&self, raw: u16) -> f32 {
        f32::from(raw) * self.volts_per_count + self.offset_volts
    }

    pub fn is_valid(&self) -> bool {
        self.volts_per_count.is_finite()
            && self.volts_per_count > 0.0
            && self.offset_volts.is_finite()
    }
}

/// Percentage of ADC full scale, integer arithmetic (0–100).
pub fn percent_of_full_scale(raw: u16) -> u8 {
    (100 * u32::from(raw.min(ADC_FULL_SCALE)) / u32::from(ADC_FULL_SCALE)) as u8
}

/// Pin voltage at the ADC input, no divider.
pub fn adc_pin_volts(raw: u16) -> f32 {
    f32::from(raw) * ADC_REF_VOLTS / f32::from(ADC_FULL_SCALE)
}
