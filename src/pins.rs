//! GPIO / peripheral pin assignments for the PlantCtrl main board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

use crate::config::MAX_PLANTS;

// ---------------------------------------------------------------------------
// Plant slots
// ---------------------------------------------------------------------------

/// Moisture sensor inputs, one per plant slot.
/// These sit on ADC2 and cannot be sampled while the radio is up.
pub const MOISTURE_SENSOR_GPIO: [i32; MAX_PLANTS] = [25, 26, 27, 14, 12, 13];

/// Pump outputs, one per plant slot (active HIGH).
pub const PUMP_GPIO: [i32; MAX_PLANTS] = [15, 5, 18, 19, 21, 22];

/// The 4th pump output doubles as an extra sensor supply on boards fitted
/// with fewer than four plants.
pub const AUX_PUMP_SLOT: usize = 3;
pub const AUX_PUMP_GPIO: i32 = PUMP_GPIO[AUX_PUMP_SLOT];

// ---------------------------------------------------------------------------
// Sensor supply
// ---------------------------------------------------------------------------

/// Switched supply for the moisture and level sensors (active HIGH).
pub const SENSOR_POWER_GPIO: i32 = 17;

// ---------------------------------------------------------------------------
// Power measurement (ADC1)
// ---------------------------------------------------------------------------

/// Battery voltage through a resistive divider.
pub const BATTERY_ADC_GPIO: i32 = 34;
/// Solar panel voltage through a resistive divider.
pub const SOLAR_ADC_GPIO: i32 = 35;

// ---------------------------------------------------------------------------
// Reservoir
// ---------------------------------------------------------------------------

/// Float switch at the empty mark. Ranging variant: ultrasonic trigger output.
pub const WATER_EMPTY_GPIO: i32 = 16;
/// Float switch at the low mark. Ranging variant: ultrasonic echo input.
pub const WATER_LOW_GPIO: i32 = 4;
/// Overflow float switch (informational only).
pub const WATER_OVERFLOW_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

/// DS18B20 1-Wire bus.
pub const TEMPERATURE_BUS_GPIO: i32 = 23;

/// Self-test push-button (active LOW with external pull-up).
pub const BUTTON_GPIO: i32 = 0;
