//! Plant slots: one moisture sensor and one pump each.
//!
//! The slot table is built once at startup. Telemetry node names come from
//! a static lookup so nothing is formatted at runtime.

use heapless::Vec;

use crate::app::ports::{GpioPort, PinMode};
use crate::config::MAX_PLANTS;
use crate::drivers::pump::PumpDriver;
use crate::pins;
use crate::sensors::calibrator::{Calibrator, SAMPLES_PER_READING};
use crate::sensors::voltage::percent_of_full_scale;

/// Telemetry node id of each slot.
pub const PLANT_NODES: [&str; MAX_PLANTS] = ["plant1", "plant2", "plant3", "plant4", "plant5", "plant6"];

pub struct Plant {
    slot: usize,
    sensor_pin: i32,
    pump: PumpDriver,
    moisture: Calibrator<SAMPLES_PER_READING>,
    calibrated: Option<u16>,
}

impl Plant {
    pub fn new(slot: usize) -> Option<Self> {
        Some(Self {
            slot,
            sensor_pin: *pins::MOISTURE_SENSOR_GPIO.get(slot)?,
            pump: PumpDriver::new(*pins::PUMP_GPIO.get(slot)?),
            moisture: Calibrator::new(),
            calibrated: None,
        })
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn node(&self) -> &'static str {
        PLANT_NODES[self.slot]
    }

    pub fn sensor_pin(&self) -> i32 {
        self.sensor_pin
    }

    pub fn pump_pin(&self) -> i32 {
        self.pump.pin()
    }

    pub fn init_sensor(&self, gpio: &mut impl GpioPort) {
        gpio.set_pin_mode(self.sensor_pin, PinMode::Analog);
    }

    pub fn init_pump(&mut self, gpio: &mut impl GpioPort) {
        self.pump.init(gpio);
    }

    /// Start a fresh batch of moisture samples.
    pub fn reset_samples(&mut self) {
        self.moisture.reset();
    }

    pub fn sample_moisture(&mut self, gpio: &mut impl GpioPort) {
        let raw = gpio.analog_read(self.sensor_pin);
        self.moisture.add_sample(raw);
    }

    /// Average the collected batch. Keeps the previous value if the batch is incomplete.
    pub fn calibrate(&mut self) -> Option<u16> {
        if let Some(value) = self.moisture.average() {
            self.calibrated = Some(value);
        }
        self.calibrated
    }

    pub fn calibrated(&self) -> Option<u16> {
        self.calibrated
    }

    pub fn moisture_percent(&self) -> Option<u8> {
        self.calibrated.map(percent_of_full_scale)
    }

    pub fn is_pump_active(&self) -> bool {
        self.pump.is_active()
    }

    /// Returns `true` on a state transition.
    pub fn set_pump(&mut self, gpio: &mut impl GpioPort, on: bool) -> bool {
        self.pump.set(gpio, on)
    }
}

/// Every physical slot, in order.
pub fn build_plants() -> Vec<Plant, MAX_PLANTS> {
    (0..MAX_PLANTS).filter_map(Plant::new).collect()
}
