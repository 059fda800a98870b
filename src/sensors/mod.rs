//! Sensor subsystem: individual sensors and the aggregating [`SensorHub`].
//!
//! ## Radio fencing
//!
//! The moisture inputs sit on ADC2, which the radio owns while it is up.
//! Sampling them therefore needs a [`RadioSilence`] token, and the only way
//! to obtain one is [`with_radio_off`]:
//!
//! ```text
//!   radio_off ─▶ sensor supply on ─▶ settle ─▶ N × (plants) ─▶ reservoir
//!             ─▶ sensor supply off ─▶ radio_on
//! ```
//!
//! Battery and solar live on ADC1 and are sampled freely, one sample per
//! control tick.

pub mod calibrator;
pub mod reservoir;
pub mod temperature;
pub mod voltage;

use log::{debug, info};

use crate::app::ports::{GpioPort, PinMode, PowerPort};
use crate::config::HardwareCalibration;
use crate::pins;
use crate::plant::Plant;
use calibrator::{CalibratedChannel, SAMPLES_PER_READING};
use reservoir::{ReservoirMonitor, ReservoirReading};
use voltage::VoltageDivider;

/// Supply settle time before the first sample (ms).
pub const SENSOR_SETTLE_MS: u32 = 100;

/// Boards with fewer plants than this feed the sensors from the 4th pump output as well.
pub const AUX_SUPPLY_BELOW_PLANTS: u8 = 4;

/// Proof that the radio is down. Only [`with_radio_off`] can make one.
#[derive(Debug)]
pub struct RadioSilence {
    _private: (),
}

/// Run `f` with the radio off, restoring it afterwards.
pub fn with_radio_off<H, R>(hw: &mut H, f: impl FnOnce(&mut H, &RadioSilence) -> R) -> R
where
    H: PowerPort + ?Sized,
{
    hw.radio_off();
    let token = RadioSilence { _private: () };
    let result = f(hw, &token);
    hw.radio_on();
    result
}

/// Battery and solar channels plus the sensor supply switch.
pub struct SensorHub {
    battery: CalibratedChannel<SAMPLES_PER_READING>,
    solar: CalibratedChannel<SAMPLES_PER_READING>,
    battery_divider: VoltageDivider,
    solar_divider: VoltageDivider,
    aux_supply: bool,
    powered: bool,
}

impl SensorHub {
    pub fn new(calibration: &HardwareCalibration, plant_count: u8) -> Self {
        Self {
            battery: CalibratedChannel::new(),
            solar: CalibratedChannel::new(),
            battery_divider: calibration.battery,
            solar_divider: calibration.solar,
            aux_supply: plant_count < AUX_SUPPLY_BELOW_PLANTS,
            powered: false,
        }
    }

    pub fn init_pins(&self, gpio: &mut impl GpioPort) {
        gpio.set_pin_mode(pins::BATTERY_ADC_GPIO, PinMode::Analog);
        gpio.set_pin_mode(pins::SOLAR_ADC_GPIO, PinMode::Analog);
        gpio.set_pin_mode(pins::SENSOR_POWER_GPIO, PinMode::Output);
        gpio.digital_write(pins::SENSOR_POWER_GPIO, false);
    }

    // ── Power channels ────────────────────────────────────────

    /// Take one battery and one solar sample. Returns `true` when both
    /// channels completed a fresh reading.
    pub fn sample_power(&mut self, gpio: &mut impl GpioPort) -> bool {
        let battery = self.battery.push(gpio.analog_read(pins::BATTERY_ADC_GPIO));
        let solar = self.solar.push(gpio.analog_read(pins::SOLAR_ADC_GPIO));
        battery.is_some() && solar.is_some()
    }

    /// Sample until both channels hold a fresh reading.
    pub fn fill_power(&mut self, gpio: &mut impl GpioPort) {
        for _ in 0..SAMPLES_PER_READING {
            if self.sample_power(gpio) {
                return;
            }
        }
    }

    pub fn battery_raw(&self) -> Option<u16> {
        self.battery.value()
    }

    pub fn solar_raw(&self) -> Option<u16> {
        self.solar.value()
    }

    pub fn battery_volts(&self) -> Option<f32> {
        self.battery.value().map(|raw| self.battery_divider.to_volts(raw))
    }

    pub fn solar_volts(&self) -> Option<f32> {
        self.solar.value().map(|raw| self.solar_divider.to_volts(raw))
    }

    // ── Sensor supply ─────────────────────────────────────────

    pub fn is_powered(&self) -> bool {
        self.powered
    }

    /// Switch the moisture/level sensor supply.
    pub fn set_sensor_power(&mut self, gpio: &mut impl GpioPort, on: bool) {
        gpio.digital_write(pins::SENSOR_POWER_GPIO, on);
        if self.aux_supply {
            gpio.set_pin_mode(pins::AUX_PUMP_GPIO, PinMode::Output);
            gpio.digital_write(pins::AUX_PUMP_GPIO, on);
        }
        self.powered = on;
    }

    // ── Fenced acquisition ────────────────────────────────────

    /// Sample every plant `N` times and take one reservoir observation.
    ///
    /// Each plant starts from an empty batch, so afterwards every plant holds
    /// exactly one full batch ready for calibration.
    pub fn acquire(
        &mut self,
        gpio: &mut impl GpioPort,
        _silence: &RadioSilence,
        plants: &mut [Plant],
        reservoir: &ReservoirMonitor,
    ) -> ReservoirReading {
        self.set_sensor_power(gpio, true);
        gpio.delay_ms(SENSOR_SETTLE_MS);

        for plant in plants.iter_mut() {
            plant.reset_samples();
        }
        for _ in 0..SAMPLES_PER_READING {
            for plant in plants.iter_mut() {
                plant.sample_moisture(gpio);
            }
        }
        let reading = reservoir.acquire(gpio);
        debug!("SensorHub: acquired {} plant batches, reservoir {:?}", plants.len(), reading);

        self.set_sensor_power(gpio, false);
        reading
    }

    /// Log the power channels.
    pub fn log_power(&self) {
        info!(
            "SensorHub: battery {:?} raw ({:?} V), solar {:?} raw ({:?} V)",
            self.battery_raw(),
            self.battery_volts(),
            self.solar_raw(),
            self.solar_volts()
        );
    }
}
