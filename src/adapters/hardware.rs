//! Hardware adapter: bridges the board's peripherals to the port traits.
//!
//! Implements [`GpioPort`], [`DelayNs`], [`PowerPort`], [`ClockPort`] and
//! (by delegation to the plugged-in probe bus) [`TemperaturePort`], so a
//! single `&mut HardwareAdapter` satisfies [`Board`](crate::app::ports::Board).
//! This is the only module that reaches into [`hw_init`]. On host builds
//! the helpers fall back to simulation stubs.

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::adapters::time::SystemClock;
use crate::app::ports::{ClockPort, GpioPort, PinMode, PowerPort, TemperaturePort};
use crate::drivers::hw_init::{self, PinDirection};
use crate::error::{Error, Result};

/// Concrete adapter that puts the whole board behind port traits.
pub struct HardwareAdapter<T: TemperaturePort> {
    clock: SystemClock,
    probes: T,
    radio_up: bool,
}

impl<T: TemperaturePort> HardwareAdapter<T> {
    /// Bring up the ADC units and console UART.
    pub fn new(probes: T) -> Result<Self> {
        hw_init::init_peripherals().map_err(|e| {
            warn!("HardwareAdapter: {}", e);
            Error::Init("peripheral bring-up failed")
        })?;
        info!("HardwareAdapter: ready");
        Ok(Self {
            clock: SystemClock::new(),
            probes,
            radio_up: true,
        })
    }

    /// Next byte from the serial console, if one is waiting.
    pub fn console_byte(&mut self) -> Option<u8> {
        hw_init::console_read_byte()
    }

    pub fn is_radio_up(&self) -> bool {
        self.radio_up
    }
}

// ── GpioPort ──────────────────────────────────────────────────

impl<T: TemperaturePort> GpioPort for HardwareAdapter<T> {
    fn set_pin_mode(&mut self, pin: i32, mode: PinMode) {
        let direction = match mode {
            PinMode::Input => PinDirection::Input,
            PinMode::Output => PinDirection::Output,
            PinMode::Analog => PinDirection::Analog,
        };
        if let Err(e) = hw_init::configure_pin(pin, direction) {
            warn!("HardwareAdapter: GPIO{} as {:?}: {}", pin, mode, e);
        }
    }

    fn digital_read(&mut self, pin: i32) -> bool {
        hw_init::gpio_read(pin)
    }

    fn digital_write(&mut self, pin: i32, high: bool) {
        hw_init::gpio_write(pin, high);
    }

    fn analog_read(&mut self, pin: i32) -> u16 {
        hw_init::adc_read(pin)
    }

    fn pulse_in(&mut self, pin: i32, level: bool, timeout_us: u32) -> Option<u32> {
        hw_init::pulse_in(pin, level, timeout_us)
    }
}

impl<T: TemperaturePort> DelayNs for HardwareAdapter<T> {
    fn delay_ns(&mut self, ns: u32) {
        hw_init::delay_us(ns.div_ceil(1_000));
    }

    fn delay_us(&mut self, us: u32) {
        hw_init::delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        hw_init::delay_ms(ms);
    }
}

// ── PowerPort ─────────────────────────────────────────────────

impl<T: TemperaturePort> PowerPort for HardwareAdapter<T> {
    fn radio_off(&mut self) {
        hw_init::radio_stop();
        self.radio_up = false;
    }

    fn radio_on(&mut self) {
        hw_init::radio_start();
        self.radio_up = true;
    }

    fn deep_sleep(&mut self, wake_after_us: Option<u64>) {
        hw_init::deep_sleep(wake_after_us);
    }
}

// ── ClockPort / TemperaturePort ───────────────────────────────

impl<T: TemperaturePort> ClockPort for HardwareAdapter<T> {
    fn millis(&self) -> u64 {
        self.clock.millis()
    }
}

impl<T: TemperaturePort> TemperaturePort for HardwareAdapter<T> {
    fn read_temperatures(&mut self, out: &mut [f32]) -> usize {
        self.probes.read_temperatures(out)
    }
}
