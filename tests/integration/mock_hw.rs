//! Mock board for integration tests.
//!
//! Records every radio, write and sleep call so tests can assert on the
//! full history without touching real GPIO/ADC registers. Inputs (analog
//! levels, switch levels, the echo pulse, probe temperatures, the clock)
//! are plain fields the test sets up front.

use std::collections::HashMap;

use embedded_hal::delay::DelayNs;
use plantctrl::app::events::TelemetryEvent;
use plantctrl::app::ports::{ClockPort, GpioPort, PinMode, PowerPort, TelemetrySink, TemperaturePort};
use plantctrl::pins;

/// ≈4.03 V through the default battery divider.
pub const HEALTHY_BATTERY_RAW: u16 = 2500;
/// ≈2.9 V, below the empty-battery threshold.
pub const EMPTY_BATTERY_RAW: u16 = 1800;
/// ≈9.7 V on the panel: daylight, float switches powered.
pub const SUNNY_SOLAR_RAW: u16 = 2000;
/// ≈0.5 V on the panel: night.
pub const DARK_SOLAR_RAW: u16 = 100;

// ── Board call record ─────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum BoardCall {
    Mode { pin: i32, mode: PinMode },
    Write { pin: i32, high: bool },
    AnalogRead { pin: i32 },
    RadioOff,
    RadioOn,
    DeepSleep(Option<u64>),
}

// ── MockBoard ─────────────────────────────────────────────────

pub struct MockBoard {
    pub calls: Vec<BoardCall>,
    pub analog: HashMap<i32, u16>,
    pub digital: HashMap<i32, bool>,
    pub echo_us: Option<u32>,
    pub temperatures: Vec<f32>,
    pub now_ms: u64,
    /// Moisture (ADC2) reads taken while the radio was up.
    pub unfenced_adc2_reads: usize,
    radio_up: bool,
    outputs: HashMap<i32, bool>,
}

#[allow(dead_code)]
impl MockBoard {
    /// Healthy battery, sunny panel, both float switches wet, button released.
    pub fn new() -> Self {
        let mut board = Self {
            calls: Vec::new(),
            analog: HashMap::new(),
            digital: HashMap::new(),
            echo_us: None,
            temperatures: Vec::new(),
            now_ms: 0,
            unfenced_adc2_reads: 0,
            radio_up: true,
            outputs: HashMap::new(),
        };
        board.set_power(HEALTHY_BATTERY_RAW, SUNNY_SOLAR_RAW);
        board.set_switches(true, true);
        board.release_button();
        board
    }

    pub fn set_power(&mut self, battery_raw: u16, solar_raw: u16) {
        self.analog.insert(pins::BATTERY_ADC_GPIO, battery_raw);
        self.analog.insert(pins::SOLAR_ADC_GPIO, solar_raw);
    }

    pub fn set_moisture(&mut self, slot: usize, raw: u16) {
        self.analog.insert(pins::MOISTURE_SENSOR_GPIO[slot], raw);
    }

    pub fn set_switches(&mut self, at_empty_mark: bool, at_low_mark: bool) {
        self.digital.insert(pins::WATER_EMPTY_GPIO, at_empty_mark);
        self.digital.insert(pins::WATER_LOW_GPIO, at_low_mark);
        self.digital.insert(pins::WATER_OVERFLOW_GPIO, false);
    }

    /// Active low.
    pub fn press_button(&mut self) {
        self.digital.insert(pins::BUTTON_GPIO, false);
    }

    pub fn release_button(&mut self) {
        self.digital.insert(pins::BUTTON_GPIO, true);
    }

    pub fn advance(&mut self, ms: u64) {
        self.now_ms += ms;
    }

    /// Last level written to `pin` (low if never written).
    pub fn output(&self, pin: i32) -> bool {
        self.outputs.get(&pin).copied().unwrap_or(false)
    }

    pub fn pump_outputs(&self) -> Vec<bool> {
        pins::PUMP_GPIO.iter().map(|&pin| self.output(pin)).collect()
    }

    pub fn is_radio_up(&self) -> bool {
        self.radio_up
    }

    pub fn count(&self, call: &BoardCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    pub fn sleeps(&self) -> Vec<Option<u64>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                BoardCall::DeepSleep(us) => Some(*us),
                _ => None,
            })
            .collect()
    }
}

impl Default for MockBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl GpioPort for MockBoard {
    fn set_pin_mode(&mut self, pin: i32, mode: PinMode) {
        self.calls.push(BoardCall::Mode { pin, mode });
    }

    fn digital_read(&mut self, pin: i32) -> bool {
        self.digital.get(&pin).copied().unwrap_or(false)
    }

    fn digital_write(&mut self, pin: i32, high: bool) {
        self.calls.push(BoardCall::Write { pin, high });
        self.outputs.insert(pin, high);
    }

    fn analog_read(&mut self, pin: i32) -> u16 {
        self.calls.push(BoardCall::AnalogRead { pin });
        if self.radio_up && pins::MOISTURE_SENSOR_GPIO.contains(&pin) {
            self.unfenced_adc2_reads += 1;
        }
        self.analog.get(&pin).copied().unwrap_or(0)
    }

    fn pulse_in(&mut self, _pin: i32, _level: bool, _timeout_us: u32) -> Option<u32> {
        self.echo_us
    }
}

impl DelayNs for MockBoard {
    fn delay_ns(&mut self, _ns: u32) {}
}

impl PowerPort for MockBoard {
    fn radio_off(&mut self) {
        self.calls.push(BoardCall::RadioOff);
        self.radio_up = false;
    }

    fn radio_on(&mut self) {
        self.calls.push(BoardCall::RadioOn);
        self.radio_up = true;
    }

    fn deep_sleep(&mut self, wake_after_us: Option<u64>) {
        self.calls.push(BoardCall::DeepSleep(wake_after_us));
    }
}

impl ClockPort for MockBoard {
    fn millis(&self) -> u64 {
        self.now_ms
    }
}

impl TemperaturePort for MockBoard {
    fn read_temperatures(&mut self, out: &mut [f32]) -> usize {
        let n = self.temperatures.len().min(out.len());
        out[..n].copy_from_slice(&self.temperatures[..n]);
        n
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<TelemetryEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch states published for `node`, in order.
    pub fn switches(&self, node: &str) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::PumpSwitch { node: n, on } if *n == node => Some(*on),
                _ => None,
            })
            .collect()
    }

    pub fn water_remaining(&self) -> Vec<Option<u8>> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::WaterRemaining(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    pub fn moisture(&self, node: &str) -> Vec<u8> {
        self.events
            .iter()
            .filter_map(|e| match e {
                TelemetryEvent::Moisture { node: n, percent } if *n == node => Some(*percent),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl TelemetrySink for RecordingSink {
    fn publish(&mut self, event: &TelemetryEvent) {
        self.events.push(*event);
    }
}
