//! Control core: one [`Controller`] per wake cycle.
//!
//! [`Controller`] owns every piece of runtime state: plant slots, sensor
//! accumulators, reservoir status, the sleep plan and the diagnostic
//! session. Nothing lives in globals. All I/O flows through port traits
//! injected at call sites, so the whole core runs against mock adapters.
//!
//! ```text
//!  Board (GPIO · ADC · radio · clock · probes)
//!        │                                     ┌──▶ TelemetrySink
//!        ▼                                     │
//!  ┌──────────────────────────────────────────────┐
//!  │  Controller                                  │
//!  │  SensorHub · ReservoirMonitor · Irrigation   │
//!  │  PowerScheduler · DiagnosticSession          │
//!  └──────────────────────────────────────────────┘
//! ```
//!
//! Lifecycle: [`Controller::wake`] once, then [`Controller::tick`] until it
//! returns [`TickOutcome::Suspended`]. On target the suspend never returns.

use heapless::Vec;
use log::{info, warn};

use crate::config::{ControllerConfig, MAX_PLANTS};
use crate::diagnostics::{DiagnosticSession, DiagnosticStep, SessionEvent};
use crate::drivers::button::ButtonDriver;
use crate::error::{CommandError, Result};
use crate::irrigation::IrrigationPolicy;
use crate::pins;
use crate::plant::{build_plants, Plant};
use crate::power::{PlanReason, PowerScheduler, SleepDecision, SleepPlan, SleepReason};
use crate::sensors::reservoir::{ReservoirMonitor, ReservoirReading, ReservoirStatus};
use crate::sensors::temperature::{self, TemperatureReadings};
use crate::sensors::voltage::{adc_pin_volts, percent_of_full_scale};
use crate::sensors::{with_radio_off, SensorHub};

use super::commands::{ConsoleCommand, PumpCommand};
use super::events::TelemetryEvent;
use super::ports::{Board, GpioPort, PinMode, TelemetrySink};

/// Result of one control tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Normal loop ran.
    Running,
    /// A diagnostic session owns the board; the loop was skipped.
    Diagnostic,
    /// Outputs are off and deep sleep was requested.
    Suspended(SleepReason),
}

/// Everything a diagnostic sensor report printed.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticReport {
    pub reservoir: ReservoirReading,
    /// Calibrated moisture of every physical slot.
    pub moisture: [Option<u16>; MAX_PLANTS],
    pub battery_raw: Option<u16>,
    pub solar_raw: Option<u16>,
    pub temperatures: TemperatureReadings,
}

// ───────────────────────────────────────────────────────────────
// Controller
// ───────────────────────────────────────────────────────────────

pub struct Controller {
    config: ControllerConfig,
    plants: Vec<Plant, MAX_PLANTS>,
    sensors: SensorHub,
    reservoir: ReservoirMonitor,
    reservoir_status: ReservoirStatus,
    /// Acquisition not yet consumed by a cycle or report.
    fresh_reading: Option<ReservoirReading>,
    policy: IrrigationPolicy,
    scheduler: PowerScheduler,
    sleep_plan: SleepPlan,
    sleep_request: Option<SleepReason>,
    session: DiagnosticSession,
    button: ButtonDriver,
    wake_ms: u64,
    next_irrigation_ms: u64,
    next_power_report_ms: u64,
    next_temperature_ms: u64,
    cycles: u64,
    last_report: Option<DiagnosticReport>,
}

impl Controller {
    /// Build the controller from validated settings. Touches no hardware.
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            plants: build_plants(),
            sensors: SensorHub::new(&config.calibration, config.plant_count),
            reservoir: ReservoirMonitor::from_config(&config),
            reservoir_status: ReservoirStatus::default(),
            fresh_reading: None,
            policy: IrrigationPolicy::new(config.moisture_polarity),
            scheduler: PowerScheduler::new(&config),
            sleep_plan: SleepPlan {
                wake_after_ms: None,
                sleep_immediately: false,
                reason: PlanReason::NoTimer,
            },
            sleep_request: None,
            session: DiagnosticSession::new(),
            button: ButtonDriver::new(pins::BUTTON_GPIO),
            wake_ms: 0,
            next_irrigation_ms: 0,
            next_power_report_ms: 0,
            next_temperature_ms: 0,
            cycles: 0,
            last_report: None,
            config,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the board up after a wake: pins, first samples, sleep plan,
    /// probe warm-up and the initial OFF state of every configured pump.
    pub fn wake<B: Board>(&mut self, hw: &mut B, sink: &mut impl TelemetrySink) {
        self.wake_ms = hw.millis();

        self.button.init(hw);
        self.sensors.init_pins(hw);
        self.reservoir.init_pins(hw);
        for plant in self.plants.iter() {
            plant.init_sensor(hw);
        }
        let count = self.plant_count();
        for plant in self.plants[..count].iter_mut() {
            plant.init_pump(hw);
        }

        let reading = self.acquire(hw);
        self.fresh_reading = Some(reading);

        self.sensors.fill_power(hw);
        self.sensors.log_power();

        self.sleep_plan = self
            .scheduler
            .plan(self.sensors.battery_volts(), self.sensors.solar_volts());
        if self.sleep_plan.sleep_immediately {
            self.sleep_request = Some(SleepReason::EmptyBattery);
        }

        temperature::warm_up(hw);

        for plant in self.plants[..count].iter() {
            sink.publish(&TelemetryEvent::PumpSwitch {
                node: plant.node(),
                on: false,
            });
        }

        self.next_irrigation_ms = self.wake_ms;
        self.next_power_report_ms = self.wake_ms;
        self.next_temperature_ms = self.wake_ms;

        info!(
            "Controller: awake with {} plant(s), {:?} reservoir, watering {} s, sleep {:?}",
            count,
            self.reservoir.kind(),
            self.config.watering_secs.unsigned_abs(),
            self.sleep_plan.reason
        );
    }

    /// One pass of the cooperative loop.
    pub fn tick<B: Board>(&mut self, hw: &mut B, sink: &mut impl TelemetrySink) -> TickOutcome {
        if let Some(reason) = self.sleep_request {
            self.suspend(hw, sink, reason);
            return TickOutcome::Suspended(reason);
        }

        let now = hw.millis();

        // 1. Diagnostic session (exclusive with the control loop)
        let pressed = self.button.poll(hw, now);
        if let Some(event) = self.session.on_button(pressed) {
            self.handle_session_event(event, hw);
        }
        if self.session.is_active() {
            return TickOutcome::Diagnostic;
        }

        // 2. Power channels, one sample per tick
        self.sensors.sample_power(hw);

        // 3. Irrigation
        if now >= self.next_irrigation_ms {
            self.irrigation_cycle(hw, sink);
            self.next_irrigation_ms = now + u64::from(self.config.irrigation_interval_ms);
        }

        // 4. Periodic telemetry
        if now >= self.next_power_report_ms {
            self.report_power(sink);
            self.next_power_report_ms = now + u64::from(self.config.power_report_interval_ms);
        }
        if now >= self.next_temperature_ms {
            self.report_temperatures(hw, sink);
            self.next_temperature_ms = now + u64::from(self.config.temperature_interval_ms);
        }

        // 5. Sleep decision
        let elapsed = now.saturating_sub(self.wake_ms);
        match self.scheduler.evaluate(
            elapsed,
            self.any_pump_active(),
            self.reservoir_status.water_available,
        ) {
            SleepDecision::StayAwake => TickOutcome::Running,
            SleepDecision::Sleep(reason) => {
                self.sleep_request = Some(reason);
                self.suspend(hw, sink, reason);
                TickOutcome::Suspended(reason)
            }
        }
    }

    // ── Command handling ──────────────────────────────────────

    /// Remote `switch` command for the pump of `slot`.
    ///
    /// Rejected commands change nothing. Accepted ones are echoed as a
    /// switch event.
    pub fn handle_pump_command(
        &mut self,
        slot: usize,
        payload: &str,
        is_range: bool,
        hw: &mut impl GpioPort,
        sink: &mut impl TelemetrySink,
    ) -> Result<()> {
        let command = PumpCommand::parse(payload, is_range).inspect_err(|e| {
            warn!("Controller: pump {} command '{}' rejected: {}", slot + 1, payload, e);
        })?;
        let count = self.plant_count();
        let plant = self.plants[..count]
            .get_mut(slot)
            .ok_or(CommandError::NoSuchPump)?;

        plant.set_pump(hw, command.is_on());
        info!("Controller: {} switched {:?} by command", plant.node(), command);
        sink.publish(&TelemetryEvent::PumpSwitch {
            node: plant.node(),
            on: command.is_on(),
        });
        Ok(())
    }

    /// Serial console byte. Unknown bytes are ignored.
    pub fn handle_console(&mut self, byte: u8, hw: &mut impl GpioPort) -> Option<ConsoleCommand> {
        let command = ConsoleCommand::from_byte(byte)?;
        let on = matches!(command, ConsoleCommand::SensorPowerOn);
        self.sensors.set_sensor_power(hw, on);
        info!("Controller: sensor supply {}", if on { "on" } else { "off" });
        Some(command)
    }

    // ── Accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Configured plants, clamped to the physical slot count.
    pub fn plant_count(&self) -> usize {
        usize::from(self.config.plant_count).min(MAX_PLANTS)
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    pub fn any_pump_active(&self) -> bool {
        self.plants.iter().any(Plant::is_pump_active)
    }

    pub fn reservoir_status(&self) -> &ReservoirStatus {
        &self.reservoir_status
    }

    pub fn sleep_plan(&self) -> &SleepPlan {
        &self.sleep_plan
    }

    pub fn sleep_requested(&self) -> Option<SleepReason> {
        self.sleep_request
    }

    pub fn session(&self) -> &DiagnosticSession {
        &self.session
    }

    pub fn sensors(&self) -> &SensorHub {
        &self.sensors
    }

    /// Completed irrigation cycles since wake.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn last_report(&self) -> Option<&DiagnosticReport> {
        self.last_report.as_ref()
    }

    // ── Internals ─────────────────────────────────────────────

    /// Fenced acquisition of every plant slot and the reservoir.
    fn acquire<B: Board>(&mut self, hw: &mut B) -> ReservoirReading {
        let Self {
            sensors,
            plants,
            reservoir,
            ..
        } = self;
        with_radio_off(hw, |hw, silence| sensors.acquire(hw, silence, plants, reservoir))
    }

    fn irrigation_cycle<B: Board>(&mut self, hw: &mut B, sink: &mut impl TelemetrySink) {
        let reading = match self.fresh_reading.take() {
            Some(reading) => reading,
            None => self.acquire(hw),
        };

        self.reservoir_status = self.reservoir.evaluate(&reading, self.sensors.solar_volts());
        sink.publish(&TelemetryEvent::WaterRemaining(self.reservoir_status.remaining_percent));

        let count = self.plant_count();
        let outcome = self.policy.run_cycle(
            &mut self.plants[..count],
            &self.config.moisture_triggers,
            &self.reservoir_status,
            hw,
            sink,
        );
        self.cycles += 1;

        info!(
            "Controller: cycle {} water={} remaining={} watering={:?}",
            self.cycles,
            self.reservoir_status.water_available,
            self.reservoir_status.remaining_or_sentinel(),
            outcome.watering
        );
    }

    fn report_power(&self, sink: &mut impl TelemetrySink) {
        if let (Some(raw), Some(volts)) = (self.sensors.battery_raw(), self.sensors.battery_volts()) {
            sink.publish(&TelemetryEvent::Battery {
                percent: percent_of_full_scale(raw),
                volts,
            });
        }
        if let (Some(raw), Some(volts)) = (self.sensors.solar_raw(), self.sensors.solar_volts()) {
            sink.publish(&TelemetryEvent::Solar {
                percent: percent_of_full_scale(raw),
                volts,
            });
        }
    }

    fn report_temperatures<B: Board>(&self, hw: &mut B, sink: &mut impl TelemetrySink) {
        for (probe, celsius) in temperature::read_probes(hw).iter() {
            sink.publish(&TelemetryEvent::Temperature { probe, celsius });
        }
    }

    fn suspend<B: Board>(&mut self, hw: &mut B, sink: &mut impl TelemetrySink, reason: SleepReason) {
        let awake_ms = hw.millis().saturating_sub(self.wake_ms);
        for plant in self.plants.iter_mut() {
            if plant.set_pump(hw, false) {
                sink.publish(&TelemetryEvent::PumpSwitch {
                    node: plant.node(),
                    on: false,
                });
            }
        }
        self.sensors.set_sensor_power(hw, false);
        info!(
            "Controller: {} after {} ms, sleeping {:?} ms",
            reason, awake_ms, self.sleep_plan.wake_after_ms
        );
        hw.deep_sleep(self.sleep_plan.wake_after_us());
    }

    // ── Diagnostics ───────────────────────────────────────────

    fn handle_session_event<B: Board>(&mut self, event: SessionEvent, hw: &mut B) {
        match event {
            SessionEvent::StepStarted { step: Some(step), .. } => self.run_step(step, hw),
            SessionEvent::StepStarted { step: None, .. } => {}
            SessionEvent::StepEnded { .. } => self.force_outputs_off(hw),
        }
    }

    fn run_step<B: Board>(&mut self, step: DiagnosticStep, hw: &mut B) {
        match step {
            DiagnosticStep::SensorReport { resample } => {
                let report = self.sensor_report(resample, hw);
                self.last_report = Some(report);
            }
            DiagnosticStep::SensorPower => self.sensors.set_sensor_power(hw, true),
            DiagnosticStep::Pump(slot) => self.diagnostic_pump(slot, hw),
            DiagnosticStep::AuxOutput => self.diagnostic_pump(pins::AUX_PUMP_SLOT, hw),
        }
    }

    fn diagnostic_pump(&mut self, slot: usize, hw: &mut impl GpioPort) {
        if let Some(plant) = self.plants.get_mut(slot) {
            hw.set_pin_mode(plant.pump_pin(), PinMode::Output);
            plant.set_pump(hw, true);
        }
    }

    /// Every output low: all pump slots, the sensor supply and the aux output.
    fn force_outputs_off(&mut self, hw: &mut impl GpioPort) {
        for plant in self.plants.iter_mut() {
            plant.set_pump(hw, false);
        }
        self.sensors.set_sensor_power(hw, false);
        hw.digital_write(pins::AUX_PUMP_GPIO, false);
    }

    fn sensor_report<B: Board>(&mut self, resample: bool, hw: &mut B) -> DiagnosticReport {
        let reading = match (resample, self.fresh_reading.take()) {
            (false, Some(reading)) => reading,
            _ => self.acquire(hw),
        };

        let mut moisture = [None; MAX_PLANTS];
        for (slot, plant) in self.plants.iter_mut().enumerate() {
            moisture[slot] = plant.calibrate();
        }

        self.sensors.fill_power(hw);
        let temperatures = temperature::read_probes(hw);

        let report = DiagnosticReport {
            reservoir: reading,
            moisture,
            battery_raw: self.sensors.battery_raw(),
            solar_raw: self.sensors.solar_raw(),
            temperatures,
        };
        log_report(&report);
        report
    }
}

fn log_report(report: &DiagnosticReport) {
    info!("Diagnostics: reservoir {:?}", report.reservoir);
    for (slot, value) in report.moisture.iter().enumerate() {
        match value {
            Some(raw) => info!(
                "Diagnostics: moist{} = {} ({:.2} V)",
                slot + 1,
                raw,
                adc_pin_volts(*raw)
            ),
            None => info!("Diagnostics: moist{} = n/a", slot + 1),
        }
    }
    info!(
        "Diagnostics: battery {:?} raw, solar {:?} raw",
        report.battery_raw, report.solar_raw
    );
    for (probe, celsius) in report.temperatures.iter() {
        info!("Diagnostics: temperature {} = {:.2} C", probe.property(), celsius);
    }
}
