//! Integration tests for the wake → tick → suspend pipeline.
//!
//! Every test drives a real [`Controller`] against [`MockBoard`] and
//! asserts on pin writes, radio fencing, sleep requests and telemetry.

use crate::mock_hw::{
    BoardCall, DARK_SOLAR_RAW, EMPTY_BATTERY_RAW, HEALTHY_BATTERY_RAW, MockBoard, RecordingSink,
    SUNNY_SOLAR_RAW,
};

use plantctrl::app::commands::ConsoleCommand;
use plantctrl::app::events::TelemetryEvent;
use plantctrl::app::service::{Controller, TickOutcome};
use plantctrl::config::{ControllerConfig, MAX_PLANTS};
use plantctrl::error::{CommandError, Error};
use plantctrl::pins;
use plantctrl::power::{PlanReason, SleepReason};
use plantctrl::sensors::reservoir::ReservoirKind;
use plantctrl::sensors::temperature::Probe;

fn three_plants() -> ControllerConfig {
    ControllerConfig {
        plant_count: 3,
        moisture_triggers: [500; MAX_PLANTS],
        ..Default::default()
    }
}

fn make_controller(config: ControllerConfig, hw: &mut MockBoard) -> (Controller, RecordingSink) {
    let mut controller = Controller::new(config);
    let mut sink = RecordingSink::new();
    controller.wake(hw, &mut sink);
    (controller, sink)
}

fn board_with_moisture(values: &[u16]) -> MockBoard {
    let mut hw = MockBoard::new();
    for (slot, &raw) in values.iter().enumerate() {
        hw.set_moisture(slot, raw);
    }
    hw
}

// ── Wake ──────────────────────────────────────────────────────

#[test]
fn wake_publishes_off_for_every_configured_pump() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (_ctrl, sink) = make_controller(three_plants(), &mut hw);

    for node in ["plant1", "plant2", "plant3"] {
        assert_eq!(sink.switches(node), vec![false], "{node} initial state");
    }
    assert!(sink.switches("plant4").is_empty(), "unconfigured slot stays silent");
}

#[test]
fn wake_acquisition_is_fenced_and_leaves_supply_off() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (_ctrl, _sink) = make_controller(three_plants(), &mut hw);

    assert_eq!(hw.count(&BoardCall::RadioOff), 1);
    assert_eq!(hw.count(&BoardCall::RadioOn), 1);
    assert_eq!(hw.unfenced_adc2_reads, 0);
    assert!(hw.is_radio_up());
    assert!(!hw.output(pins::SENSOR_POWER_GPIO));
    assert!(hw.pump_outputs().iter().all(|on| !on));
}

// ── Irrigation ────────────────────────────────────────────────

#[test]
fn first_dry_plant_gets_the_only_pump() {
    let mut hw = board_with_moisture(&[400, 600, 300]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);

    assert_eq!(ctrl.cycles(), 1);
    assert_eq!(hw.pump_outputs(), vec![true, false, false, false, false, false]);
    assert_eq!(sink.switches("plant1"), vec![false, true]);
    assert_eq!(sink.switches("plant3"), vec![false], "plant 3 is dry too but must wait");
    assert!(ctrl.plants()[0].is_pump_active());
}

#[test]
fn first_cycle_consumes_the_wake_acquisition() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(hw.count(&BoardCall::RadioOff), 1, "no second acquisition at t=0");

    hw.advance(10_000);
    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(ctrl.cycles(), 2);
    assert_eq!(hw.count(&BoardCall::RadioOff), 2);
    assert_eq!(hw.count(&BoardCall::RadioOn), 2);
    assert_eq!(hw.unfenced_adc2_reads, 0);
}

#[test]
fn pump_events_only_on_transitions() {
    let mut hw = board_with_moisture(&[400, 600, 600]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    hw.advance(10_000);
    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(sink.switches("plant1"), vec![false, true], "still dry: no repeat");

    hw.set_moisture(0, 700);
    hw.advance(10_000);
    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(sink.switches("plant1"), vec![false, true, false]);
    assert!(!hw.output(pins::PUMP_GPIO[0]));
}

#[test]
fn moisture_is_published_per_configured_plant() {
    let mut hw = board_with_moisture(&[4095, 0, 2048]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(sink.moisture("plant1"), vec![100]);
    assert_eq!(sink.moisture("plant2"), vec![0]);
    assert_eq!(sink.moisture("plant3"), vec![50]);
    assert!(sink.moisture("plant4").is_empty());
}

#[test]
fn no_plants_configured_never_waters() {
    let mut hw = board_with_moisture(&[0; MAX_PLANTS]);
    let (mut ctrl, mut sink) = make_controller(ControllerConfig::default(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert!(hw.pump_outputs().iter().all(|on| !on));
    assert!(!sink.events.iter().any(|e| matches!(e, TelemetryEvent::PumpSwitch { .. })));
}

// ── Reservoir ─────────────────────────────────────────────────

#[test]
fn empty_reservoir_blocks_watering() {
    let mut hw = board_with_moisture(&[100, 100, 100]);
    hw.set_switches(false, false);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert!(!ctrl.reservoir_status().water_available);
    assert_eq!(sink.water_remaining(), vec![Some(0)]);
    assert!(hw.pump_outputs().iter().all(|on| !on));
}

#[test]
fn switch_levels_map_to_remaining_percent() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    hw.set_switches(true, false);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert!(ctrl.reservoir_status().water_available);
    assert_eq!(sink.water_remaining(), vec![Some(10)]);
}

#[test]
fn weak_panel_makes_switches_indeterminate() {
    let mut hw = board_with_moisture(&[100, 100, 100]);
    hw.set_power(HEALTHY_BATTERY_RAW, DARK_SOLAR_RAW);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(sink.water_remaining(), vec![None]);
    assert_eq!(ctrl.reservoir_status().remaining_or_sentinel(), -1);
    assert!(hw.pump_outputs().iter().all(|on| !on));
}

#[test]
fn ranging_sensor_reports_distance_based_level() {
    let mut hw = board_with_moisture(&[100, 600, 600]);
    hw.echo_us = Some(1_000); // ≈17 cm
    let config = ControllerConfig {
        reservoir: ReservoirKind::Ultrasonic,
        water_max_level_cm: 50,
        ..three_plants()
    };
    let (mut ctrl, mut sink) = make_controller(config, &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(sink.water_remaining(), vec![Some(66)]);
    assert!(ctrl.reservoir_status().water_available);
    assert!(hw.output(pins::PUMP_GPIO[0]));
}

#[test]
fn ranging_timeout_is_indeterminate() {
    let mut hw = board_with_moisture(&[100, 100, 100]);
    hw.echo_us = None;
    let config = ControllerConfig {
        reservoir: ReservoirKind::Ultrasonic,
        ..three_plants()
    };
    let (mut ctrl, mut sink) = make_controller(config, &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert_eq!(sink.water_remaining(), vec![None]);
    assert!(hw.pump_outputs().iter().all(|on| !on));
}

// ── Periodic telemetry ────────────────────────────────────────

#[test]
fn power_and_temperature_reports() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    hw.temperatures = vec![21.5, 85.0];
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);

    let battery = sink
        .events
        .iter()
        .find_map(|e| match e {
            TelemetryEvent::Battery { percent, volts } => Some((*percent, *volts)),
            _ => None,
        })
        .expect("battery report");
    assert_eq!(battery.0, 61);
    assert!((battery.1 - 4.03).abs() < 0.01, "got {} V", battery.1);

    let temperatures: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            TelemetryEvent::Temperature { probe, celsius } => Some((*probe, *celsius)),
            _ => None,
        })
        .collect();
    assert_eq!(temperatures, vec![(Probe::Control, 21.5)], "85 °C is a bus error");
}

// ── Power scheduling ──────────────────────────────────────────

#[test]
fn empty_battery_sleeps_ten_times_longer_at_once() {
    let mut hw = board_with_moisture(&[100, 100, 100]);
    hw.set_power(EMPTY_BATTERY_RAW, SUNNY_SOLAR_RAW);
    let config = ControllerConfig {
        deep_sleep_ms: 60_000,
        ..three_plants()
    };
    let (mut ctrl, mut sink) = make_controller(config, &mut hw);

    assert_eq!(ctrl.sleep_plan().reason, PlanReason::EmptyBattery);
    assert_eq!(ctrl.sleep_plan().wake_after_ms, Some(600_000));
    assert!(ctrl.sleep_plan().sleep_immediately);

    assert_eq!(
        ctrl.tick(&mut hw, &mut sink),
        TickOutcome::Suspended(SleepReason::EmptyBattery)
    );
    assert_eq!(ctrl.cycles(), 0, "duty cycle skipped");
    assert_eq!(hw.sleeps(), vec![Some(600_000_000)]);
    assert!(hw.pump_outputs().iter().all(|on| !on));
}

#[test]
fn idle_sleep_after_minimum_run_time() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    hw.set_switches(false, false);
    let config = ControllerConfig {
        deep_sleep_ms: 60_000,
        ..three_plants()
    };
    let (mut ctrl, mut sink) = make_controller(config, &mut hw);

    assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);
    hw.advance(4_999);
    assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);
    hw.advance(1);
    assert_eq!(
        ctrl.tick(&mut hw, &mut sink),
        TickOutcome::Suspended(SleepReason::Idle)
    );
    assert_eq!(hw.sleeps(), vec![Some(60_000_000)]);
}

#[test]
fn watering_ceiling_stops_the_pump_and_sleeps() {
    let mut hw = board_with_moisture(&[100, 600, 600]);
    let config = ControllerConfig {
        deep_sleep_ms: 60_000,
        watering_secs: 60,
        ..three_plants()
    };
    let (mut ctrl, mut sink) = make_controller(config, &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    assert!(hw.output(pins::PUMP_GPIO[0]));

    hw.advance(64_999);
    assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);
    hw.advance(1);
    assert_eq!(
        ctrl.tick(&mut hw, &mut sink),
        TickOutcome::Suspended(SleepReason::Ceiling)
    );

    assert!(!hw.output(pins::PUMP_GPIO[0]));
    assert!(!hw.output(pins::SENSOR_POWER_GPIO));
    assert_eq!(sink.switches("plant1"), vec![false, true, false]);
    assert_eq!(hw.sleeps(), vec![Some(60_000_000)]);
}

#[test]
fn night_plan_uses_night_duration() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    hw.set_power(HEALTHY_BATTERY_RAW, DARK_SOLAR_RAW);
    let config = ControllerConfig {
        deep_sleep_ms: 60_000,
        night_sleep_ms: 3_600_000,
        ..three_plants()
    };
    let (ctrl, _sink) = make_controller(config, &mut hw);

    assert_eq!(ctrl.sleep_plan().reason, PlanReason::Night);
    assert_eq!(ctrl.sleep_plan().wake_after_ms, Some(3_600_000));
    assert!(!ctrl.sleep_plan().sleep_immediately);
}

#[test]
fn deep_sleep_disabled_stays_awake() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    hw.set_switches(false, false);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);
    hw.advance(1_000_000);
    assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);
    assert!(hw.sleeps().is_empty());
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn pump_command_switches_and_echoes() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.handle_pump_command(1, "On", false, &mut hw, &mut sink)
        .expect("valid command");
    assert!(hw.output(pins::PUMP_GPIO[1]));
    assert_eq!(sink.switches("plant2"), vec![false, true]);

    ctrl.handle_pump_command(1, "false", false, &mut hw, &mut sink)
        .expect("valid command");
    assert!(!hw.output(pins::PUMP_GPIO[1]));
    assert_eq!(sink.switches("plant2"), vec![false, true, false]);
}

#[test]
fn rejected_pump_commands_change_nothing() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);
    let events_before = sink.events.len();

    assert_eq!(
        ctrl.handle_pump_command(0, "maybe", false, &mut hw, &mut sink),
        Err(Error::Command(CommandError::InvalidPayload))
    );
    assert_eq!(
        ctrl.handle_pump_command(0, "on", true, &mut hw, &mut sink),
        Err(Error::Command(CommandError::RangeNotSupported))
    );
    assert_eq!(
        ctrl.handle_pump_command(3, "on", false, &mut hw, &mut sink),
        Err(Error::Command(CommandError::NoSuchPump))
    );

    assert_eq!(sink.events.len(), events_before);
    assert!(hw.pump_outputs().iter().all(|on| !on));
}

#[test]
fn next_cycle_overrides_a_manual_pump() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (mut ctrl, mut sink) = make_controller(three_plants(), &mut hw);

    ctrl.tick(&mut hw, &mut sink);
    ctrl.handle_pump_command(2, "ON", false, &mut hw, &mut sink)
        .expect("valid command");
    assert!(hw.output(pins::PUMP_GPIO[2]));

    hw.advance(10_000);
    ctrl.tick(&mut hw, &mut sink);
    assert!(!hw.output(pins::PUMP_GPIO[2]), "wet plant: cycle turns it off");
    assert_eq!(sink.switches("plant3"), vec![false, true, false]);
}

#[test]
fn console_toggles_sensor_supply() {
    let mut hw = board_with_moisture(&[600, 600, 600]);
    let (mut ctrl, _sink) = make_controller(three_plants(), &mut hw);

    assert_eq!(ctrl.handle_console(b'P', &mut hw), Some(ConsoleCommand::SensorPowerOn));
    assert!(hw.output(pins::SENSOR_POWER_GPIO));
    assert!(ctrl.sensors().is_powered());

    assert_eq!(ctrl.handle_console(b'p', &mut hw), Some(ConsoleCommand::SensorPowerOff));
    assert!(!hw.output(pins::SENSOR_POWER_GPIO));

    assert_eq!(ctrl.handle_console(b'x', &mut hw), None);
}
