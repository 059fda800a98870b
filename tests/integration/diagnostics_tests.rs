//! Integration tests for the button-driven self-test session.
//!
//! The button is polled and debounced, so every press or release is held
//! across two ticks [`DEBOUNCE_MS`] apart before the controller sees it.

use crate::mock_hw::{BoardCall, HEALTHY_BATTERY_RAW, MockBoard, RecordingSink};

use plantctrl::app::service::{Controller, TickOutcome};
use plantctrl::config::{ControllerConfig, MAX_PLANTS};
use plantctrl::drivers::button::DEBOUNCE_MS;
use plantctrl::pins;

struct Bench {
    ctrl: Controller,
    hw: MockBoard,
    sink: RecordingSink,
}

impl Bench {
    fn new(config: ControllerConfig) -> Self {
        let mut hw = MockBoard::new();
        for (slot, raw) in [400, 600, 300].into_iter().enumerate() {
            hw.set_moisture(slot, raw);
        }
        let mut ctrl = Controller::new(config);
        let mut sink = RecordingSink::new();
        ctrl.wake(&mut hw, &mut sink);
        assert_eq!(ctrl.tick(&mut hw, &mut sink), TickOutcome::Running);
        hw.advance(10);
        Self { ctrl, hw, sink }
    }

    fn tick(&mut self) -> TickOutcome {
        self.ctrl.tick(&mut self.hw, &mut self.sink)
    }

    /// Hold the button at `pressed` long enough to debounce.
    fn hold(&mut self, pressed: bool) -> TickOutcome {
        if pressed {
            self.hw.press_button();
        } else {
            self.hw.release_button();
        }
        self.tick();
        self.hw.advance(DEBOUNCE_MS);
        let outcome = self.tick();
        self.hw.advance(10);
        outcome
    }

    fn click(&mut self) {
        self.hold(true);
        self.hold(false);
    }
}

fn config() -> ControllerConfig {
    ControllerConfig {
        plant_count: 3,
        moisture_triggers: [500; MAX_PLANTS],
        ..Default::default()
    }
}

// ── Session lifecycle ─────────────────────────────────────────

#[test]
fn first_press_prints_a_fenced_sensor_report() {
    let mut bench = Bench::new(config());
    let radio_offs = bench.hw.count(&BoardCall::RadioOff);

    assert_eq!(bench.hold(true), TickOutcome::Diagnostic);
    assert_eq!(bench.ctrl.session().clicks(), 1);

    let report = bench.ctrl.last_report().expect("report printed");
    let expected: [Option<u16>; 3] = [Some(400), Some(600), Some(300)];
    assert_eq!(report.moisture[..3], expected);
    assert_eq!(report.battery_raw, Some(HEALTHY_BATTERY_RAW));
    assert_eq!(bench.hw.count(&BoardCall::RadioOff), radio_offs + 1);
    assert_eq!(bench.hw.unfenced_adc2_reads, 0);
}

#[test]
fn control_loop_is_suspended_while_session_is_active() {
    let mut bench = Bench::new(ControllerConfig {
        deep_sleep_ms: 60_000,
        ..config()
    });
    let cycles = bench.ctrl.cycles();
    let pump_before = bench.hw.output(pins::PUMP_GPIO[0]);
    assert!(pump_before, "plant 1 was dry at the first cycle");

    bench.hold(true);
    // releasing ends the step and forces everything off
    bench.hold(false);
    assert!(bench.ctrl.session().is_active());
    assert!(bench.hw.pump_outputs().iter().all(|on| !on));

    bench.hw.advance(120_000);
    assert_eq!(bench.tick(), TickOutcome::Diagnostic);
    assert_eq!(bench.ctrl.cycles(), cycles, "no irrigation during diagnostics");
    assert!(bench.hw.sleeps().is_empty(), "no sleep during diagnostics");
}

#[test]
fn sensor_power_step_and_release() {
    let mut bench = Bench::new(config());
    for _ in 0..3 {
        bench.click();
    }
    assert_eq!(bench.ctrl.session().clicks(), 6);

    bench.hold(true);
    assert_eq!(bench.ctrl.session().clicks(), 7);
    assert!(bench.hw.output(pins::SENSOR_POWER_GPIO));

    bench.hold(false);
    assert_eq!(bench.ctrl.session().clicks(), 8);
    assert!(!bench.hw.output(pins::SENSOR_POWER_GPIO));
}

#[test]
fn pump_steps_drive_exactly_one_output() {
    let mut bench = Bench::new(config());
    for _ in 0..4 {
        bench.click();
    }

    for slot in 0..3 {
        bench.hold(true);
        let mut expected = vec![false; MAX_PLANTS];
        expected[slot] = true;
        assert_eq!(bench.hw.pump_outputs(), expected, "pump step {}", slot + 1);
        assert!(!bench.hw.output(pins::SENSOR_POWER_GPIO));

        bench.hold(false);
        assert!(bench.hw.pump_outputs().iter().all(|on| !on));
    }

    // last menu entry: the auxiliary output
    bench.hold(true);
    assert_eq!(bench.ctrl.session().clicks(), 15);
    assert!(bench.hw.output(pins::AUX_PUMP_GPIO));
    bench.hold(false);
    assert!(!bench.hw.output(pins::AUX_PUMP_GPIO));
}

#[test]
fn exhausted_menu_only_counts() {
    let mut bench = Bench::new(config());
    for _ in 0..8 {
        bench.click();
    }
    let writes = bench.hw.calls.len();

    assert_eq!(bench.hold(true), TickOutcome::Diagnostic);
    assert_eq!(bench.ctrl.session().clicks(), 17);
    let high_writes = bench.hw.calls[writes..]
        .iter()
        .filter(|c| matches!(c, BoardCall::Write { high: true, .. }))
        .count();
    assert_eq!(high_writes, 0, "nothing left to switch on");
}

#[test]
fn pump_step_works_on_unconfigured_slot() {
    let mut bench = Bench::new(ControllerConfig::default());
    for _ in 0..4 {
        bench.click();
    }
    bench.hold(true);
    assert!(bench.hw.output(pins::PUMP_GPIO[0]));
    assert!(bench.hw.calls.contains(&BoardCall::Mode {
        pin: pins::PUMP_GPIO[0],
        mode: plantctrl::app::ports::PinMode::Output,
    }));
}

#[test]
fn bounce_shorter_than_debounce_is_ignored() {
    let mut bench = Bench::new(config());

    bench.hw.press_button();
    bench.tick();
    bench.hw.advance(DEBOUNCE_MS - 10);
    bench.hw.release_button();
    bench.tick();
    bench.hw.advance(DEBOUNCE_MS);
    assert_eq!(bench.tick(), TickOutcome::Running);
    assert!(!bench.ctrl.session().is_active());
}
