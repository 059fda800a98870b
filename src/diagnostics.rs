//! Button-driven self-test menu.
//!
//! A single click counter drives the whole session:
//!
//! ```text
//!   clicks:   0 ─press─▶ 1 ─release─▶ 2 ─press─▶ 3 ─release─▶ 4 ...
//!             idle       step 0       idle       step 1       idle
//! ```
//!
//! Odd counts run exactly one step from [`STEPS`]; even counts mean every
//! output has been forced off. Once the list is exhausted further presses
//! only print a notice. While the counter is non-zero the normal control
//! loop does not run.

use log::info;

/// One entry of the self-test menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticStep {
    /// Print every sensor. `resample` forces a fresh fenced acquisition.
    SensorReport { resample: bool },
    /// Switch the sensor supply on.
    SensorPower,
    /// Run the pump of this slot.
    Pump(usize),
    /// Drive the auxiliary output (4th pump / extra sensor supply).
    AuxOutput,
}

impl DiagnosticStep {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::SensorReport { resample: false } => "sensor report",
            Self::SensorReport { resample: true } => "sensor report (fresh samples)",
            Self::SensorPower => "sensor supply on",
            Self::Pump(0) => "pump 1 on",
            Self::Pump(1) => "pump 2 on",
            Self::Pump(2) => "pump 3 on",
            Self::Pump(_) => "pump on",
            Self::AuxOutput => "pump 4 / sensor output on",
        }
    }
}

/// The menu, in click order.
pub const STEPS: [DiagnosticStep; 8] = [
    DiagnosticStep::SensorReport { resample: false },
    DiagnosticStep::SensorReport { resample: true },
    DiagnosticStep::SensorReport { resample: true },
    DiagnosticStep::SensorPower,
    DiagnosticStep::Pump(0),
    DiagnosticStep::Pump(1),
    DiagnosticStep::Pump(2),
    DiagnosticStep::AuxOutput,
];

/// Step for an odd click count; `None` for even counts and past the end of the menu.
pub fn step_for_clicks(clicks: u32) -> Option<DiagnosticStep> {
    if clicks % 2 == 0 {
        return None;
    }
    STEPS.get(((clicks - 1) / 2) as usize).copied()
}

/// What a button level change did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Counter went odd. `step` is `None` once the menu is exhausted.
    StepStarted {
        clicks: u32,
        step: Option<DiagnosticStep>,
    },
    /// Counter went even: force all outputs off.
    StepEnded { clicks: u32 },
}

#[derive(Debug, Default)]
pub struct DiagnosticSession {
    clicks: u32,
}

impl DiagnosticSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Non-zero counter: the control loop is suspended.
    pub fn is_active(&self) -> bool {
        self.clicks > 0
    }

    /// Feed the debounced button level.
    pub fn on_button(&mut self, pressed: bool) -> Option<SessionEvent> {
        let idle = self.clicks % 2 == 0;
        match (pressed, idle) {
            (true, true) => {
                self.clicks = self.clicks.saturating_add(1);
                let step = step_for_clicks(self.clicks);
                match step {
                    Some(s) => info!("Diagnostics: click {} -> {}", self.clicks, s.describe()),
                    None => info!("Diagnostics: no further tests, please reboot"),
                }
                Some(SessionEvent::StepStarted {
                    clicks: self.clicks,
                    step,
                })
            }
            (false, false) => {
                self.clicks = self.clicks.saturating_add(1);
                info!("Diagnostics: click {} -> all outputs off", self.clicks);
                Some(SessionEvent::StepEnded {
                    clicks: self.clicks,
                })
            }
            _ => None,
        }
    }
}
