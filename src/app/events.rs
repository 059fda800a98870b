//! Outbound telemetry events.
//!
//! The [`Controller`](super::service::Controller) emits these through the
//! [`TelemetrySink`](super::ports::TelemetrySink) port. Each event belongs
//! to one telemetry node and carries one or two properties; adapters on
//! the other side decide what to do with them (serial log, the device
//! fabric's publisher, a test recorder).

use core::fmt::Write;

use heapless::{String, Vec};

use crate::sensors::temperature::Probe;

/// Rendered property payload.
pub type Payload = String<16>;

/// Structured events emitted by the control core.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    /// Pump state changed (or initial OFF at wake).
    PumpSwitch { node: &'static str, on: bool },
    /// Calibrated moisture of one plant.
    Moisture { node: &'static str, percent: u8 },
    Battery { percent: u8, volts: f32 },
    Solar { percent: u8, volts: f32 },
    /// Reservoir fill level; `None` when indeterminate.
    WaterRemaining(Option<u8>),
    Temperature { probe: Probe, celsius: f32 },
}

impl TelemetryEvent {
    pub fn node(&self) -> &'static str {
        match self {
            Self::PumpSwitch { node, .. } | Self::Moisture { node, .. } => node,
            Self::Battery { .. } => "lipo",
            Self::Solar { .. } => "solar",
            Self::WaterRemaining(_) => "water",
            Self::Temperature { .. } => "temperature",
        }
    }

    /// `(property, payload)` pairs in publication order.
    pub fn properties(&self) -> Vec<(&'static str, Payload), 2> {
        let mut out = Vec::new();
        match *self {
            Self::PumpSwitch { on, .. } => {
                let _ = out.push(("switch", text(if on { "ON" } else { "OFF" })));
            }
            Self::Moisture { percent, .. } => {
                let _ = out.push(("moist", number(i32::from(percent))));
            }
            Self::Battery { percent, volts } | Self::Solar { percent, volts } => {
                let _ = out.push(("percent", number(i32::from(percent))));
                let _ = out.push(("volt", decimal(volts)));
            }
            Self::WaterRemaining(remaining) => {
                let value = remaining.map_or(-1, i32::from);
                let _ = out.push(("remaining", number(value)));
            }
            Self::Temperature { probe, celsius } => {
                let _ = out.push((probe.property(), decimal(celsius)));
            }
        }
        out
    }
}

fn text(s: &str) -> Payload {
    let mut p = Payload::new();
    let _ = p.push_str(s);
    p
}

fn number(value: i32) -> Payload {
    let mut p = Payload::new();
    let _ = write!(p, "{value}");
    p
}

/// Two decimals, like the fabric's default float rendering.
fn decimal(value: f32) -> Payload {
    let mut p = Payload::new();
    let _ = write!(p, "{value:.2}");
    p
}
