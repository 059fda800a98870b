//! PlantCtrl Firmware — Main Entry Point
//!
//! One wake cycle per boot: load settings, bring the board up, run the
//! cooperative control loop until the power scheduler suspends the chip.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogTelemetrySink     NvsSettings       │
//! │  (GPIO·ADC·radio·sleep) (TelemetrySink)      (SettingsPort)    │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              Controller (decision core)                │    │
//! │  │  Sensors · Reservoir · Irrigation · Power · Diagnostics│    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{info, warn};

use plantctrl::adapters::hardware::HardwareAdapter;
use plantctrl::adapters::log_sink::LogTelemetrySink;
use plantctrl::adapters::nvs::NvsSettings;
use plantctrl::adapters::probes::NullProbeBus;
use plantctrl::app::ports::SettingsPort;
use plantctrl::app::service::{Controller, TickOutcome};
use plantctrl::config::ControllerConfig;

/// Control loop period.
const TICK_MS: u32 = 10;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("PlantCtrl v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Settings (or defaults) ─────────────────────────────
    let config = match NvsSettings::new().and_then(|nvs| nvs.load()) {
        Ok(config) => config,
        Err(e) => {
            warn!("Settings unavailable ({}), running with defaults", e);
            ControllerConfig::default()
        }
    };

    // ── 3. Board ──────────────────────────────────────────────
    let mut hw = HardwareAdapter::new(NullProbeBus).map_err(|e| anyhow::anyhow!("{e}"))?;
    let mut sink = LogTelemetrySink::new();

    // ── 4. Wake cycle ─────────────────────────────────────────
    let mut controller = Controller::new(config);
    controller.wake(&mut hw, &mut sink);

    loop {
        if let Some(byte) = hw.console_byte() {
            controller.handle_console(byte, &mut hw);
        }

        if let TickOutcome::Suspended(reason) = controller.tick(&mut hw, &mut sink) {
            // Only reached if the sleep call returned (no timer armed).
            warn!("Suspend ({}) returned; staying in loop", reason);
        }

        esp_idf_svc::hal::delay::FreeRtos::delay_ms(TICK_MS);
    }
}
