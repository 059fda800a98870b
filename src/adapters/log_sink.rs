//! Log-based telemetry sink.
//!
//! Implements [`TelemetrySink`] by writing every property to the ESP-IDF
//! logger (UART in production). A device-fabric publisher would implement
//! the same trait and forward `node/property = payload` triples.

use log::info;

use crate::app::events::TelemetryEvent;
use crate::app::ports::TelemetrySink;

/// Adapter that logs every [`TelemetryEvent`] to the serial console.
#[derive(Default)]
pub struct LogTelemetrySink {
    published: u64,
}

impl LogTelemetrySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Properties written since construction.
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl TelemetrySink for LogTelemetrySink {
    fn publish(&mut self, event: &TelemetryEvent) {
        let node = event.node();
        for (property, payload) in event.properties() {
            info!("TELEM | {}/{} = {}", node, property, payload);
            self.published += 1;
        }
    }
}
