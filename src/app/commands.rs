//! Inbound commands to the control core.
//!
//! Two sources: the device fabric's per-plant `switch` command, and
//! single-byte console input on the serial port.

use crate::error::CommandError;

/// Boolean pump command, parsed from a fabric payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PumpCommand {
    On,
    Off,
}

impl PumpCommand {
    /// Accepts `on`/`true` and `off`/`false` in any case. Ranged commands are refused.
    pub fn parse(payload: &str, is_range: bool) -> Result<Self, CommandError> {
        if is_range {
            return Err(CommandError::RangeNotSupported);
        }
        let is = |word: &str| payload.eq_ignore_ascii_case(word);
        if is("on") || is("true") {
            Ok(Self::On)
        } else if is("off") || is("false") {
            Ok(Self::Off)
        } else {
            Err(CommandError::InvalidPayload)
        }
    }

    pub fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

/// Serial console shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// `P`: sensor supply on.
    SensorPowerOn,
    /// `p`: sensor supply off.
    SensorPowerOff,
}

impl ConsoleCommand {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'P' => Some(Self::SensorPowerOn),
            b'p' => Some(Self::SensorPowerOff),
            _ => None,
        }
    }
}
