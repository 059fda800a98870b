//! Fuzz target: `PumpCommand::parse` (remote switch payloads)
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - Ranged commands are always refused
//! - Only `on`/`true`/`off`/`false` (any case) are accepted
//!
//! cargo fuzz run fuzz_pump_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantctrl::app::commands::PumpCommand;

fuzz_target!(|data: &[u8]| {
    let Some((&flags, rest)) = data.split_first() else {
        return;
    };
    let Ok(payload) = core::str::from_utf8(rest) else {
        return;
    };
    let is_range = flags & 1 == 1;

    match PumpCommand::parse(payload, is_range) {
        Ok(cmd) => {
            assert!(!is_range, "range command accepted: {payload:?}");
            let word = payload.to_ascii_lowercase();
            let expected_on = word == "on" || word == "true";
            let expected_off = word == "off" || word == "false";
            assert!(expected_on || expected_off, "unexpected payload accepted: {payload:?}");
            assert_eq!(cmd.is_on(), expected_on);
        }
        Err(_) => {}
    }
});
