//! Fuzz target: keyed settings updates and the persisted settings blob
//!
//! Feeds arbitrary `(key, value)` pairs through `ControllerConfig::apply`
//! and arbitrary bytes through the postcard decoder used by the settings
//! store.
//!
//! Invariants checked:
//! - No panics under any byte sequence
//! - A refused update leaves the config untouched
//! - An accepted update always yields a config that validates
//!
//! cargo fuzz run fuzz_settings_update

#![no_main]

use libfuzzer_sys::fuzz_target;
use plantctrl::adapters::nvs::decode_settings;
use plantctrl::config::{ControllerConfig, SettingKey};

fuzz_target!(|data: &[u8]| {
    // Any blob the store might hand back must decode or fail cleanly.
    if let Ok(config) = decode_settings(data) {
        assert!(config.validate().is_ok(), "decoded blob must validate");
    }

    if data.len() < 9 {
        return;
    }
    let (value_bytes, key_bytes) = data.split_at(8);
    let value = i64::from_le_bytes(value_bytes.try_into().unwrap());
    let Ok(key) = core::str::from_utf8(key_bytes) else {
        return;
    };
    let Some(key) = SettingKey::parse(key) else {
        return;
    };

    let mut config = ControllerConfig::default();
    let before = config.clone();
    match config.apply(key, value) {
        Ok(()) => assert!(config.validate().is_ok(), "accepted an invalid {key:?}={value}"),
        Err(_) => assert_eq!(config, before, "refused {key:?}={value} but changed state"),
    }
});
