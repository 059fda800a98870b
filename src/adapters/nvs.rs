//! NVS (Non-Volatile Storage) settings adapter.
//!
//! Implements [`SettingsPort`] for the controller. The whole
//! [`ControllerConfig`] is stored as one postcard blob; keyed updates from
//! the settings store go through [`NvsSettings::update`], which validates
//! the full candidate before anything is written.
//!
//! - **`target_os = "espidf"`**: ESP-IDF NVS, namespace `plantctrl`.
//! - **host**: in-memory map, for tests and simulation.

use log::{info, warn};

use crate::app::ports::{ConfigError, SettingsPort};
use crate::config::{ControllerConfig, SettingKey};

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

const SETTINGS_NAMESPACE: &str = "plantctrl";
const SETTINGS_KEY: &str = "settings";

#[cfg(target_os = "espidf")]
const MAX_BLOB_SIZE: usize = 512;

pub struct NvsSettings {
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsSettings {
    /// Initialise NVS flash. A full or outdated partition is erased and
    /// re-initialised; any other failure is an [`ConfigError::IoError`].
    pub fn new() -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called from the single main task before any other NVS access.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as i32 || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as i32 {
                warn!("NvsSettings: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as i32 {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as i32 {
                return Err(ConfigError::IoError);
            }
            info!("NvsSettings: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsSettings: simulation backend");

        Ok(Self {
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    /// Apply one keyed setting (`"plants"`, `"moist2"`, ...) and persist.
    ///
    /// Unknown keys and out-of-range values are refused and leave the
    /// stored settings untouched.
    pub fn update(&mut self, key: &str, value: i64) -> Result<ControllerConfig, ConfigError> {
        let setting = SettingKey::parse(key).ok_or(ConfigError::UnknownKey)?;
        let mut config = self.load()?;
        config.apply(setting, value).inspect_err(|e| {
            warn!("NvsSettings: '{}' = {} refused: {}", key, value, e);
        })?;
        self.save(&config)?;
        info!("NvsSettings: '{}' = {}", key, value);
        Ok(config)
    }

    /// Open the settings namespace, run `f` with the handle, then close.
    #[cfg(target_os = "espidf")]
    fn with_nvs_handle<F, T>(write: bool, f: F) -> Result<T, i32>
    where
        F: FnOnce(nvs_handle_t) -> Result<T, i32>,
    {
        let mut ns_buf = [0u8; 16];
        let ns_bytes = SETTINGS_NAMESPACE.as_bytes();
        let len = ns_bytes.len().min(15);
        ns_buf[..len].copy_from_slice(&ns_bytes[..len]);

        let mut handle: nvs_handle_t = 0;
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };

        // SAFETY: ns_buf is NUL-terminated; handle closed below.
        let ret = unsafe { nvs_open(ns_buf.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as i32 {
            return Err(ret);
        }
        let result = f(handle);
        unsafe {
            nvs_close(handle);
        }
        result
    }
}

/// Decode a stored settings blob. Blobs that decode but fail validation count as corrupted.
pub fn decode_settings(bytes: &[u8]) -> Result<ControllerConfig, ConfigError> {
    let config: ControllerConfig = postcard::from_bytes(bytes).map_err(|_| ConfigError::Corrupted)?;
    config.validate().map_err(|_| ConfigError::Corrupted)?;
    Ok(config)
}

impl SettingsPort for NvsSettings {
    fn load(&self) -> Result<ControllerConfig, ConfigError> {
        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(SETTINGS_NAMESPACE, SETTINGS_KEY);
            if let Some(bytes) = self.store.borrow().get(&key) {
                let config = decode_settings(bytes)?;
                info!("NvsSettings: loaded settings from store");
                Ok(config)
            } else {
                info!("NvsSettings: no stored settings, using defaults");
                Ok(ControllerConfig::default())
            }
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(false, |handle| {
                let key_cstr = b"settings\0";
                let mut size: usize = 0;

                // SAFETY: size query with a null buffer.
                let ret = unsafe {
                    nvs_get_blob(handle, key_cstr.as_ptr() as *const _, core::ptr::null_mut(), &mut size)
                };
                if ret != ESP_OK as i32 || size == 0 || size > MAX_BLOB_SIZE {
                    return Err(ret);
                }

                let mut buf = vec![0u8; size];
                // SAFETY: buf holds `size` bytes.
                let ret = unsafe {
                    nvs_get_blob(handle, key_cstr.as_ptr() as *const _, buf.as_mut_ptr() as *mut _, &mut size)
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(buf)
            });

            match result {
                Ok(bytes) => {
                    let config = decode_settings(&bytes)?;
                    info!("NvsSettings: loaded settings from NVS ({} bytes)", bytes.len());
                    Ok(config)
                }
                Err(e) if e == ESP_ERR_NVS_NOT_FOUND as i32 => {
                    info!("NvsSettings: no stored settings, using defaults");
                    Ok(ControllerConfig::default())
                }
                Err(e) => {
                    warn!("NvsSettings: NVS read error {}, using defaults", e);
                    Ok(ControllerConfig::default())
                }
            }
        }
    }

    fn save(&mut self, config: &ControllerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let bytes = postcard::to_allocvec(config).map_err(|_| ConfigError::IoError)?;

        #[cfg(not(target_os = "espidf"))]
        {
            let key = Self::composite_key(SETTINGS_NAMESPACE, SETTINGS_KEY);
            self.store.borrow_mut().insert(key, bytes);
            info!("NvsSettings: settings saved (simulation)");
            Ok(())
        }

        #[cfg(target_os = "espidf")]
        {
            let result = Self::with_nvs_handle(true, |handle| {
                let key_cstr = b"settings\0";
                // SAFETY: bytes outlives the call.
                let ret = unsafe {
                    nvs_set_blob(handle, key_cstr.as_ptr() as *const _, bytes.as_ptr() as *const _, bytes.len())
                };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                let ret = unsafe { nvs_commit(handle) };
                if ret != ESP_OK as i32 {
                    return Err(ret);
                }
                Ok(())
            });
            match result {
                Ok(()) => {
                    info!("NvsSettings: settings saved to NVS ({} bytes)", bytes.len());
                    Ok(())
                }
                Err(e) => {
                    warn!("NvsSettings: NVS write error {}", e);
                    Err(ConfigError::IoError)
                }
            }
        }
    }
}
