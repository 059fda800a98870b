//! Raw peripheral access for the PlantCtrl board.
//!
//! Thin wrappers over ESP-IDF sys calls: GPIO direction and level, oneshot
//! ADC on both units, busy-wait timing, the console UART, radio stop/start
//! and deep sleep. Everything above this module goes through the port
//! traits; only [`HardwareAdapter`](crate::adapters::hardware::HardwareAdapter)
//! calls in here.
//!
//! On host builds every function has a sim fallback so the adapter links.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

// ── Error type ────────────────────────────────────────────────

/// Errors during one-shot peripheral initialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    GpioConfigFailed(i32),
    UartInstallFailed(i32),
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc) => write!(f, "ADC init failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::UartInstallFailed(rc) => write!(f, "console UART install failed (rc={})", rc),
        }
    }
}

// ── Bring-up ──────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
const CONSOLE_UART: uart_port_t = 0;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<(), HwInitError> {
    // SAFETY: Called once from main() before the control loop; single-threaded.
    unsafe {
        init_adc_units()?;
        let ret = uart_driver_install(CONSOLE_UART, 256, 0, 0, core::ptr::null_mut(), 0);
        if ret != ESP_OK as i32 {
            return Err(HwInitError::UartInstallFailed(ret));
        }
    }
    info!("hw_init: ADC units and console configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<(), HwInitError> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot, both units) ─────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC_HANDLES: [adc_oneshot_unit_handle_t; 2] = [core::ptr::null_mut(); 2];

#[cfg(target_os = "espidf")]
unsafe fn init_adc_units() -> Result<(), HwInitError> {
    for (index, unit_id) in [adc_unit_t_ADC_UNIT_1, adc_unit_t_ADC_UNIT_2]
        .into_iter()
        .enumerate()
    {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        // SAFETY: ADC_HANDLES is only written here, once at boot.
        let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC_HANDLES[index]) };
        if ret != ESP_OK as i32 {
            return Err(HwInitError::AdcInitFailed(ret));
        }
    }
    Ok(())
}

/// Resolve a GPIO to its ADC unit handle and channel.
#[cfg(target_os = "espidf")]
fn adc_channel_for(pin: i32) -> Option<(adc_oneshot_unit_handle_t, adc_channel_t)> {
    let mut unit: adc_unit_t = 0;
    let mut channel: adc_channel_t = 0;
    // SAFETY: pure lookup table in ROM.
    let ret = unsafe { adc_oneshot_io_to_channel(pin, &mut unit, &mut channel) };
    if ret != ESP_OK as i32 {
        return None;
    }
    // SAFETY: handles are written once in init_adc_units() before the loop starts.
    let handle = unsafe { ADC_HANDLES[if unit == adc_unit_t_ADC_UNIT_1 { 0 } else { 1 }] };
    Some((handle, channel))
}

#[cfg(target_os = "espidf")]
fn configure_analog(pin: i32) -> Result<(), HwInitError> {
    let Some((handle, channel)) = adc_channel_for(pin) else {
        return Err(HwInitError::GpioConfigFailed(pin));
    };
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    // SAFETY: main-loop only; handle valid after init.
    let ret = unsafe { adc_oneshot_config_channel(handle, channel, &chan_cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::AdcInitFailed(ret));
    }
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn adc_read(pin: i32) -> u16 {
    let Some((handle, channel)) = adc_channel_for(pin) else {
        return 0;
    };
    let mut raw: i32 = 0;
    // SAFETY: single-threaded main-loop access. ADC2 reads fail (and
    // return 0 here) while the radio holds the unit.
    let ret = unsafe { adc_oneshot_read(handle, channel, &mut raw) };
    if ret != ESP_OK as i32 {
        return 0;
    }
    raw.clamp(0, 4095) as u16
}

#[cfg(not(target_os = "espidf"))]
pub fn adc_read(_pin: i32) -> u16 {
    0
}

// ── GPIO ──────────────────────────────────────────────────────

/// Pin direction as understood by [`configure_pin`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
    Analog,
}

#[cfg(target_os = "espidf")]
pub fn configure_pin(pin: i32, direction: PinDirection) -> Result<(), HwInitError> {
    let mode = match direction {
        PinDirection::Analog => return configure_analog(pin),
        PinDirection::Input => gpio_mode_t_GPIO_MODE_INPUT,
        PinDirection::Output => gpio_mode_t_GPIO_MODE_INPUT_OUTPUT,
    };
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: gpio_config only touches the pin named in the mask.
    let ret = unsafe { gpio_config(&cfg) };
    if ret != ESP_OK as i32 {
        return Err(HwInitError::GpioConfigFailed(ret));
    }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn configure_pin(_pin: i32, _direction: PinDirection) -> Result<(), HwInitError> {
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_read(pin: i32) -> bool {
    // SAFETY: read-only register access.
    (unsafe { gpio_get_level(pin) }) != 0
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_read(_pin: i32) -> bool {
    true
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: i32, high: bool) {
    // SAFETY: pin configured as output by configure_pin(); main-loop only.
    unsafe {
        gpio_set_level(pin, u32::from(high));
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(_pin: i32, _high: bool) {}

// ── Timing ────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn now_us() -> u64 {
    // SAFETY: RTC counter read.
    (unsafe { esp_timer_get_time() }).max(0) as u64
}

#[cfg(not(target_os = "espidf"))]
pub fn now_us() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;
    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_micros() as u64
}

#[cfg(target_os = "espidf")]
pub fn delay_us(us: u32) {
    // SAFETY: busy-wait in ROM.
    unsafe { esp_rom_delay_us(us) }
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_us(us: u32) {
    std::thread::sleep(std::time::Duration::from_micros(u64::from(us)));
}

/// Yielding delay for settle times.
#[cfg(target_os = "espidf")]
pub fn delay_ms(ms: u32) {
    esp_idf_svc::hal::delay::FreeRtos::delay_ms(ms);
}

#[cfg(not(target_os = "espidf"))]
pub fn delay_ms(ms: u32) {
    std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
}

/// Busy-wait for a full pulse at `level`; `None` on timeout.
pub fn pulse_in(pin: i32, level: bool, timeout_us: u32) -> Option<u32> {
    let deadline = now_us() + u64::from(timeout_us);
    while gpio_read(pin) == level {
        if now_us() >= deadline {
            return None;
        }
    }
    while gpio_read(pin) != level {
        if now_us() >= deadline {
            return None;
        }
    }
    let start = now_us();
    while gpio_read(pin) == level {
        if now_us() >= deadline {
            return None;
        }
    }
    Some((now_us() - start) as u32)
}

// ── Console ───────────────────────────────────────────────────

/// Non-blocking read of one console byte.
#[cfg(target_os = "espidf")]
pub fn console_read_byte() -> Option<u8> {
    let mut byte = 0u8;
    // SAFETY: driver installed in init_peripherals(); zero tick wait.
    let n = unsafe {
        uart_read_bytes(CONSOLE_UART, (&raw mut byte).cast(), 1, 0)
    };
    (n == 1).then_some(byte)
}

#[cfg(not(target_os = "espidf"))]
pub fn console_read_byte() -> Option<u8> {
    None
}

// ── Radio & sleep ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn radio_stop() {
    // SAFETY: returns an error code when WiFi was never started; harmless.
    let ret = unsafe { esp_wifi_stop() };
    if ret != ESP_OK as i32 && ret != ESP_ERR_WIFI_NOT_INIT as i32 {
        warn!("hw_init: esp_wifi_stop rc={}", ret);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn radio_stop() {}

#[cfg(target_os = "espidf")]
pub fn radio_start() {
    // SAFETY: see radio_stop().
    let ret = unsafe { esp_wifi_start() };
    if ret != ESP_OK as i32 && ret != ESP_ERR_WIFI_NOT_INIT as i32 {
        warn!("hw_init: esp_wifi_start rc={}", ret);
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn radio_start() {}

/// Arm the timer (if any) and enter deep sleep. Does not return on target.
#[cfg(target_os = "espidf")]
pub fn deep_sleep(wake_after_us: Option<u64>) {
    // SAFETY: terminal call; nothing runs after esp_deep_sleep_start().
    unsafe {
        if let Some(us) = wake_after_us {
            esp_sleep_enable_timer_wakeup(us);
        }
        esp_deep_sleep_start();
    }
}

#[cfg(not(target_os = "espidf"))]
pub fn deep_sleep(wake_after_us: Option<u64>) {
    log::info!("hw_init(sim): deep sleep requested ({:?} us)", wake_after_us);
}
