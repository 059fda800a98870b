//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements                         | Connects to             |
//! |-------------|------------------------------------|-------------------------|
//! | `hardware`  | GpioPort, PowerPort, ClockPort,    | ESP32 GPIO, ADC1/ADC2,  |
//! |             | TemperaturePort (delegated)        | WiFi, deep sleep        |
//! | `log_sink`  | TelemetrySink                      | Serial log output       |
//! | `nvs`       | SettingsPort                       | NVS / in-memory store   |
//! | `probes`    | TemperaturePort                    | (no bus fitted)         |
//! | `time`      | ClockPort                          | ESP32 system timer      |

pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod probes;
pub mod time;
