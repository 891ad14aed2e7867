//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements              | Connects to                 |
//! |-------------|-------------------------|-----------------------------|
//! | `board`     | every hardware port     | hardware + radio + sleep    |
//! | `hardware`  | SensorPort, AnalogPort  | ESP32 GPIO, ADC1, DHT22 bus |
//! |             | DelayNs                 | ROM / FreeRTOS delays       |
//! | `log_sink`  | EventSink               | Serial log output           |
//! | `radio`     | RadioPort               | ESP-NOW broadcast           |
//! | `sleep`     | SleepPort               | ESP-IDF light sleep         |

pub mod board;
pub mod hardware;
pub mod log_sink;
pub mod radio;
pub mod sleep;
