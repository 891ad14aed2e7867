//! GPIO / peripheral pin assignments for the EnvNode board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Humidity/temperature sensors (DHT22 / AM2302)
// ---------------------------------------------------------------------------

/// Digital output: switches the sensor supply rail (high-side MOSFET, HIGH = on).
pub const SENSOR_POWER_GPIO: i32 = 4;
/// Open-drain single-wire data line of the primary sensor.
pub const SENSOR_DATA_GPIO: i32 = 5;
/// Data line of the optional secondary sensor (dual-sensor profile).
pub const SENSOR2_DATA_GPIO: i32 = 6;

// ---------------------------------------------------------------------------
// Door / contact switch
// ---------------------------------------------------------------------------

/// Digital input with pull-up: reed switch to ground.
/// LOW = contact closed (magnet present), HIGH = open.
pub const CONTACT_GPIO: i32 = 7;

// ---------------------------------------------------------------------------
// Battery sense (ADC1)
// ---------------------------------------------------------------------------

/// Battery voltage through a resistor divider.
/// ADC1 channel 2 (GPIO 2 on ESP32-C3).
pub const BATTERY_ADC_GPIO: i32 = 2;
/// ADC1 channel number matching [`BATTERY_ADC_GPIO`].
pub const BATTERY_ADC_CHANNEL: u32 = 2;

// ---------------------------------------------------------------------------
// Radio
// ---------------------------------------------------------------------------

/// WiFi channel used for ESP-NOW frames (must match the gateway).
pub const RADIO_CHANNEL: u8 = 1;
