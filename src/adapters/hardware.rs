//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Exposes the sensor rail, the DHT22 buses, the contact switch and the
//! battery ADC through [`SensorPort`] and [`AnalogPort`], plus the blocking
//! [`DelayNs`] the domain waits with.  On non-espidf targets, the
//! underlying drivers use cfg-gated simulation stubs.

use embedded_hal::delay::DelayNs;
use log::warn;

use crate::app::ports::{AnalogPort, HumidityReading, SensorChannel, SensorPort};
use crate::drivers::{dht_bus, hw_init};
use crate::error::SensorReadError;
use crate::pins;
use crate::sensors::dht;

/// The ESP32 has no internal bandgap channel to measure against the supply,
/// so a reference conversion reads as 0 and the supply reports saturated.
/// Board profiles measure through the divider instead.
const REFERENCE_UNAVAILABLE: u16 = 0;

/// Concrete adapter for the sensor node board.
pub struct HardwareAdapter {
    adc_open: bool,
}

impl Default for HardwareAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareAdapter {
    pub fn new() -> Self {
        Self { adc_open: false }
    }

    fn data_pin(channel: SensorChannel) -> i32 {
        match channel {
            SensorChannel::Primary => pins::SENSOR_DATA_GPIO,
            SensorChannel::Secondary => pins::SENSOR2_DATA_GPIO,
        }
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl SensorPort for HardwareAdapter {
    fn set_sensor_power(&mut self, on: bool) {
        if on {
            // Release the data lines first so the sensors see their pull-ups.
            hw_init::gpio_write(pins::SENSOR_DATA_GPIO, true);
            hw_init::gpio_write(pins::SENSOR2_DATA_GPIO, true);
        }
        hw_init::gpio_write(pins::SENSOR_POWER_GPIO, on);
    }

    fn park_data_pin(&mut self) {
        hw_init::gpio_write(pins::SENSOR_DATA_GPIO, false);
        hw_init::gpio_write(pins::SENSOR2_DATA_GPIO, false);
    }

    fn read_humidity(&mut self, channel: SensorChannel) -> Result<HumidityReading, SensorReadError> {
        dht_bus::read_frame(Self::data_pin(channel)).and_then(dht::decode_frame)
    }

    fn contact_closed(&mut self) -> bool {
        // LOW = closed (magnet present), HIGH = open.
        !hw_init::gpio_read(pins::CONTACT_GPIO)
    }
}

// ── AnalogPort implementation ─────────────────────────────────

impl AnalogPort for HardwareAdapter {
    fn adc_enable(&mut self) {
        match hw_init::adc1_open() {
            Ok(()) => self.adc_open = true,
            Err(e) => warn!("ADC unavailable: {}", e),
        }
    }

    fn adc_disable(&mut self) {
        hw_init::adc1_close();
        self.adc_open = false;
    }

    fn read_reference(&mut self) -> u16 {
        REFERENCE_UNAVAILABLE
    }

    fn read_battery(&mut self) -> u16 {
        if !self.adc_open {
            return 0;
        }
        // 12-bit conversion scaled to the 10-bit range the supply maths uses.
        hw_init::adc1_read(pins::BATTERY_ADC_CHANNEL) >> 2
    }
}

// ── Blocking delays ───────────────────────────────────────────

impl DelayNs for HardwareAdapter {
    #[cfg(target_os = "espidf")]
    fn delay_ns(&mut self, ns: u32) {
        // SAFETY: ROM busy-wait; no shared state.
        unsafe { esp_idf_svc::sys::esp_rom_delay_us(ns.div_ceil(1_000)) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(std::time::Duration::from_nanos(u64::from(ns)));
    }

    /// Millisecond waits yield to the scheduler instead of spinning.
    #[cfg(target_os = "espidf")]
    fn delay_ms(&mut self, ms: u32) {
        let ticks = (u64::from(ms) * u64::from(esp_idf_svc::sys::configTICK_RATE_HZ)).div_ceil(1_000);
        // SAFETY: plain FreeRTOS task delay from the main task.
        unsafe { esp_idf_svc::sys::vTaskDelay(ticks as u32) }
    }

    #[cfg(not(target_os = "espidf"))]
    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(std::time::Duration::from_millis(u64::from(ms)));
    }
}
