//! DHT22 single-wire bus sampling.
//!
//! Bit-bangs the start pulse and times the 40 response bits with the
//! ESP-IDF microsecond timer.  Decoding is pure logic in
//! [`sensors::dht`](crate::sensors::dht).
//!
//! The data line is configured open-drain in `hw_init`: writing 1 releases
//! the bus to the sensor's pull-up, writing 0 drives it low.

use crate::error::SensorReadError;

#[cfg(target_os = "espidf")]
use crate::sensors::dht::frame_from_pulses;
#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::{esp_rom_delay_us, esp_timer_get_time, gpio_get_level, gpio_set_level};

/// Host start pulse, held low (µs).  The datasheet asks for at least 1 ms.
#[cfg(target_os = "espidf")]
const START_LOW_US: u32 = 1_100;

/// Longest phase the protocol allows before a line is considered stuck (µs).
#[cfg(target_os = "espidf")]
const PHASE_TIMEOUT_US: i64 = 100;

/// Busy-wait until `pin` reads `level`; returns the time spent waiting.
#[cfg(target_os = "espidf")]
fn wait_for_level(pin: i32, level: bool) -> Result<u32, SensorReadError> {
    // SAFETY: register read and monotonic timer read, main-loop only.
    unsafe {
        let start = esp_timer_get_time();
        loop {
            let elapsed = esp_timer_get_time() - start;
            if (gpio_get_level(pin) != 0) == level {
                return Ok(elapsed as u32);
            }
            if elapsed > PHASE_TIMEOUT_US {
                return Err(SensorReadError::NotReady);
            }
        }
    }
}

/// One raw 5-byte frame from the sensor on `pin`.  Fails with
/// [`SensorReadError::NotReady`] when the sensor does not answer in time.
#[cfg(target_os = "espidf")]
pub fn read_frame(pin: i32) -> Result<[u8; 5], SensorReadError> {
    // SAFETY: the pin is an open-drain output configured in hw_init.
    unsafe {
        gpio_set_level(pin, 0);
        esp_rom_delay_us(START_LOW_US);
        gpio_set_level(pin, 1);
    }

    // Response: sensor pulls low ~80 µs, then high ~80 µs.
    wait_for_level(pin, false)?;
    wait_for_level(pin, true)?;
    wait_for_level(pin, false)?;

    let mut high_us = [0u32; 40];
    for width in high_us.iter_mut() {
        wait_for_level(pin, true)?;
        *width = wait_for_level(pin, false)?;
    }
    Ok(frame_from_pulses(&high_us))
}

/// Simulated sensor: 48.6 %RH at 21.5 °C.
#[cfg(not(target_os = "espidf"))]
pub fn read_frame(_pin: i32) -> Result<[u8; 5], SensorReadError> {
    Ok([0x01, 0xE6, 0x00, 0xD7, 0xBE])
}
