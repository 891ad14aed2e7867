//! DHT22 / AM2302 single-wire frame decoding.
//!
//! The sensor answers a start pulse with 40 bits: each bit is a ~50 µs low
//! followed by a high whose length encodes the value (~27 µs = 0, ~70 µs = 1).
//!
//! ```text
//! byte 0..1  humidity × 10        (big-endian)
//! byte 2..3  temperature × 10     (big-endian, bit 15 = sign)
//! byte 4     checksum = (b0 + b1 + b2 + b3) & 0xFF
//! ```
//!
//! Sampling the line is board-specific (see `drivers::dht_bus`); everything
//! after the pulse widths are captured lives here so it runs on the host.

use crate::app::ports::HumidityReading;
use crate::error::SensorReadError;

/// High-phase length (µs) above which a bit reads as 1.
pub const BIT_THRESHOLD_US: u32 = 48;

/// Pack 40 high-phase durations into the 5-byte frame, MSB first.
pub fn frame_from_pulses(high_us: &[u32; 40]) -> [u8; 5] {
    let mut frame = [0u8; 5];
    for (i, &width) in high_us.iter().enumerate() {
        if width > BIT_THRESHOLD_US {
            frame[i / 8] |= 0x80 >> (i % 8);
        }
    }
    frame
}

/// Verify the checksum and convert to physical units.
pub fn decode_frame(frame: [u8; 5]) -> Result<HumidityReading, SensorReadError> {
    let sum = frame[..4].iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
    if sum != frame[4] {
        return Err(SensorReadError::Checksum);
    }

    let humidity = u16::from_be_bytes([frame[0], frame[1]]);
    let magnitude = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]);
    let temperature = if frame[2] & 0x80 != 0 {
        -f32::from(magnitude)
    } else {
        f32::from(magnitude)
    };

    Ok(HumidityReading {
        temperature_c: temperature / 10.0,
        humidity_pct: f32::from(humidity) / 10.0,
    })
}
