//! Humidity/temperature acquisition.
//!
//! One acquisition is a small state machine run entirely inside a
//! [`SensorRail`] scope:
//!
//! ```text
//!  RailOn ──warm-up──▶ Poll ──ok──▶ Done
//!                       │ ▲
//!                   err │ │ backoff
//!                       ▼ │
//!                     Retry ──budget spent──▶ Timeout
//!  (rail off + data pin parked on every exit)
//! ```
//!
//! With [`SensorRetryPolicy::Unbounded`] a sensor that never answers keeps
//! the node polling forever, which starves the duty cycle and drains the
//! battery.  The shipped profile uses [`SensorRetryPolicy::Deadline`], which
//! gives up and lets the sequencer transmit a missing-reading sentinel.

use core::ops::{Deref, DerefMut};

use embedded_hal::delay::DelayNs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{HumidityReading, SensorChannel, SensorPort};
use crate::config::SensorConfig;

/// What to do while the sensor keeps failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorRetryPolicy {
    /// Poll until the sensor answers, however long that takes.
    Unbounded,
    /// Give up once the time spent in backoff reaches `budget_ms`.
    Deadline { budget_ms: u32 },
}

/// A reading scaled for the wire: hundredths of a degree / percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorReading {
    pub temperature: i16,
    pub humidity: i16,
}

impl SensorReading {
    pub fn from_physical(r: HumidityReading) -> Self {
        Self {
            temperature: hundredths(r.temperature_c),
            humidity: hundredths(r.humidity_pct),
        }
    }
}

/// `value × 100` truncated toward zero, saturating at the i16 range.
fn hundredths(value: f32) -> i16 {
    (value * 100.0) as i16
}

/// Outcome of [`SensorAcquisition::acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acquisition {
    Success { reading: SensorReading, attempts: u32 },
    Timeout { attempts: u32 },
}

impl Acquisition {
    pub fn attempts(self) -> u32 {
        match self {
            Self::Success { attempts, .. } | Self::Timeout { attempts } => attempts,
        }
    }

    pub fn reading(self) -> Option<SensorReading> {
        match self {
            Self::Success { reading, .. } => Some(reading),
            Self::Timeout { .. } => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Scoped sensor power
// ───────────────────────────────────────────────────────────────

/// Sensor supply rail held on for the lifetime of the guard.
///
/// Dropping it switches the rail off and drives the data line low, on every
/// exit path.
pub struct SensorRail<'a, H: SensorPort> {
    hw: &'a mut H,
}

impl<'a, H: SensorPort> SensorRail<'a, H> {
    pub fn power_on(hw: &'a mut H) -> Self {
        hw.set_sensor_power(true);
        Self { hw }
    }
}

impl<H: SensorPort> Deref for SensorRail<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.hw
    }
}

impl<H: SensorPort> DerefMut for SensorRail<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.hw
    }
}

impl<H: SensorPort> Drop for SensorRail<'_, H> {
    fn drop(&mut self) {
        self.hw.set_sensor_power(false);
        self.hw.park_data_pin();
    }
}

// ───────────────────────────────────────────────────────────────
// Acquisition
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct SensorAcquisition {
    warmup_ms: u32,
    retry_backoff_ms: u32,
    policy: SensorRetryPolicy,
}

impl SensorAcquisition {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            warmup_ms: config.warmup_ms,
            retry_backoff_ms: config.retry_backoff_ms,
            policy: config.retry,
        }
    }

    pub fn policy(&self) -> SensorRetryPolicy {
        self.policy
    }

    /// Power the sensor, wait for it to settle, poll until it answers (or
    /// the retry budget is spent), power it down.
    pub fn acquire<H>(&self, hw: &mut H, channel: SensorChannel) -> Acquisition
    where
        H: SensorPort + DelayNs,
    {
        let mut rail = SensorRail::power_on(hw);
        rail.delay_ms(self.warmup_ms);

        let mut attempts: u32 = 0;
        let mut waited_ms: u64 = 0;

        loop {
            attempts = attempts.saturating_add(1);
            match rail.read_humidity(channel) {
                Ok(raw) => {
                    let reading = SensorReading::from_physical(raw);
                    debug!(
                        "sensor {:?}: T={} RH={} after {} poll(s)",
                        channel, reading.temperature, reading.humidity, attempts
                    );
                    return Acquisition::Success { reading, attempts };
                }
                Err(e) => {
                    debug!("sensor {:?}: poll {} failed: {}", channel, attempts, e);
                    if let SensorRetryPolicy::Deadline { budget_ms } = self.policy {
                        if waited_ms >= u64::from(budget_ms) {
                            warn!(
                                "sensor {:?}: no reading after {} polls, giving up",
                                channel, attempts
                            );
                            return Acquisition::Timeout { attempts };
                        }
                    }
                    rail.delay_ms(self.retry_backoff_ms);
                    waited_ms += u64::from(self.retry_backoff_ms);
                }
            }
        }
    }
}
