//! Supply / battery voltage monitor.
//!
//! Two methods, chosen per board in [`SupplyMethod`]:
//!
//! - **Reference ratio**: convert the internal reference against the supply
//!   rail and back-calculate: `mV = reference_constant / raw`.  Single sample,
//!   no external parts.
//! - **Divider average**: average several conversions of a resistor divider
//!   on an analog pin, scale by the divider ratio, and derive a
//!   percentage-of-capacity between `vmin` and `vmax`.
//!
//! Neither method validates its result.  A zero reference conversion
//! saturates to `i16::MAX`, and the capacity percentage is deliberately not
//! clamped to 0..=10000: a miscalibrated divider shows up in the data
//! instead of being hidden.
//!
//! The ADC is powered only inside an [`AdcSession`].

use core::ops::{Deref, DerefMut};

use embedded_hal::delay::DelayNs;
use log::debug;

use crate::app::ports::AnalogPort;
use crate::config::{DividerConfig, SupplyMethod};

/// Full-scale count of a 10-bit conversion.
pub const ADC_FULL_SCALE: f32 = 1023.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupplyReading {
    pub millivolts: i16,
    /// 0–10000 for the divider method, unclamped.  `None` for reference ratio.
    pub percent: Option<i16>,
}

// ───────────────────────────────────────────────────────────────
// Pure conversions
// ───────────────────────────────────────────────────────────────

/// Integer back-calculation of the supply from a reference conversion.
pub fn reference_ratio_millivolts(reference_constant: u32, raw: u16) -> i16 {
    match reference_constant.checked_div(u32::from(raw)) {
        Some(mv) => mv.min(i16::MAX as u32) as i16,
        None => i16::MAX,
    }
}

/// Mean of the samples, rounded half up.
pub fn rounded_mean(samples: &[u16]) -> u16 {
    if samples.is_empty() {
        return 0;
    }
    let n = samples.len() as u32;
    let sum: u32 = samples.iter().map(|&s| u32::from(s)).sum();
    ((sum + n / 2) / n) as u16
}

/// Battery voltage (V) for an averaged divider conversion.
pub fn divider_volts(d: &DividerConfig, avg_raw: u16) -> f32 {
    let ratio = (d.r1_ohms + d.r2_ohms) as f32 / d.r2_ohms as f32;
    (ratio * d.vref / ADC_FULL_SCALE) * f32::from(avg_raw)
}

/// `(v − vmin) / (vmax − vmin) × 10000`, truncated toward zero, unclamped.
pub fn capacity_percent(d: &DividerConfig, volts: f32) -> i16 {
    ((volts - d.vmin) / (d.vmax - d.vmin) * 10_000.0) as i16
}

fn volts_to_millivolts(volts: f32) -> i16 {
    (volts * 1000.0).round() as i16
}

// ───────────────────────────────────────────────────────────────
// Scoped ADC power
// ───────────────────────────────────────────────────────────────

/// ADC block powered for the lifetime of the guard.
pub struct AdcSession<'a, H: AnalogPort> {
    hw: &'a mut H,
}

impl<'a, H: AnalogPort> AdcSession<'a, H> {
    pub fn enable(hw: &'a mut H) -> Self {
        hw.adc_enable();
        Self { hw }
    }
}

impl<H: AnalogPort> Deref for AdcSession<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.hw
    }
}

impl<H: AnalogPort> DerefMut for AdcSession<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.hw
    }
}

impl<H: AnalogPort> Drop for AdcSession<'_, H> {
    fn drop(&mut self) {
        self.hw.adc_disable();
    }
}

// ───────────────────────────────────────────────────────────────
// Monitor
// ───────────────────────────────────────────────────────────────

/// Upper bound on samples per measurement.  Config validation rejects more.
pub const MAX_SAMPLES: usize = 16;

#[derive(Debug, Clone, Copy)]
pub struct SupplyMonitor {
    method: SupplyMethod,
}

impl SupplyMonitor {
    pub fn new(method: SupplyMethod) -> Self {
        Self { method }
    }

    pub fn measure<H>(&self, hw: &mut H) -> SupplyReading
    where
        H: AnalogPort + DelayNs,
    {
        match self.method {
            SupplyMethod::ReferenceRatio { reference_constant } => {
                let raw = AdcSession::enable(hw).read_reference();
                let millivolts = reference_ratio_millivolts(reference_constant, raw);
                debug!("supply: ref raw={} -> {} mV", raw, millivolts);
                SupplyReading {
                    millivolts,
                    percent: None,
                }
            }
            SupplyMethod::DividerAverage(d) => {
                let mut buf = [0u16; MAX_SAMPLES];
                let n = usize::from(d.samples).clamp(1, MAX_SAMPLES);
                {
                    let mut adc = AdcSession::enable(hw);
                    for (i, slot) in buf[..n].iter_mut().enumerate() {
                        if i > 0 {
                            adc.delay_ms(d.sample_delay_ms);
                        }
                        *slot = adc.read_battery();
                    }
                }
                let avg = rounded_mean(&buf[..n]);
                let volts = divider_volts(&d, avg);
                let percent = capacity_percent(&d, volts);
                debug!("supply: divider avg={} -> {:.3} V ({})", avg, volts, percent);
                SupplyReading {
                    millivolts: volts_to_millivolts(volts),
                    percent: Some(percent),
                }
            }
        }
    }
}
