//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::radio::record::{Field, MISSING_READING};

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

/// Hundredths as `12.34`, or `--` for the missing-reading sentinel.
struct Centi(i16);

impl core::fmt::Display for Centi {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.0 == MISSING_READING {
            return f.write_str("--");
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { node_id, group, layout } => {
                info!(
                    "START | node={} group={} layout={:?} ({} bytes)",
                    node_id,
                    group,
                    layout,
                    layout.encoded_len()
                );
            }
            AppEvent::CycleStarted { cycle, triggered } => {
                info!(
                    "CYCLE | #{} | {}",
                    cycle,
                    if *triggered { "contact" } else { "timer" }
                );
            }
            AppEvent::SensorTimeout { channel, attempts } => {
                warn!("SENSE | {:?} timed out after {} attempts", channel, attempts);
            }
            AppEvent::Measured(r) => {
                info!(
                    "SENSE | T={}\u{00b0}C RH={}% | T2={}\u{00b0}C RH2={}% | \
                     supply={}mV batt={}% door={}",
                    Centi(r.get(Field::Temperature)),
                    Centi(r.get(Field::Humidity)),
                    Centi(r.get(Field::SecondaryTemperature)),
                    Centi(r.get(Field::SecondaryHumidity)),
                    r.get(Field::SupplyVoltage),
                    Centi(r.get(Field::SupplyPercent)),
                    r.get(Field::ContactState),
                );
            }
            AppEvent::Delivered { attempts } => {
                info!("RADIO | delivered (attempts={})", attempts);
            }
            AppEvent::Dropped { attempts } => {
                warn!("RADIO | dropped after {} attempts", attempts);
            }
            AppEvent::Sent => {
                info!("RADIO | sent (no ack requested)");
            }
            AppEvent::SleepInterrupted { slept_ms } => {
                warn!("SLEEP | interrupted after {} ms", slept_ms);
            }
        }
    }
}
