//! Outbound application events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them; the shipped one logs to the serial console.

use crate::app::ports::SensorChannel;
use crate::radio::record::{MeasurementRecord, RecordLayout};

/// Structured events emitted by the application core.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// The service is configured and about to enter its first cycle.
    Started { node_id: u8, group: u8, layout: RecordLayout },

    /// A measure-and-transmit cycle began.  `triggered` means it was started
    /// early by a contact event rather than by the schedule.
    CycleStarted { cycle: u64, triggered: bool },

    /// A sensor never answered within its retry budget; the record carries
    /// the missing-reading sentinel instead.
    SensorTimeout { channel: SensorChannel, attempts: u32 },

    /// The record is complete and about to be transmitted.
    Measured(MeasurementRecord),

    /// The receiver acknowledged the record.
    Delivered { attempts: u32 },

    /// No acknowledgement within the retry window; the record is discarded.
    Dropped { attempts: u32 },

    /// Best-effort transmission (acknowledgements disabled).
    Sent,

    /// The interval sleep ended early because an event is pending.
    SleepInterrupted { slept_ms: u64 },
}
