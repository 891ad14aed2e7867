//! Radio subsystem.
//!
//! - [`header`] — one-byte frame header (node id + control bits).
//! - [`record`] — [`MeasurementRecord`](record::MeasurementRecord) and its
//!   fixed little-endian wire layouts.
//! - [`link`] — [`ReliableRadioLink`](link::ReliableRadioLink): wake, send,
//!   wait for ack, retry, sleep.

pub mod header;
pub mod link;
pub mod record;
