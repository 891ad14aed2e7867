//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ NodeService (domain)
//! ```
//!
//! Driven adapters (sensor rail, ADC, radio transceiver, sleep primitive,
//! event sinks) implement these traits.  The domain components consume them
//! via generics injected at call sites, so the duty-cycle logic never
//! touches hardware directly and runs unchanged against host mocks.
//!
//! Blocking waits are not a port of their own: every component that waits
//! takes `embedded_hal::delay::DelayNs` alongside the port it drives.
//!
//! ## Power discipline
//!
//! Every port that owns a power state (sensor rail, ADC, radio) is driven
//! through a scoped guard on the domain side
//! ([`SensorRail`](crate::sensors::acquisition::SensorRail),
//! [`AdcSession`](crate::sensors::supply::AdcSession),
//! [`RadioAwake`](crate::radio::link::RadioAwake)), which returns it to low
//! power on every exit path.  Adapters only provide the primitive switch.

use crate::error::SensorReadError;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Which humidity/temperature sensor to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorChannel {
    Primary,
    Secondary,
}

/// One successful single-shot reading, in physical units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HumidityReading {
    pub temperature_c: f32,
    pub humidity_pct: f32,
}

pub trait SensorPort {
    /// Switch the shared sensor supply rail.
    fn set_sensor_power(&mut self, on: bool);

    /// Drive every sensor data line low.  Sensors of this class pull their
    /// line high while idle; with the rail off that leaks current.
    fn park_data_pin(&mut self);

    /// One single-shot read attempt.  Must not retry internally.
    fn read_humidity(&mut self, channel: SensorChannel) -> Result<HumidityReading, SensorReadError>;

    /// Level of the door/contact input (`true` = closed).
    fn contact_closed(&mut self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Analog port (supply voltage)
// ───────────────────────────────────────────────────────────────

pub trait AnalogPort {
    /// Power up the ADC block.
    fn adc_enable(&mut self);

    /// Power down the ADC block.
    fn adc_disable(&mut self);

    /// One conversion of the internal reference measured against the supply
    /// rail (10-bit).
    fn read_reference(&mut self) -> u16;

    /// One conversion of the battery-divider input (10-bit, 0..=1023).
    fn read_battery(&mut self) -> u16;
}

// ───────────────────────────────────────────────────────────────
// Radio port (transceiver driver primitives)
// ───────────────────────────────────────────────────────────────

/// A frame seen by the receiver.  Only the header matters to this node:
/// acknowledgements carry no payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceivedFrame {
    pub header: u8,
    /// Link-layer integrity check passed.
    pub crc_ok: bool,
}

pub trait RadioPort {
    /// Leave low-power sleep.
    fn wake(&mut self);

    /// Enter low-power sleep.
    fn sleep(&mut self);

    /// Transmit path idle and ready for a new frame.
    fn can_send(&mut self) -> bool;

    /// Service the receiver; returns a completed frame if one arrived.
    /// The driver needs this called regularly to stay responsive.
    fn poll_receive(&mut self) -> Option<ReceivedFrame>;

    /// Queue one frame for transmission.
    fn send_start(&mut self, header: u8, payload: &[u8]);

    /// Block until the queued frame has physically left the antenna.
    fn send_wait(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Sleep port (low-power suspension primitive)
// ───────────────────────────────────────────────────────────────

pub trait SleepPort {
    /// Suspend for up to `ms` milliseconds in the deepest state that keeps
    /// RAM and the contact interrupt alive.  May return early on an
    /// external wake source; callers re-check their own conditions.
    fn sleep_chunk(&mut self, ms: u32);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
