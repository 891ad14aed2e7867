//! Sensor subsystem.
//!
//! - [`acquisition`] — power-scoped humidity/temperature polling with retry policy.
//! - [`supply`] — supply / battery voltage measurement.
//! - [`dht`] — DHT22 frame decoding (pure logic).
//! - [`contact`] — door/contact level sampling.

pub mod acquisition;
pub mod contact;
pub mod dht;
pub mod supply;
