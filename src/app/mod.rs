//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the duty-cycle rules of the sensor node: the
//! measure / transmit / sleep sequencer and the events it reports.
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
