//! EnvNode firmware library.
//!
//! Exposes the duty-cycle logic for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod pins;
pub mod radio;
pub mod scheduler;
pub mod sensors;

// The adapters and drivers compile on every target; their hardware
// access is replaced by simulation stubs off-device.
pub mod adapters;
pub mod drivers;
