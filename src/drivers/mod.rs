//! Hardware initialisation and low-level bus helpers.

pub mod dht_bus;
pub mod hw_init;
