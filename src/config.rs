//! Node configuration.
//!
//! Everything here is fixed at build time per deployed node: identity,
//! record layout, radio retry parameters, timing and the supply-voltage
//! method.  [`NodeConfig::default()`] is the shipped profile; boards with a
//! different wiring construct their own and must pass [`NodeConfig::validate`]
//! before the sequencer is built.
//!
//! A profile can also be shipped serialised, as JSON text or compact
//! postcard bytes; both loaders validate before returning.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::radio::record::{MAX_PAYLOAD, RecordLayout};
use crate::sensors::acquisition::SensorRetryPolicy;
use crate::sensors::supply::MAX_SAMPLES;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Radio node id.  0 is broadcast and 31 is reserved by the header format,
/// so a sensor node is always 1..=30.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct NodeId(u8);

impl NodeId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 30;

    pub fn new(id: u8) -> Result<Self, ConfigError> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(ConfigError::ValidationFailed("node_id must be 1..=30"))
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for NodeId {
    type Error = ConfigError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<NodeId> for u8 {
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Frequency band of the sub-GHz transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Band {
    Mhz433,
    Mhz868,
    Mhz915,
}

/// Node id + network group + band: the address of this node on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    pub node_id: NodeId,
    pub group: u8,
    pub band: Band,
}

// ---------------------------------------------------------------------------
// Radio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RadioConfig {
    /// Request an acknowledgement and retry until one arrives.
    pub ack_enabled: bool,
    /// Additional attempts after the first (6 attempts total with 5).
    pub retry_limit: u8,
    /// Low-power wait between failed attempts (ms).
    pub retry_backoff_ms: u32,
    /// How long to listen for the acknowledgement after each send (ms).
    pub ack_window_ms: u32,
    /// Receive polling granularity inside the ack window (µs).
    pub ack_poll_interval_us: u32,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            ack_enabled: true,
            retry_limit: 5,
            retry_backoff_ms: 1000,
            ack_window_ms: 10,
            ack_poll_interval_us: 250,
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Settling time after the rail is switched on (ms).
    pub warmup_ms: u32,
    /// Wait between failed polls (ms).
    pub retry_backoff_ms: u32,
    pub retry: SensorRetryPolicy,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            warmup_ms: 2000,
            retry_backoff_ms: 250,
            retry: SensorRetryPolicy::Deadline { budget_ms: 10_000 },
        }
    }
}

// ---------------------------------------------------------------------------
// Supply voltage
// ---------------------------------------------------------------------------

/// Resistor-divider battery sense parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DividerConfig {
    /// Upper resistor (battery side), ohms.
    pub r1_ohms: u32,
    /// Lower resistor (ground side), ohms.
    pub r2_ohms: u32,
    /// ADC reference voltage (V).
    pub vref: f32,
    /// Voltage reported as 0 % (V).
    pub vmin: f32,
    /// Voltage reported as 100 % (V).
    pub vmax: f32,
    /// Conversions averaged per measurement.
    pub samples: u8,
    /// Pause between conversions (ms).
    pub sample_delay_ms: u32,
}

impl Default for DividerConfig {
    fn default() -> Self {
        Self {
            r1_ohms: 10_000,
            r2_ohms: 10_000,
            vref: 3.3,
            vmin: 3.0,
            vmax: 4.2,
            samples: 5,
            sample_delay_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SupplyMethod {
    /// Internal reference measured against the supply rail.
    ReferenceRatio { reference_constant: u32 },
    /// External divider on an analog pin, averaged.
    DividerAverage(DividerConfig),
}

/// 1.1 V bandgap × 1024 steps × 1000 mV.
pub const DEFAULT_REFERENCE_CONSTANT: u32 = 1_126_400;

// ---------------------------------------------------------------------------
// Top-level
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub identity: NodeIdentity,
    pub layout: RecordLayout,
    pub radio: RadioConfig,
    pub sensor: SensorConfig,
    pub supply: SupplyMethod,
    /// Time between scheduled measurement cycles (seconds).
    pub cycle_interval_secs: u32,
    /// Longest single suspension the sleep primitive supports (ms).
    pub max_sleep_chunk_ms: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            identity: NodeIdentity {
                node_id: NodeId(17),
                group: 210,
                band: Band::Mhz433,
            },
            layout: RecordLayout::Battery,
            radio: RadioConfig::default(),
            sensor: SensorConfig::default(),
            supply: SupplyMethod::DividerAverage(DividerConfig::default()),
            cycle_interval_secs: 300, // 5 min
            max_sleep_chunk_ms: 60_000,
        }
    }
}

impl NodeConfig {
    /// Reject configurations the firmware cannot run correctly.
    /// Values are never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg| Err(ConfigError::ValidationFailed(msg));

        NodeId::new(self.identity.node_id.get())?;

        if self.radio.retry_limit > 15 {
            return fail("radio.retry_limit must be <= 15");
        }
        if self.radio.ack_enabled {
            if self.radio.ack_window_ms == 0 {
                return fail("radio.ack_window_ms must be non-zero");
            }
            if self.radio.ack_poll_interval_us == 0 {
                return fail("radio.ack_poll_interval_us must be non-zero");
            }
        }
        if matches!(self.sensor.retry, SensorRetryPolicy::Deadline { .. })
            && self.sensor.retry_backoff_ms == 0
        {
            return fail("sensor.retry_backoff_ms must be non-zero with a deadline");
        }
        if self.cycle_interval_secs == 0 {
            return fail("cycle_interval_secs must be non-zero");
        }
        if self.max_sleep_chunk_ms == 0 {
            return fail("max_sleep_chunk_ms must be non-zero");
        }
        if self.layout.encoded_len() > MAX_PAYLOAD {
            return fail("layout exceeds radio payload");
        }

        match &self.supply {
            SupplyMethod::ReferenceRatio { reference_constant } => {
                if *reference_constant == 0 {
                    return fail("supply.reference_constant must be non-zero");
                }
                if self.layout == RecordLayout::Battery {
                    return fail("battery layout requires the divider method");
                }
            }
            SupplyMethod::DividerAverage(d) => {
                if d.r2_ohms == 0 {
                    return fail("supply.r2_ohms must be non-zero");
                }
                if d.samples == 0 {
                    return fail("supply.samples must be >= 1");
                }
                if usize::from(d.samples) > MAX_SAMPLES {
                    return fail("supply.samples must be <= 16");
                }
                if d.vmax <= d.vmin {
                    return fail("supply.vmax must be above vmin");
                }
            }
        }
        Ok(())
    }

    /// Full cycle interval in milliseconds.
    pub fn cycle_interval_ms(&self) -> u64 {
        u64::from(self.cycle_interval_secs) * 1000
    }

    // ── Serialised profiles ───────────────────────────────────

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_postcard(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = postcard::from_bytes(bytes).map_err(|_| ConfigError::Malformed)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_postcard(&self) -> Result<Vec<u8>, ConfigError> {
        postcard::to_allocvec(self).map_err(|_| ConfigError::Malformed)
    }
}
