//! Measurement record and its wire codec.
//!
//! The receiver has no schema negotiation: it knows each node's layout by
//! node id.  The byte layout is therefore pinned here per [`RecordLayout`]
//! and encoded field by field, never by reinterpreting the struct.
//!
//! ```text
//! Basic    │ temp │ hum  │ mV   │
//! Battery  │ temp │ hum  │ mV   │ pct  │
//! Contact  │ temp │ hum  │ mV   │ door │
//! Dual     │ temp │ hum  │ temp2│ hum2 │ mV   │
//!           each cell: i16 little-endian
//! ```

use heapless::Vec;
use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Largest payload the radio link carries.
pub const MAX_PAYLOAD: usize = 66;

/// Value transmitted when a reading could not be obtained this cycle.
pub const MISSING_READING: i16 = i16::MIN;

/// Fields that can appear in a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Temperature,
    Humidity,
    SupplyVoltage,
    SupplyPercent,
    ContactState,
    SecondaryTemperature,
    SecondaryHumidity,
}

/// Build-time record shape for a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordLayout {
    Basic,
    Battery,
    Contact,
    Dual,
}

impl RecordLayout {
    /// Field order on the wire.
    pub const fn fields(self) -> &'static [Field] {
        use Field::*;
        match self {
            Self::Basic => &[Temperature, Humidity, SupplyVoltage],
            Self::Battery => &[Temperature, Humidity, SupplyVoltage, SupplyPercent],
            Self::Contact => &[Temperature, Humidity, SupplyVoltage, ContactState],
            Self::Dual => &[
                Temperature,
                Humidity,
                SecondaryTemperature,
                SecondaryHumidity,
                SupplyVoltage,
            ],
        }
    }

    pub const fn encoded_len(self) -> usize {
        self.fields().len() * 2
    }

    pub fn has(self, field: Field) -> bool {
        self.fields().contains(&field)
    }
}

/// One cycle's measurements.  Overwritten in place every cycle; fields not
/// in the node's layout stay at zero and are never transmitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeasurementRecord {
    /// °C × 100
    pub temperature: i16,
    /// %RH × 100
    pub humidity: i16,
    /// mV
    pub supply_voltage: i16,
    /// 0–10000 = 0–100.00 % (not clamped)
    pub supply_percent: i16,
    /// 1 = closed
    pub contact_state: i16,
    pub secondary_temperature: i16,
    pub secondary_humidity: i16,
}

impl MeasurementRecord {
    pub fn get(&self, field: Field) -> i16 {
        match field {
            Field::Temperature => self.temperature,
            Field::Humidity => self.humidity,
            Field::SupplyVoltage => self.supply_voltage,
            Field::SupplyPercent => self.supply_percent,
            Field::ContactState => self.contact_state,
            Field::SecondaryTemperature => self.secondary_temperature,
            Field::SecondaryHumidity => self.secondary_humidity,
        }
    }

    fn slot(&mut self, field: Field) -> &mut i16 {
        match field {
            Field::Temperature => &mut self.temperature,
            Field::Humidity => &mut self.humidity,
            Field::SupplyVoltage => &mut self.supply_voltage,
            Field::SupplyPercent => &mut self.supply_percent,
            Field::ContactState => &mut self.contact_state,
            Field::SecondaryTemperature => &mut self.secondary_temperature,
            Field::SecondaryHumidity => &mut self.secondary_humidity,
        }
    }

    /// Encode the fields of `layout` in order.
    pub fn encode(&self, layout: RecordLayout) -> Vec<u8, MAX_PAYLOAD> {
        let mut out = Vec::new();
        for &field in layout.fields() {
            // Every layout is far below MAX_PAYLOAD (checked by config validation).
            let _ = out.extend_from_slice(&self.get(field).to_le_bytes());
        }
        out
    }

    /// Decode a payload produced by [`encode`](Self::encode) for the same layout.
    pub fn decode(layout: RecordLayout, bytes: &[u8]) -> Result<Self, CodecError> {
        let expected = layout.encoded_len();
        if bytes.len() != expected {
            return Err(CodecError::LengthMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        let mut record = Self::default();
        for (&field, pair) in layout.fields().iter().zip(bytes.chunks_exact(2)) {
            *record.slot(field) = i16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(record)
    }
}
