//! History records — immutable, append-only log of accepted readings.
//!
//! One record per accepted reading, tagged with the owning sensor and the
//! normalized timestamp. Each sensor type has its own record shape and its
//! own storage table.

use serde::{Deserialize, Serialize};

use crate::id::{HistoryId, SensorId};
use crate::sensor::SensorType;
use crate::time::Timestamp;
use crate::value::SensorValue;

/// A single history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: HistoryId,
    pub sensor_id: SensorId,
    pub recorded_at: Timestamp,
    #[serde(flatten)]
    pub data: HistoryData,
}

/// Type-specific payload of a [`HistoryRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryData {
    Number { value: f64 },
    Location { lan: f64, lat: f64, speed: f64 },
    /// `value` is the full reading value as compact JSON text.
    Kv { key: String, value: String },
    Onoff { value: u8 },
    /// The binary payload lives in the photo store under the record id.
    Image { width: u32, height: u32 },
}

impl HistoryData {
    /// The sensor type whose table stores this payload.
    #[must_use]
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Number { .. } => SensorType::Number,
            Self::Location { .. } => SensorType::Location,
            Self::Kv { .. } => SensorType::Kv,
            Self::Onoff { .. } => SensorType::Onoff,
            Self::Image { .. } => SensorType::Image,
        }
    }
}

impl From<&SensorValue> for HistoryData {
    fn from(value: &SensorValue) -> Self {
        match value {
            SensorValue::Number { value } => Self::Number { value: *value },
            SensorValue::Location(loc) => Self::Location {
                lan: loc.lan,
                lat: loc.lat,
                speed: loc.speed,
            },
            SensorValue::Kv { key, document } => Self::Kv {
                key: key.clone(),
                value: document.clone(),
            },
            SensorValue::Onoff { value } => Self::Onoff { value: *value },
        }
    }
}

impl HistoryRecord {
    /// New record with a freshly generated id.
    #[must_use]
    pub fn new(sensor_id: SensorId, recorded_at: Timestamp, data: HistoryData) -> Self {
        Self {
            id: HistoryId::new(),
            sensor_id,
            recorded_at,
            data,
        }
    }

    /// Record for an accepted reading value.
    #[must_use]
    pub fn for_value(sensor_id: SensorId, recorded_at: Timestamp, value: &SensorValue) -> Self {
        Self::new(sensor_id, recorded_at, HistoryData::from(value))
    }

    #[must_use]
    pub fn sensor_type(&self) -> SensorType {
        self.data.sensor_type()
    }
}
