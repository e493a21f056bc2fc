//! Sensor values — the typed result of validating a reading's `value`.
//!
//! Validation is selected by the sensor's declared [`SensorType`]; each
//! updatable type has its own decoder. Decoders never panic and never
//! perform IO: they return the typed value or the [`RejectReason`] that is
//! reported back to the uploader.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RejectReason;
use crate::sensor::SensorType;

/// A validated, strongly-typed reading value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SensorValue {
    Number { value: f64 },
    Location(Location),
    /// `document` is the whole reading value re-serialized as compact JSON.
    Kv { key: String, document: String },
    /// Always `0` or `1`.
    Onoff { value: u8 },
}

/// A GPS fix with ground speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lan: f64,
    pub lat: f64,
    pub speed: f64,
}

const GPS_KEYS: [&str; 3] = ["lan", "lat", "speed"];

impl SensorValue {
    /// Validate `raw` against `sensor_type`.
    ///
    /// # Errors
    ///
    /// Returns the per-type [`RejectReason`]; non-updatable types yield
    /// [`RejectReason::NotUpdatable`].
    pub fn decode(sensor_type: SensorType, raw: Option<&Value>) -> Result<Self, RejectReason> {
        match sensor_type {
            SensorType::Number => decode_number(raw),
            SensorType::Location => decode_location(raw),
            SensorType::Kv => decode_kv(raw),
            SensorType::Onoff => Ok(decode_onoff(raw)),
            SensorType::Image | SensorType::Unknown => Err(RejectReason::NotUpdatable),
        }
    }

    /// The type this value belongs to.
    #[must_use]
    pub fn sensor_type(&self) -> SensorType {
        match self {
            Self::Number { .. } => SensorType::Number,
            Self::Location(_) => SensorType::Location,
            Self::Kv { .. } => SensorType::Kv,
            Self::Onoff { .. } => SensorType::Onoff,
        }
    }

    /// Numeric view used by threshold rules.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number { value } => Some(*value),
            Self::Onoff { value } => Some(f64::from(*value)),
            Self::Location(loc) => Some(loc.speed),
            Self::Kv { .. } => None,
        }
    }

    /// The coerced value as plain JSON (what triggers compare against).
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Number { value } => Value::from(*value),
            Self::Location(loc) => serde_json::json!({
                "lan": loc.lan,
                "lat": loc.lat,
                "speed": loc.speed,
            }),
            Self::Kv { document, .. } => {
                serde_json::from_str(document).unwrap_or_else(|_| Value::String(document.clone()))
            }
            Self::Onoff { value } => Value::from(*value),
        }
    }
}

fn decode_number(raw: Option<&Value>) -> Result<SensorValue, RejectReason> {
    raw.and_then(Value::as_f64)
        .map(|value| SensorValue::Number { value })
        .ok_or(RejectReason::BadValue)
}

fn decode_location(raw: Option<&Value>) -> Result<SensorValue, RejectReason> {
    let Some(Value::Object(fields)) = raw else {
        return Err(RejectReason::BadGpsData);
    };
    if !GPS_KEYS.iter().all(|key| fields.contains_key(*key)) {
        return Err(RejectReason::MissingGpsKey);
    }
    let coord = |key: &str| coordinate(fields, key).ok_or(RejectReason::BadGpsData);
    Ok(SensorValue::Location(Location {
        lan: coord("lan")?,
        lat: coord("lat")?,
        speed: coord("speed")?,
    }))
}

/// Devices send coordinates either as JSON numbers or numeric strings.
fn coordinate(fields: &Map<String, Value>, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn decode_kv(raw: Option<&Value>) -> Result<SensorValue, RejectReason> {
    let Some(document @ Value::Object(fields)) = raw else {
        return Err(RejectReason::BlankKey);
    };
    let key = fields
        .get("key")
        .and_then(Value::as_str)
        .filter(|key| !key.trim().is_empty())
        .ok_or(RejectReason::BlankKey)?;
    Ok(SensorValue::Kv {
        key: key.to_string(),
        document: document.to_string(),
    })
}

/// Only the literal string `"1"` means on. Numbers and booleans are off.
fn decode_onoff(raw: Option<&Value>) -> SensorValue {
    let value = match raw {
        Some(Value::String(s)) if s == "1" => 1,
        _ => 0,
    };
    SensorValue::Onoff { value }
}
