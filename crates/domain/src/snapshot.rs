//! Snapshot — the latest-value serialization stored on the sensor row.
//!
//! Built from a copy of the reading's fields with `timestamp` replaced by
//! the normalized instant; the input [`Reading`] is never modified.

use serde_json::{Map, Value};

use crate::reading::Reading;
use crate::time::Timestamp;

/// Latest-value document written back to a sensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    fields: Map<String, Value>,
    taken_at: Timestamp,
}

impl Snapshot {
    /// Copy `reading` and stamp it with `taken_at`.
    #[must_use]
    pub fn of(reading: &Reading, taken_at: Timestamp) -> Self {
        let mut fields = reading.fields().clone();
        fields.insert(
            "timestamp".to_string(),
            Value::String(taken_at.to_rfc3339()),
        );
        Self { fields, taken_at }
    }

    /// Instant stored as the sensor's `last_update_time`.
    #[must_use]
    pub fn taken_at(&self) -> Timestamp {
        self.taken_at
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Compact JSON text stored in the sensor's `value` column.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}
