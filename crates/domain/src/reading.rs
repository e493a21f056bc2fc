//! Readings — the per-request input of the ingestion pipeline.
//!
//! An upload body is either a single reading object or a list of them.
//! A [`Reading`] is immutable once decoded; the snapshot written back to
//! the sensor is built from a copy (see [`crate::snapshot`]).

use serde_json::{Map, Value};

use crate::error::{DecodeError, RejectReason};

/// One reading: at least `value`, optionally `timestamp`, plus whatever
/// extra fields the device sent.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    fields: Map<String, Value>,
}

impl Reading {
    /// Wrap an already-decoded JSON object.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// The raw `value` field, if present.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        self.fields.get("value")
    }

    /// The raw `timestamp` field, if present.
    #[must_use]
    pub fn timestamp(&self) -> Option<&Value> {
        self.fields.get("timestamp")
    }

    /// All fields as sent.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }
}

impl TryFrom<Value> for Reading {
    type Error = RejectReason;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self::new(fields)),
            _ => Err(RejectReason::NotAnObject),
        }
    }
}

/// Decoded top-level upload body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Single(Reading),
    /// Elements are checked one at a time so a bad element only fails itself.
    Batch(Vec<Value>),
}

impl Payload {
    /// Decode a raw upload body.
    ///
    /// # Errors
    ///
    /// - [`DecodeError::Empty`] for an empty/whitespace body or literal `null`
    /// - [`DecodeError::Malformed`] when the body is not JSON
    /// - [`DecodeError::UnsupportedShape`] for a top-level scalar
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(DecodeError::Empty);
        }
        let document: Value = serde_json::from_slice(body).map_err(DecodeError::Malformed)?;
        match document {
            Value::Null => Err(DecodeError::Empty),
            Value::Array(items) => Ok(Self::Batch(items)),
            Value::Object(fields) => Ok(Self::Single(Reading::new(fields))),
            Value::Bool(_) | Value::Number(_) | Value::String(_) => {
                Err(DecodeError::UnsupportedShape)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn should_decode_single_object_as_single_reading() {
        let payload = Payload::decode(br#"{"value": 21.5}"#).unwrap();
        let Payload::Single(reading) = payload else {
            panic!("expected single reading");
        };
        assert_eq!(reading.value(), Some(&json!(21.5)));
        assert!(reading.timestamp().is_none());
    }

    #[test]
    fn should_decode_list_as_batch() {
        let payload = Payload::decode(br#"[{"value": 1}, {"value": 2}]"#).unwrap();
        assert!(matches!(payload, Payload::Batch(items) if items.len() == 2));
    }

    #[test]
    fn should_report_null_json_when_body_empty() {
        assert!(matches!(Payload::decode(b""), Err(DecodeError::Empty)));
        assert!(matches!(Payload::decode(b"  \n"), Err(DecodeError::Empty)));
        assert!(matches!(Payload::decode(b"null"), Err(DecodeError::Empty)));
    }

    #[test]
    fn should_report_bad_json_when_body_malformed() {
        let err = Payload::decode(b"{value: 1").unwrap_err();
        assert_eq!(err.to_string(), "Bad json");
    }

    #[test]
    fn should_report_bad_data_type_for_top_level_scalar() {
        assert!(matches!(
            Payload::decode(b"42"),
            Err(DecodeError::UnsupportedShape)
        ));
        assert!(matches!(
            Payload::decode(br#""text""#),
            Err(DecodeError::UnsupportedShape)
        ));
    }

    #[test]
    fn should_refuse_batch_element_that_is_not_object() {
        assert_eq!(
            Reading::try_from(json!([1, 2])),
            Err(RejectReason::NotAnObject)
        );
    }
}
