//! Time and timestamp helpers.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::RejectReason;

/// UTC timestamp used for reading times, `last_update_time`, history records, etc.
pub type Timestamp = DateTime<Utc>;

/// Pattern of client-supplied reading timestamps (`20240131T08:15:00`).
pub const READING_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H:%M:%S";

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Turn the optional `timestamp` of a reading into a canonical instant.
///
/// Absent (or `null`) falls back to `ingested_at`. Scalars are rendered as
/// text and parsed with [`READING_TIMESTAMP_FORMAT`], interpreted as UTC.
///
/// # Errors
///
/// Returns [`RejectReason::BadTimestamp`] when the value is a structure or
/// does not match the pattern.
pub fn normalize(raw: Option<&Value>, ingested_at: Timestamp) -> Result<Timestamp, RejectReason> {
    let text = match raw {
        None | Some(Value::Null) => return Ok(ingested_at),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Array(_) | Value::Object(_)) => return Err(RejectReason::BadTimestamp),
    };
    NaiveDateTime::parse_from_str(&text, READING_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| RejectReason::BadTimestamp)
}
