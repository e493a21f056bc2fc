//! Column encodings shared by the repositories.

use chrono::SecondsFormat;
use sensorhub_domain::time::Timestamp;

/// Fixed-width RFC 3339 so text comparison in range queries matches time order.
pub(crate) fn encode_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(text: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(text)
        .map(|ts| ts.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}
