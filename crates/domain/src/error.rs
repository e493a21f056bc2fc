//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SensorHubError`] via `From`. The `Display` strings of [`DecodeError`]
//! and [`RejectReason`] are part of the upload contract: they are returned
//! verbatim to the client.

/// Top-level error shared by every layer.
#[derive(Debug, thiserror::Error)]
pub enum SensorHubError {
    /// The upload body could not be turned into readings at all.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// A single reading was refused.
    #[error(transparent)]
    Rejected(#[from] RejectReason),

    /// A requested record does not exist.
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    /// The storage collaborator failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The publish collaborator failed.
    #[error("publish error")]
    Publish(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl SensorHubError {
    /// Reason string reported back to the uploader, when the error is one the
    /// client caused.
    #[must_use]
    pub fn client_reason(&self) -> Option<String> {
        match self {
            Self::Decode(err) => Some(err.to_string()),
            Self::Rejected(err) => Some(err.to_string()),
            Self::NotFound(_) | Self::Storage(_) | Self::Publish(_) => None,
        }
    }
}

/// Failure to decode the top-level upload body.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The body is empty or the literal `null`.
    #[error("NULL json")]
    Empty,

    /// The body is not valid JSON.
    #[error("Bad json")]
    Malformed(#[source] serde_json::Error),

    /// The body is JSON but neither an object nor a list.
    #[error("bad data type")]
    UnsupportedShape,
}

/// Why a single reading was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("bad value")]
    BadValue,
    #[error("miss some gps key")]
    MissingGpsKey,
    #[error("bad gps data")]
    BadGpsData,
    #[error("key is blank or miss")]
    BlankKey,
    #[error("not updatable")]
    NotUpdatable,
    #[error("bad timestamp")]
    BadTimestamp,
    /// A batch element that is not an object.
    #[error("bad data type")]
    NotAnObject,
}

/// A lookup by identifier found nothing.
#[derive(Debug, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
