//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sensorhub_domain::error::SensorHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps handler failures to an HTTP response with appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    /// Failure reported by an application service.
    Domain(SensorHubError),
    /// A path or query parameter could not be parsed.
    InvalidParameter { name: &'static str, value: String },
    /// An uploaded body could not be staged on disk.
    Staging(std::io::Error),
}

impl From<SensorHubError> for ApiError {
    fn from(err: SensorHubError) -> Self {
        Self::Domain(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Domain(err @ (SensorHubError::Decode(_) | SensorHubError::Rejected(_))) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            Self::Domain(SensorHubError::NotFound(err)) => (StatusCode::NOT_FOUND, err.to_string()),
            Self::Domain(err @ (SensorHubError::Storage(_) | SensorHubError::Publish(_))) => {
                tracing::error!(error = %err, source = ?std::error::Error::source(err), "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            Self::InvalidParameter { name, value } => (
                StatusCode::BAD_REQUEST,
                format!("invalid {name}: {value:?}"),
            ),
            Self::Staging(err) => {
                tracing::error!(error = %err, "unable to stage upload");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
