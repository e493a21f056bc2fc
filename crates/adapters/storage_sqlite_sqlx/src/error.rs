//! Storage-specific error type wrapping sqlx and filesystem errors.

use sensorhub_domain::error::SensorHubError;

/// Errors originating from the storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error")]
    Database(#[from] sqlx::Error),

    /// Failed to (de)serialize a stored JSON value.
    #[error("JSON serialization error")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The photo store could not read or write a file.
    #[error("file error")]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for SensorHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
