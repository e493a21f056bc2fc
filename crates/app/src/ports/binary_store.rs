//! Binary store port — where image payloads are kept.

use std::future::Future;
use std::path::Path;

use sensorhub_domain::error::SensorHubError;

/// Stores binary files outside the relational storage.
pub trait BinaryStore {
    /// One-time setup (e.g. create the root directory).
    fn init(&self) -> impl Future<Output = Result<(), SensorHubError>> + Send;

    /// Copy `source` to `relative`, a path under the store root.
    fn copy(
        &self,
        source: &Path,
        relative: &Path,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send;
}
