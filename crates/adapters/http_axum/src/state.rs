//! Shared application state for axum handlers.

use std::sync::Arc;

use sensorhub_app::services::image_service::ImageService;
use sensorhub_app::services::ingestion_service::IngestionService;
use sensorhub_app::services::sensor_service::SensorService;

/// Application state shared across all axum handlers.
///
/// Generic over the repositories, the publisher, and the binary store to
/// avoid dynamic dispatch. `Clone` is implemented manually so the underlying
/// types themselves do not need to be `Clone`; only the `Arc` wrappers are
/// cloned.
pub struct AppState<SR, HR, TR, P, BS> {
    /// Upload pipeline.
    pub ingestion_service: Arc<IngestionService<SR, HR, TR, P>>,
    /// Image readings.
    pub image_service: Arc<ImageService<SR, HR, BS>>,
    /// Sensor and history reads.
    pub sensor_service: Arc<SensorService<SR, HR>>,
}

impl<SR, HR, TR, P, BS> Clone for AppState<SR, HR, TR, P, BS> {
    fn clone(&self) -> Self {
        Self {
            ingestion_service: Arc::clone(&self.ingestion_service),
            image_service: Arc::clone(&self.image_service),
            sensor_service: Arc::clone(&self.sensor_service),
        }
    }
}

impl<SR, HR, TR, P, BS> AppState<SR, HR, TR, P, BS> {
    /// Create a new application state from service instances.
    pub fn new(
        ingestion_service: IngestionService<SR, HR, TR, P>,
        image_service: ImageService<SR, HR, BS>,
        sensor_service: SensorService<SR, HR>,
    ) -> Self {
        Self {
            ingestion_service: Arc::new(ingestion_service),
            image_service: Arc::new(image_service),
            sensor_service: Arc::new(sensor_service),
        }
    }
}
