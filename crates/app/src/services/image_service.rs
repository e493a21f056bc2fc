//! Image service — image readings kept outside the relational store.

use std::path::{Path, PathBuf};

use sensorhub_domain::error::{RejectReason, SensorHubError};
use sensorhub_domain::history::{HistoryData, HistoryRecord};
use sensorhub_domain::sensor::{Sensor, SensorType};
use sensorhub_domain::time::now;

use crate::ports::{BinaryStore, HistoryRepository, SensorRepository};

/// Stores images and their history entries.
pub struct ImageService<SR, HR, BS> {
    sensor_repo: SR,
    history_repo: HR,
    store: BS,
}

impl<SR, HR, BS> ImageService<SR, HR, BS>
where
    SR: SensorRepository,
    HR: HistoryRepository,
    BS: BinaryStore,
{
    pub fn new(sensor_repo: SR, history_repo: HR, store: BS) -> Self {
        Self {
            sensor_repo,
            history_repo,
            store,
        }
    }

    /// Prepare the binary store. Called once at startup.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be prepared.
    pub async fn init(&self) -> Result<(), SensorHubError> {
        self.store.init().await
    }

    /// Keep the image at `source` for `sensor`.
    ///
    /// The file is copied to `<sensor_id>/<record_id>` in the store, then an
    /// image history record is appended and the sensor's `last_update_time`
    /// is moved forward. The snapshot value is left alone.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::Rejected`] when `sensor` is not an image
    /// sensor. Returns a storage error if the copy, the append, or the
    /// timestamp update fails. Nothing is written after a failed copy.
    pub async fn save_image(
        &self,
        sensor: &Sensor,
        source: &Path,
        width: u32,
        height: u32,
    ) -> Result<HistoryRecord, SensorHubError> {
        if sensor.sensor_type != SensorType::Image {
            return Err(RejectReason::NotUpdatable.into());
        }
        let record = HistoryRecord::new(sensor.id, now(), HistoryData::Image { width, height });
        let shard = sensor.shard();

        self.store.copy(source, &image_path(&record)).await?;
        let record = self.history_repo.append(shard, record).await?;
        self.sensor_repo
            .touch(shard, sensor.id, record.recorded_at)
            .await?;

        tracing::debug!(sensor_id = %sensor.id, record_id = %record.id, width, height, "image stored");
        Ok(record)
    }
}

/// Location of an image relative to the store root.
#[must_use]
pub fn image_path(record: &HistoryRecord) -> PathBuf {
    PathBuf::from(record.sensor_id.to_string()).join(record.id.to_string())
}
