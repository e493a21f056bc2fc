//! Sensor service — read side for sensors and their history.

use sensorhub_domain::error::{NotFoundError, SensorHubError};
use sensorhub_domain::history::HistoryRecord;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::shard::ShardId;
use sensorhub_domain::time::Timestamp;

use crate::ports::{HistoryRepository, SensorRepository};

/// Application service for sensor lookups and history queries.
pub struct SensorService<SR, HR> {
    sensor_repo: SR,
    history_repo: HR,
}

impl<SR: SensorRepository, HR: HistoryRepository> SensorService<SR, HR> {
    pub fn new(sensor_repo: SR, history_repo: HR) -> Self {
        Self {
            sensor_repo,
            history_repo,
        }
    }

    /// Look up a sensor on its shard, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] when no sensor with `id` exists,
    /// or a storage error from the repository.
    pub async fn get_sensor(&self, id: SensorId) -> Result<Sensor, SensorHubError> {
        self.sensor_repo
            .get_by_id(ShardId::of(id), id)
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Sensor",
                    id: id.to_string(),
                }
                .into()
            })
    }

    /// History of a sensor within `[from, to]`, oldest first.
    ///
    /// Records are read from the table of the sensor's declared type.
    ///
    /// # Errors
    ///
    /// Returns [`SensorHubError::NotFound`] when the sensor does not exist,
    /// or a storage error from the repository.
    pub async fn history(
        &self,
        id: SensorId,
        from: Timestamp,
        to: Timestamp,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRecord>, SensorHubError> {
        let sensor = self.get_sensor(id).await?;
        self.history_repo
            .find_by_sensor_in_range(sensor.shard(), id, sensor.sensor_type, from, to, limit)
            .await
    }
}
