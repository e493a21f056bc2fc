//! Storage ports — repository traits for sharded persistence.

use std::future::Future;

use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::history::HistoryRecord;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::{Sensor, SensorType};
use sensorhub_domain::shard::ShardId;
use sensorhub_domain::time::Timestamp;
use sensorhub_domain::trigger::Trigger;

/// Sensor rows. Only the snapshot columns are ever written by the pipeline.
pub trait SensorRepository {
    /// Get a sensor by id from its shard.
    fn get_by_id(
        &self,
        shard: ShardId,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, SensorHubError>> + Send;

    /// Write `value` and `last_update_time`, leaving every other column alone.
    fn update_snapshot(
        &self,
        shard: ShardId,
        id: SensorId,
        value: &str,
        last_update_time: Timestamp,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send;

    /// Write `last_update_time` only.
    fn touch(
        &self,
        shard: ShardId,
        id: SensorId,
        last_update_time: Timestamp,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send;
}

/// Append-only history log, one table per sensor type.
pub trait HistoryRepository {
    /// Append a record.
    fn append(
        &self,
        shard: ShardId,
        record: HistoryRecord,
    ) -> impl Future<Output = Result<HistoryRecord, SensorHubError>> + Send;

    /// Records of one sensor within `[from, to]`, oldest first.
    fn find_by_sensor_in_range(
        &self,
        shard: ShardId,
        sensor_id: SensorId,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<HistoryRecord>, SensorHubError>> + Send;
}

/// Trigger rules bound to sensors.
pub trait TriggerRepository {
    /// All triggers of a sensor, in insertion order.
    fn find_by_sensor(
        &self,
        shard: ShardId,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<Vec<Trigger>, SensorHubError>> + Send;
}
