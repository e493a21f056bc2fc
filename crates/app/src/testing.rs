//! In-memory port implementations shared by the service tests.
//!
//! Each double is `Clone` and shares its state, so a test keeps one handle
//! for assertions and gives the other to the service under test.

use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::history::HistoryRecord;
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::{Sensor, SensorType};
use sensorhub_domain::shard::ShardId;
use sensorhub_domain::time::Timestamp;
use sensorhub_domain::trigger::Trigger;

use crate::ports::{BinaryStore, HistoryRepository, Publisher, SensorRepository, TriggerRepository};

fn unavailable() -> SensorHubError {
    SensorHubError::Storage(Box::new(std::io::Error::other("storage unavailable")))
}

// ── Sensors ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemorySensorRepo {
    pub sensors: Arc<Mutex<HashMap<SensorId, Sensor>>>,
    /// `(shard, sensor, value, last_update_time)` of every snapshot write.
    pub snapshot_writes: Arc<Mutex<Vec<(ShardId, SensorId, String, Timestamp)>>>,
    pub fail: Arc<AtomicBool>,
}

impl InMemorySensorRepo {
    pub fn with(sensors: Vec<Sensor>) -> Self {
        let repo = Self::default();
        repo.sensors
            .lock()
            .unwrap()
            .extend(sensors.into_iter().map(|s| (s.id, s)));
        repo
    }

    pub fn stored(&self, id: SensorId) -> Sensor {
        self.sensors.lock().unwrap()[&id].clone()
    }

    pub fn writes(&self) -> Vec<(ShardId, SensorId, String, Timestamp)> {
        self.snapshot_writes.lock().unwrap().clone()
    }
}

impl SensorRepository for InMemorySensorRepo {
    fn get_by_id(
        &self,
        _shard: ShardId,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, SensorHubError>> + Send {
        let result = self.sensors.lock().unwrap().get(&id).cloned();
        async { Ok(result) }
    }

    fn update_snapshot(
        &self,
        shard: ShardId,
        id: SensorId,
        value: &str,
        last_update_time: Timestamp,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            if let Some(sensor) = self.sensors.lock().unwrap().get_mut(&id) {
                sensor.value = Some(value.to_string());
                sensor.last_update_time = Some(last_update_time);
            }
            self.snapshot_writes.lock().unwrap().push((
                shard,
                id,
                value.to_string(),
                last_update_time,
            ));
            Ok(())
        };
        async { result }
    }

    fn touch(
        &self,
        _shard: ShardId,
        id: SensorId,
        last_update_time: Timestamp,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        if let Some(sensor) = self.sensors.lock().unwrap().get_mut(&id) {
            sensor.last_update_time = Some(last_update_time);
        }
        async { Ok(()) }
    }
}

// ── History ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryHistoryRepo {
    pub records: Arc<Mutex<Vec<(ShardId, HistoryRecord)>>>,
    pub fail: Arc<AtomicBool>,
}

impl InMemoryHistoryRepo {
    pub fn all(&self) -> Vec<(ShardId, HistoryRecord)> {
        self.records.lock().unwrap().clone()
    }
}

impl HistoryRepository for InMemoryHistoryRepo {
    fn append(
        &self,
        shard: ShardId,
        record: HistoryRecord,
    ) -> impl Future<Output = Result<HistoryRecord, SensorHubError>> + Send {
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            self.records.lock().unwrap().push((shard, record.clone()));
            Ok(record)
        };
        async { result }
    }

    fn find_by_sensor_in_range(
        &self,
        shard: ShardId,
        sensor_id: SensorId,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
        limit: Option<usize>,
    ) -> impl Future<Output = Result<Vec<HistoryRecord>, SensorHubError>> + Send {
        let mut found: Vec<HistoryRecord> = self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|(s, r)| {
                *s == shard
                    && r.sensor_id == sensor_id
                    && r.sensor_type() == sensor_type
                    && r.recorded_at >= from
                    && r.recorded_at <= to
            })
            .map(|(_, r)| r.clone())
            .collect();
        found.sort_by_key(|r| r.recorded_at);
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        async { Ok(found) }
    }
}

// ── Triggers ───────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryTriggerRepo {
    pub triggers: Arc<Mutex<Vec<Trigger>>>,
    pub fail: Arc<AtomicBool>,
}

impl InMemoryTriggerRepo {
    pub fn with(triggers: Vec<Trigger>) -> Self {
        Self {
            triggers: Arc::new(Mutex::new(triggers)),
            fail: Arc::default(),
        }
    }
}

impl TriggerRepository for InMemoryTriggerRepo {
    fn find_by_sensor(
        &self,
        _shard: ShardId,
        sensor_id: SensorId,
    ) -> impl Future<Output = Result<Vec<Trigger>, SensorHubError>> + Send {
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(self
                .triggers
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.sensor_id == sensor_id)
                .cloned()
                .collect())
        };
        async { result }
    }
}

// ── Publisher ──────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct SpyPublisher {
    pub messages: Arc<Mutex<Vec<(String, String)>>>,
    /// Topics whose publish fails.
    pub failing_topics: Arc<Mutex<Vec<String>>>,
}

impl SpyPublisher {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn fail_on(&self, topic: &str) {
        self.failing_topics.lock().unwrap().push(topic.to_string());
    }
}

impl Publisher for SpyPublisher {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        let result = if self
            .failing_topics
            .lock()
            .unwrap()
            .iter()
            .any(|t| t == topic)
        {
            Err(SensorHubError::Publish(Box::new(std::io::Error::other(
                "broker down",
            ))))
        } else {
            self.messages
                .lock()
                .unwrap()
                .push((topic.to_string(), payload.to_string()));
            Ok(())
        };
        async { result }
    }
}

// ── Binary store ───────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryBinaryStore {
    pub copies: Arc<Mutex<Vec<(PathBuf, PathBuf)>>>,
    pub initialized: Arc<AtomicBool>,
    pub fail: Arc<AtomicBool>,
}

impl BinaryStore for InMemoryBinaryStore {
    fn init(&self) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        self.initialized.store(true, Ordering::SeqCst);
        async { Ok(()) }
    }

    fn copy(
        &self,
        source: &Path,
        relative: &Path,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        let result = if self.fail.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            self.copies
                .lock()
                .unwrap()
                .push((source.to_path_buf(), relative.to_path_buf()));
            Ok(())
        };
        async { result }
    }
}
