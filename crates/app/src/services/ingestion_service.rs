//! Ingestion service — the upload pipeline.
//!
//! A reading goes through: updatability check, timestamp normalization,
//! value validation, history append (skipped for control sensors), snapshot
//! write, trigger dispatch, then a publish of the stored snapshot. History
//! and snapshot are committed before any trigger runs.

use serde::Serialize;
use serde_json::Value;

use sensorhub_domain::error::{RejectReason, SensorHubError};
use sensorhub_domain::history::HistoryRecord;
use sensorhub_domain::reading::{Payload, Reading};
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::snapshot::Snapshot;
use sensorhub_domain::time::{self, now};
use sensorhub_domain::value::SensorValue;

use crate::ports::{HistoryRepository, Publisher, SensorRepository, TriggerRepository};
use crate::trigger_dispatcher::TriggerDispatcher;

/// Answer to a single-reading upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    /// Why the reading was refused, `None` when it was accepted.
    pub err: Option<String>,
}

impl UploadResult {
    #[must_use]
    pub fn accepted() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn rejected(reason: impl ToString) -> Self {
        Self {
            err: Some(reason.to_string()),
        }
    }
}

/// What an upload produced.
#[derive(Debug)]
pub enum UploadOutcome {
    /// The body was one reading, or could not be decoded at all.
    Single(UploadResult),
    /// One entry per batch element, in order. `Ok` carries the sensor state
    /// after that element was stored.
    Batch(Vec<Result<Sensor, SensorHubError>>),
}

/// Runs the ingestion pipeline for one sensor at a time.
pub struct IngestionService<SR, HR, TR, P> {
    sensor_repo: SR,
    history_repo: HR,
    triggers: TriggerDispatcher<TR>,
    publisher: P,
}

impl<SR, HR, TR, P> IngestionService<SR, HR, TR, P>
where
    SR: SensorRepository,
    HR: HistoryRepository,
    TR: TriggerRepository,
    P: Publisher,
{
    /// Create a new service from its collaborators.
    pub fn new(sensor_repo: SR, history_repo: HR, trigger_repo: TR, publisher: P) -> Self {
        Self {
            sensor_repo,
            history_repo,
            triggers: TriggerDispatcher::new(trigger_repo),
            publisher,
        }
    }

    /// Decode `body` and apply every reading it carries to `sensor`.
    ///
    /// A body that cannot be decoded, or any body sent to a sensor type that
    /// does not take readings, is reported as a single rejected result and
    /// nothing is written. Batch elements are applied in order, each one
    /// seeing the snapshot left by the previous success; a failing element
    /// never stops the ones after it.
    ///
    /// # Errors
    ///
    /// Returns a storage error when a single reading could not be persisted.
    /// Refused readings are reported inside [`UploadOutcome`], not as errors.
    pub async fn upload(
        &self,
        sensor: &Sensor,
        body: &[u8],
    ) -> Result<UploadOutcome, SensorHubError> {
        let payload = match Payload::decode(body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::debug!(sensor_id = %sensor.id, error = %err, "upload body rejected");
                return Ok(UploadOutcome::Single(UploadResult::rejected(err)));
            }
        };

        if !sensor.sensor_type.is_updatable() {
            tracing::debug!(sensor_id = %sensor.id, sensor_type = sensor.sensor_type.as_str(), "upload to non-updatable sensor");
            return Ok(UploadOutcome::Single(UploadResult::rejected(
                RejectReason::NotUpdatable,
            )));
        }

        match payload {
            Payload::Single(reading) => match self.update_sensor_value(sensor, &reading).await {
                Ok(_) => Ok(UploadOutcome::Single(UploadResult::accepted())),
                Err(err) => match err.client_reason() {
                    Some(reason) => Ok(UploadOutcome::Single(UploadResult::rejected(reason))),
                    None => Err(err),
                },
            },
            Payload::Batch(items) => Ok(UploadOutcome::Batch(self.apply_batch(sensor, items).await)),
        }
    }

    async fn apply_batch(
        &self,
        sensor: &Sensor,
        items: Vec<Value>,
    ) -> Vec<Result<Sensor, SensorHubError>> {
        let mut current = sensor.clone();
        let mut results = Vec::with_capacity(items.len());

        for (index, item) in items.into_iter().enumerate() {
            let result = match Reading::try_from(item) {
                Ok(reading) => self.update_sensor_value(&current, &reading).await,
                Err(reason) => {
                    tracing::debug!(sensor_id = %sensor.id, index, reason = %reason, "batch element rejected");
                    Err(reason.into())
                }
            };
            match &result {
                Ok(updated) => current = updated.clone(),
                Err(err) if err.client_reason().is_none() => {
                    tracing::warn!(sensor_id = %sensor.id, index, error = %err, "batch element failed");
                }
                Err(_) => {}
            }
            results.push(result);
        }

        results
    }

    /// Apply one reading to `sensor` and return the sensor as now stored.
    ///
    /// Nothing is written unless the reading is fully valid. Trigger and
    /// publish failures are logged and do not fail the reading.
    ///
    /// # Errors
    ///
    /// - [`SensorHubError::Rejected`] when the sensor type is not updatable,
    ///   the timestamp does not parse, or the value fails validation
    /// - a storage error when the history append or snapshot write fails
    pub async fn update_sensor_value(
        &self,
        sensor: &Sensor,
        reading: &Reading,
    ) -> Result<Sensor, SensorHubError> {
        let (recorded_at, value) = match validate(sensor, reading) {
            Ok(accepted) => accepted,
            Err(reason) => {
                tracing::debug!(sensor_id = %sensor.id, reason = %reason, "reading rejected");
                return Err(reason.into());
            }
        };
        let shard = sensor.shard();

        if sensor.records_history() {
            self.history_repo
                .append(shard, HistoryRecord::for_value(sensor.id, recorded_at, &value))
                .await?;
        }

        let snapshot = Snapshot::of(reading, recorded_at);
        let stored = snapshot.to_json_string();
        self.sensor_repo
            .update_snapshot(shard, sensor.id, &stored, snapshot.taken_at())
            .await?;

        let mut updated = sensor.clone();
        updated.value = Some(stored);
        updated.last_update_time = Some(snapshot.taken_at());

        if let Err(err) = self
            .triggers
            .dispatch(&self.publisher, &updated, reading, &value)
            .await
        {
            tracing::warn!(sensor_id = %sensor.id, %shard, error = %err, "unable to load triggers");
        }

        let topic = updated.topic();
        if let Err(err) = self
            .publisher
            .publish(&topic, updated.value.as_deref().unwrap_or_default())
            .await
        {
            tracing::warn!(sensor_id = %sensor.id, %topic, error = %err, "snapshot publish failed");
        }

        Ok(updated)
    }
}

fn validate(sensor: &Sensor, reading: &Reading) -> Result<(time::Timestamp, SensorValue), RejectReason> {
    if !sensor.sensor_type.is_updatable() {
        return Err(RejectReason::NotUpdatable);
    }
    let recorded_at = time::normalize(reading.timestamp(), now())?;
    let value = SensorValue::decode(sensor.sensor_type, reading.value())?;
    Ok((recorded_at, value))
}
