//! `SQLite` implementation of [`TriggerRepository`].

use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use sensorhub_app::ports::TriggerRepository;
use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::id::{SensorId, TriggerId};
use sensorhub_domain::shard::ShardId;
use sensorhub_domain::trigger::{Trigger, TriggerAction, TriggerCondition};

use crate::error::StorageError;
use crate::pool::Database;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(Trigger);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: uuid::Uuid = row.try_get("id")?;
        let sensor_id: i64 = row.try_get("sensor_id")?;
        let name: String = row.try_get("name")?;
        let enabled: bool = row.try_get("enabled")?;
        let condition_json: String = row.try_get("condition")?;
        let action_json: String = row.try_get("action")?;

        let condition: TriggerCondition = serde_json::from_str(&condition_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let action: TriggerAction = serde_json::from_str(&action_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Trigger {
            id: TriggerId::from_uuid(id),
            sensor_id: SensorId::new(sensor_id),
            name,
            enabled,
            condition,
            action,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO triggers (id, sensor_id, name, enabled, condition, action)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_SENSOR: &str = "SELECT * FROM triggers WHERE sensor_id = ? ORDER BY rowid ASC";

/// `SQLite`-backed trigger repository.
#[derive(Clone)]
pub struct SqliteTriggerRepository {
    db: Arc<Database>,
}

impl SqliteTriggerRepository {
    /// Create a new repository over the sharded database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a trigger on the shard of the sensor it watches.
    ///
    /// # Errors
    ///
    /// Returns a storage error if serialization or the insert fails.
    pub async fn insert(&self, trigger: &Trigger) -> Result<(), SensorHubError> {
        let condition_json = serde_json::to_string(&trigger.condition).map_err(StorageError::from)?;
        let action_json = serde_json::to_string(&trigger.action).map_err(StorageError::from)?;
        let pool = self.db.pool(ShardId::of(trigger.sensor_id)).await?;

        sqlx::query(INSERT)
            .bind(trigger.id.as_uuid())
            .bind(trigger.sensor_id.get())
            .bind(&trigger.name)
            .bind(trigger.enabled)
            .bind(&condition_json)
            .bind(&action_json)
            .execute(&pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

impl TriggerRepository for SqliteTriggerRepository {
    async fn find_by_sensor(&self, shard: ShardId, sensor_id: SensorId) -> Result<Vec<Trigger>, SensorHubError> {
        let pool = self.db.pool(shard).await?;
        let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_SENSOR)
            .bind(sensor_id.get())
            .fetch_all(&pool)
            .await
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
