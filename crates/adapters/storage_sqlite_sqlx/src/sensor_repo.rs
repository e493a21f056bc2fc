//! `SQLite` implementation of [`SensorRepository`].

use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use sensorhub_app::ports::SensorRepository;
use sensorhub_domain::error::{NotFoundError, SensorHubError};
use sensorhub_domain::id::SensorId;
use sensorhub_domain::sensor::{Sensor, SensorType, UpdateRule};
use sensorhub_domain::shard::ShardId;
use sensorhub_domain::time::Timestamp;

use crate::codec::{decode_timestamp, encode_timestamp};
use crate::error::StorageError;
use crate::pool::Database;

/// Wrapper for converting database rows into domain types without polluting
/// domain structs with database concerns.
struct Wrapper(Sensor);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let name: String = row.try_get("name")?;
        let sensor_type: String = row.try_get("sensor_type")?;
        let update_rule: String = row.try_get("update_rule")?;
        let value: Option<String> = row.try_get("value")?;
        let last_update_time: Option<String> = row.try_get("last_update_time")?;

        let Ok(sensor_type) = sensor_type.parse::<SensorType>();
        let update_rule: UpdateRule = update_rule
            .parse()
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;
        let last_update_time = last_update_time
            .as_deref()
            .map(decode_timestamp)
            .transpose()?;

        Ok(Self(Sensor {
            id: SensorId::new(id),
            name,
            sensor_type,
            update_rule,
            value,
            last_update_time,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sensors (id, name, sensor_type, update_rule, value, last_update_time)
    VALUES (?, ?, ?, ?, ?, ?)
";

const SELECT_BY_ID: &str = "SELECT * FROM sensors WHERE id = ?";

const UPDATE_SNAPSHOT: &str = "UPDATE sensors SET value = ?, last_update_time = ? WHERE id = ?";

const UPDATE_LAST_UPDATE_TIME: &str = "UPDATE sensors SET last_update_time = ? WHERE id = ?";

/// `SQLite`-backed sensor repository.
#[derive(Clone)]
pub struct SqliteSensorRepository {
    db: Arc<Database>,
}

impl SqliteSensorRepository {
    /// Create a new repository over the sharded database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a sensor on its shard.
    ///
    /// Provisioning is not part of the ingestion pipeline; this is used to
    /// seed databases and tests.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the insert fails (e.g. duplicate id).
    pub async fn insert(&self, sensor: &Sensor) -> Result<(), SensorHubError> {
        let pool = self.db.pool(sensor.shard()).await?;
        sqlx::query(INSERT)
            .bind(sensor.id.get())
            .bind(&sensor.name)
            .bind(sensor.sensor_type.as_str())
            .bind(sensor.update_rule.to_string())
            .bind(sensor.value.as_deref())
            .bind(sensor.last_update_time.map(encode_timestamp))
            .execute(&pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }
}

fn not_found(id: SensorId) -> SensorHubError {
    NotFoundError {
        entity: "Sensor",
        id: id.to_string(),
    }
    .into()
}

impl SensorRepository for SqliteSensorRepository {
    async fn get_by_id(&self, shard: ShardId, id: SensorId) -> Result<Option<Sensor>, SensorHubError> {
        let pool = self.db.pool(shard).await?;
        let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
            .bind(id.get())
            .fetch_optional(&pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn update_snapshot(
        &self,
        shard: ShardId,
        id: SensorId,
        value: &str,
        last_update_time: Timestamp,
    ) -> Result<(), SensorHubError> {
        let pool = self.db.pool(shard).await?;
        let result = sqlx::query(UPDATE_SNAPSHOT)
            .bind(value)
            .bind(encode_timestamp(last_update_time))
            .bind(id.get())
            .execute(&pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn touch(
        &self,
        shard: ShardId,
        id: SensorId,
        last_update_time: Timestamp,
    ) -> Result<(), SensorHubError> {
        let pool = self.db.pool(shard).await?;
        let result = sqlx::query(UPDATE_LAST_UPDATE_TIME)
            .bind(encode_timestamp(last_update_time))
            .bind(id.get())
            .execute(&pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use chrono::{TimeZone, Utc};

    async fn setup() -> SqliteSensorRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteSensorRepository::new(Arc::new(db))
    }

    fn test_sensor(id: i64) -> Sensor {
        Sensor::builder()
            .id(SensorId::new(id))
            .name("Boiler temperature")
            .sensor_type(SensorType::Number)
            .build()
    }

    #[tokio::test]
    async fn should_insert_and_get_sensor_from_its_shard() {
        let repo = setup().await;
        let sensor = test_sensor(30_042);
        repo.insert(&sensor).await.unwrap();

        let found = repo.get_by_id(sensor.shard(), sensor.id).await.unwrap();

        assert_eq!(found, Some(sensor));
    }

    #[tokio::test]
    async fn should_not_find_sensor_on_another_shard() {
        let repo = setup().await;
        let sensor = test_sensor(30_042);
        repo.insert(&sensor).await.unwrap();

        let found = repo
            .get_by_id(ShardId::of(SensorId::new(0)), sensor.id)
            .await
            .unwrap();

        assert!(found.is_none());
    }

    #[tokio::test]
    async fn should_write_only_snapshot_columns() {
        let repo = setup().await;
        let sensor = Sensor::builder()
            .id(SensorId::new(7))
            .name("Gate")
            .sensor_type(SensorType::Onoff)
            .update_rule(UpdateRule::Control)
            .build();
        repo.insert(&sensor).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 1, 31, 8, 15, 0).unwrap();

        repo.update_snapshot(sensor.shard(), sensor.id, r#"{"value":"1"}"#, at)
            .await
            .unwrap();

        let stored = repo
            .get_by_id(sensor.shard(), sensor.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.value.as_deref(), Some(r#"{"value":"1"}"#));
        assert_eq!(stored.last_update_time, Some(at));
        assert_eq!(stored.name, "Gate");
        assert_eq!(stored.update_rule, UpdateRule::Control);
        assert_eq!(stored.sensor_type, SensorType::Onoff);
    }

    #[tokio::test]
    async fn should_touch_without_changing_value() {
        let repo = setup().await;
        let mut sensor = test_sensor(8);
        sensor.value = Some(r#"{"value":1}"#.to_string());
        repo.insert(&sensor).await.unwrap();
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();

        repo.touch(sensor.shard(), sensor.id, at).await.unwrap();

        let stored = repo
            .get_by_id(sensor.shard(), sensor.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.value, sensor.value);
        assert_eq!(stored.last_update_time, Some(at));
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_sensor() {
        let repo = setup().await;
        let id = SensorId::new(9);

        let result = repo
            .update_snapshot(ShardId::of(id), id, "{}", Utc::now())
            .await;

        assert!(matches!(result, Err(SensorHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_read_unknown_type_names_as_unknown() {
        let repo = setup().await;
        let pool = repo.db.pool(ShardId::of(SensorId::new(3))).await.unwrap();
        sqlx::query("INSERT INTO sensors (id, sensor_type) VALUES (3, 'video')")
            .execute(&pool)
            .await
            .unwrap();

        let found = repo
            .get_by_id(ShardId::of(SensorId::new(3)), SensorId::new(3))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.sensor_type, SensorType::Unknown);
    }
}
