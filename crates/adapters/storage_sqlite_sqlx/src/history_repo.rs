//! `SQLite` implementation of [`HistoryRepository`].
//!
//! Each sensor type has its own table; the record's payload variant picks
//! the table on insert and the sensor type picks it on read.

use std::sync::Arc;

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use sensorhub_app::ports::HistoryRepository;
use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::history::{HistoryData, HistoryRecord};
use sensorhub_domain::id::{HistoryId, SensorId};
use sensorhub_domain::sensor::SensorType;
use sensorhub_domain::shard::ShardId;
use sensorhub_domain::time::Timestamp;

use crate::codec::{decode_timestamp, encode_timestamp};
use crate::error::StorageError;
use crate::pool::Database;

const INSERT_NUMBER: &str =
    "INSERT INTO number_history (id, sensor_id, recorded_at, value) VALUES (?, ?, ?, ?)";
const INSERT_LOCATION: &str = "INSERT INTO location_history (id, sensor_id, recorded_at, lan, lat, speed) VALUES (?, ?, ?, ?, ?, ?)";
const INSERT_KV: &str =
    "INSERT INTO kv_history (id, sensor_id, recorded_at, key, value) VALUES (?, ?, ?, ?, ?)";
const INSERT_ONOFF: &str =
    "INSERT INTO onoff_history (id, sensor_id, recorded_at, value) VALUES (?, ?, ?, ?)";
const INSERT_IMAGE: &str = "INSERT INTO image_history (id, sensor_id, recorded_at, width, height) VALUES (?, ?, ?, ?, ?)";

/// Table holding the history of `sensor_type`, if it keeps one.
fn table_of(sensor_type: SensorType) -> Option<&'static str> {
    match sensor_type {
        SensorType::Number => Some("number_history"),
        SensorType::Location => Some("location_history"),
        SensorType::Kv => Some("kv_history"),
        SensorType::Onoff => Some("onoff_history"),
        SensorType::Image => Some("image_history"),
        SensorType::Unknown => None,
    }
}

fn decode_data(sensor_type: SensorType, row: &SqliteRow) -> Result<HistoryData, sqlx::Error> {
    Ok(match sensor_type {
        SensorType::Number => HistoryData::Number {
            value: row.try_get("value")?,
        },
        SensorType::Location => HistoryData::Location {
            lan: row.try_get("lan")?,
            lat: row.try_get("lat")?,
            speed: row.try_get("speed")?,
        },
        SensorType::Kv => HistoryData::Kv {
            key: row.try_get("key")?,
            value: row.try_get("value")?,
        },
        SensorType::Onoff => HistoryData::Onoff {
            value: row.try_get("value")?,
        },
        SensorType::Image => HistoryData::Image {
            width: row.try_get("width")?,
            height: row.try_get("height")?,
        },
        SensorType::Unknown => {
            return Err(sqlx::Error::Decode(
                "no history table for unknown sensor type".into(),
            ));
        }
    })
}

fn decode_record(sensor_type: SensorType, row: &SqliteRow) -> Result<HistoryRecord, sqlx::Error> {
    let id: uuid::Uuid = row.try_get("id")?;
    let sensor_id: i64 = row.try_get("sensor_id")?;
    let recorded_at: String = row.try_get("recorded_at")?;

    Ok(HistoryRecord {
        id: HistoryId::from_uuid(id),
        sensor_id: SensorId::new(sensor_id),
        recorded_at: decode_timestamp(&recorded_at)?,
        data: decode_data(sensor_type, row)?,
    })
}

/// `SQLite`-backed history repository.
#[derive(Clone)]
pub struct SqliteHistoryRepository {
    db: Arc<Database>,
}

impl SqliteHistoryRepository {
    /// Create a new repository over the sharded database.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl HistoryRepository for SqliteHistoryRepository {
    async fn append(&self, shard: ShardId, record: HistoryRecord) -> Result<HistoryRecord, SensorHubError> {
        let pool = self.db.pool(shard).await?;
        let id = record.id.as_uuid();
        let sensor_id = record.sensor_id.get();
        let recorded_at = encode_timestamp(record.recorded_at);

        let query = match &record.data {
            HistoryData::Number { value } => sqlx::query(INSERT_NUMBER)
                .bind(id)
                .bind(sensor_id)
                .bind(recorded_at)
                .bind(*value),
            HistoryData::Location { lan, lat, speed } => sqlx::query(INSERT_LOCATION)
                .bind(id)
                .bind(sensor_id)
                .bind(recorded_at)
                .bind(*lan)
                .bind(*lat)
                .bind(*speed),
            HistoryData::Kv { key, value } => sqlx::query(INSERT_KV)
                .bind(id)
                .bind(sensor_id)
                .bind(recorded_at)
                .bind(key.as_str())
                .bind(value.as_str()),
            HistoryData::Onoff { value } => sqlx::query(INSERT_ONOFF)
                .bind(id)
                .bind(sensor_id)
                .bind(recorded_at)
                .bind(*value),
            HistoryData::Image { width, height } => sqlx::query(INSERT_IMAGE)
                .bind(id)
                .bind(sensor_id)
                .bind(recorded_at)
                .bind(*width)
                .bind(*height),
        };
        query.execute(&pool).await.map_err(StorageError::from)?;

        Ok(record)
    }

    async fn find_by_sensor_in_range(
        &self,
        shard: ShardId,
        sensor_id: SensorId,
        sensor_type: SensorType,
        from: Timestamp,
        to: Timestamp,
        limit: Option<usize>,
    ) -> Result<Vec<HistoryRecord>, SensorHubError> {
        let Some(table) = table_of(sensor_type) else {
            return Ok(Vec::new());
        };
        let pool = self.db.pool(shard).await?;
        // A negative LIMIT means no limit in SQLite.
        let limit = limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));
        let sql = format!(
            "SELECT * FROM {table} WHERE sensor_id = ? AND recorded_at >= ? AND recorded_at <= ? ORDER BY recorded_at ASC LIMIT ?"
        );

        let rows = sqlx::query(&sql)
            .bind(sensor_id.get())
            .bind(encode_timestamp(from))
            .bind(encode_timestamp(to))
            .bind(limit)
            .fetch_all(&pool)
            .await
            .map_err(StorageError::from)?;

        let records = rows
            .iter()
            .map(|row| decode_record(sensor_type, row))
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)?;
        Ok(records)
    }
}
