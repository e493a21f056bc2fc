//! Shard-aware `SQLite` pool setup and migration runner.
//!
//! Each shard is its own database. The configured URL may contain the
//! [`SHARD_PLACEHOLDER`], which is replaced by the shard number; without it
//! every file-backed shard shares one database file. Pools are opened on
//! first use and migrated before being handed out. Opening one shard never
//! holds up requests for another: the shard map lock only guards the
//! lookup, the connection happens in the shard's own cell.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;
use tokio::sync::{OnceCell, RwLock};

use sensorhub_domain::id::SensorId;
use sensorhub_domain::shard::ShardId;

use crate::error::StorageError;

/// Token replaced by the shard number in the database URL.
pub const SHARD_PLACEHOLDER: &str = "{shard}";

/// Configuration for the `SQLite` storage adapter.
pub struct Config {
    /// `SQLite` connection URL (e.g. `sqlite:data/shard-{shard}.db` or `sqlite::memory:`).
    pub database_url: String,
}

impl Config {
    /// Build a [`Database`] from this configuration.
    ///
    /// Opens and migrates shard 0 so a bad URL is reported at startup.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    pub async fn build(self) -> Result<Database, StorageError> {
        let db = Database {
            database_url: self.database_url,
            pools: RwLock::new(HashMap::new()),
        };
        db.pool(ShardId::of(SensorId::new(0))).await?;
        Ok(db)
    }
}

/// Holds one connection pool per shard.
pub struct Database {
    database_url: String,
    pools: RwLock<HashMap<ShardId, Arc<OnceCell<SqlitePool>>>>,
}

impl Database {
    /// Connection URL of `shard`.
    #[must_use]
    pub fn shard_url(&self, shard: ShardId) -> String {
        self.database_url
            .replace(SHARD_PLACEHOLDER, &shard.to_string())
    }

    /// Pool of `shard`, opening and migrating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the connection or migrations fail.
    pub async fn pool(&self, shard: ShardId) -> Result<SqlitePool, StorageError> {
        let cell = self.cell(shard).await;
        let pool = cell.get_or_try_init(|| self.open(shard)).await?;
        Ok(pool.clone())
    }

    async fn cell(&self, shard: ShardId) -> Arc<OnceCell<SqlitePool>> {
        if let Some(cell) = self.pools.read().await.get(&shard) {
            return Arc::clone(cell);
        }
        Arc::clone(self.pools.write().await.entry(shard).or_default())
    }

    async fn open(&self, shard: ShardId) -> Result<SqlitePool, StorageError> {
        let options = SqliteConnectOptions::from_str(&self.shard_url(shard))?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!(%shard, "shard database ready");
        Ok(pool)
    }
}
