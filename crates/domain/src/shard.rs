//! Shard routing — which storage partition owns a sensor's rows.
//!
//! The mapping is a pure function of the sensor id and [`PART_SIZE`].
//! Changing [`PART_SIZE`] moves sensors between partitions and requires a
//! data migration.

use serde::{Deserialize, Serialize};

use crate::id::SensorId;

/// Number of consecutive sensor ids stored in one partition.
pub const PART_SIZE: i64 = 10_000;

/// Opaque partition token handed to storage adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShardId(i64);

impl ShardId {
    /// Partition owning `sensor_id`.
    #[must_use]
    pub const fn of(sensor_id: SensorId) -> Self {
        Self(sensor_id.get() / PART_SIZE)
    }

    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for ShardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
