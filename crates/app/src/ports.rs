//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.
//!
//! Every storage call carries the [`ShardId`](sensorhub_domain::shard::ShardId)
//! of the sensor it concerns; adapters use it to pick the partition.

pub mod binary_store;
pub mod publisher;
pub mod storage;

pub use binary_store::BinaryStore;
pub use publisher::Publisher;
pub use storage::{HistoryRepository, SensorRepository, TriggerRepository};
