//! # sensorhub-adapter-storage-sqlite-sqlx
//!
//! Sharded `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `sensorhub-app::ports::storage`
//! - Open one connection pool per shard, lazily, and migrate it on first use
//! - Map between domain types and database rows (one history table per sensor type)
//! - Implement the `BinaryStore` port on the local filesystem (photo store)
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits) and `sensorhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod codec;
pub mod error;
pub mod history_repo;
pub mod photo_store;
pub mod pool;
pub mod sensor_repo;
pub mod trigger_repo;
