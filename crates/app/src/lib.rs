//! # sensorhub-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SensorRepository` — sensor lookup and snapshot writes
//!   - `HistoryRepository` — append & query history records
//!   - `TriggerRepository` — trigger rules per sensor
//!   - `Publisher` — real-time topic publishing
//!   - `BinaryStore` — image file storage
//! - Define **driving/inbound ports** as use-case structs:
//!   - `IngestionService` — the upload pipeline (decode → validate → persist
//!     → triggers → publish)
//!   - `ImageService` — image readings
//!   - `SensorService` — sensor and history queries
//!   - `TriggerDispatcher` — evaluate a sensor's triggers and apply effects
//! - Provide **in-process infrastructure** (publish bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `sensorhub-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod ports;
pub mod publish_bus;
pub mod services;
pub mod trigger_dispatcher;

#[cfg(test)]
pub(crate) mod testing;
