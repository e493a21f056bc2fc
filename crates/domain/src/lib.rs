//! # sensorhub-domain
//!
//! Pure domain model for the sensorhub ingestion pipeline.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Sensors** (typed sources of readings with a latest-value snapshot)
//! - Decode raw upload bodies into **Readings** and validate their values
//!   against the sensor's declared type
//! - Define **History records** (immutable, type-tagged log entries)
//! - Define **Snapshots** (the serialized latest reading stored on the sensor)
//! - Define **Triggers** (per-sensor rules evaluated on every accepted reading)
//! - Route every sensor to its storage **shard**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod history;
pub mod reading;
pub mod sensor;
pub mod shard;
pub mod snapshot;
pub mod trigger;
pub mod value;
