//! # sensorhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **upload entry point** (`POST /api/sensors/{id}/upload`) that
//!   feeds raw bodies into the ingestion pipeline
//! - Accept **image uploads** and serve **sensor / history reads**
//! - Map application results into HTTP responses (JSON or empty bodies)
//!
//! ## Dependency rule
//! Depends on `sensorhub-app` (for port traits and services) and `sensorhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
