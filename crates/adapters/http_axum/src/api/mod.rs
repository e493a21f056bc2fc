//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod history;
#[allow(clippy::missing_errors_doc)]
pub mod sensors;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post};

use sensorhub_app::ports::{
    BinaryStore, HistoryRepository, Publisher, SensorRepository, TriggerRepository,
};
use sensorhub_domain::id::SensorId;

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<SR, HR, TR, P, BS>() -> Router<AppState<SR, HR, TR, P, BS>>
where
    SR: SensorRepository + Send + Sync + 'static,
    HR: HistoryRepository + Send + Sync + 'static,
    TR: TriggerRepository + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    BS: BinaryStore + Send + Sync + 'static,
{
    Router::new()
        .route("/sensors/{id}", get(sensors::get::<SR, HR, TR, P, BS>))
        .route(
            "/sensors/{id}/upload",
            post(sensors::upload::<SR, HR, TR, P, BS>),
        )
        .route(
            "/sensors/{id}/image",
            post(sensors::image::<SR, HR, TR, P, BS>),
        )
        .route(
            "/sensors/{id}/history",
            get(history::list::<SR, HR, TR, P, BS>),
        )
}

/// Parse a sensor id taken from the request path.
pub(crate) fn parse_sensor_id(value: &str) -> Result<SensorId, ApiError> {
    SensorId::from_str(value).map_err(|_| ApiError::InvalidParameter {
        name: "sensor id",
        value: value.to_owned(),
    })
}
