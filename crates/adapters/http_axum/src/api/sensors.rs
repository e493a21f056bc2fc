//! Sensor handlers: lookup, reading upload, and image upload.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use sensorhub_app::ports::{
    BinaryStore, HistoryRepository, Publisher, SensorRepository, TriggerRepository,
};
use sensorhub_app::services::ingestion_service::{UploadOutcome, UploadResult};
use sensorhub_domain::history::HistoryRecord;
use sensorhub_domain::sensor::Sensor;

use super::parse_sensor_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Image dimensions passed alongside the raw image body.
#[derive(Deserialize)]
pub struct ImageQuery {
    pub width: u32,
    pub height: u32,
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Sensor>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the upload endpoint.
pub enum UploadResponse {
    /// Single reading: `{"err": null}` or `{"err": "<reason>"}`.
    Ok(Json<UploadResult>),
    /// Batch: nothing is reported back.
    NoContent,
}

impl IntoResponse for UploadResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// Possible responses from the image endpoint.
pub enum ImageResponse {
    Created(Json<HistoryRecord>),
}

impl IntoResponse for ImageResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// `GET /api/sensors/{id}`
pub async fn get<SR, HR, TR, P, BS>(
    State(state): State<AppState<SR, HR, TR, P, BS>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    HR: HistoryRepository + Send + Sync + 'static,
    TR: TriggerRepository + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    BS: BinaryStore + Send + Sync + 'static,
{
    let id = parse_sensor_id(&id)?;
    let sensor = state.sensor_service.get_sensor(id).await?;
    Ok(GetResponse::Ok(Json(sensor)))
}

/// `POST /api/sensors/{id}/upload`
///
/// The body is passed to the pipeline untouched; decoding errors come back
/// in the `err` field like any other refused reading.
pub async fn upload<SR, HR, TR, P, BS>(
    State(state): State<AppState<SR, HR, TR, P, BS>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<UploadResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    HR: HistoryRepository + Send + Sync + 'static,
    TR: TriggerRepository + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    BS: BinaryStore + Send + Sync + 'static,
{
    let id = parse_sensor_id(&id)?;
    let sensor = state.sensor_service.get_sensor(id).await?;

    match state.ingestion_service.upload(&sensor, &body).await? {
        UploadOutcome::Single(result) => Ok(UploadResponse::Ok(Json(result))),
        UploadOutcome::Batch(results) => {
            let accepted = results.iter().filter(|result| result.is_ok()).count();
            tracing::debug!(
                sensor_id = %id,
                accepted,
                refused = results.len() - accepted,
                "batch upload processed"
            );
            Ok(UploadResponse::NoContent)
        }
    }
}

/// `POST /api/sensors/{id}/image?width=&height=`
///
/// The body is staged in a temporary file which the image service copies
/// into the photo store.
pub async fn image<SR, HR, TR, P, BS>(
    State(state): State<AppState<SR, HR, TR, P, BS>>,
    Path(id): Path<String>,
    Query(dimensions): Query<ImageQuery>,
    body: Bytes,
) -> Result<ImageResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    HR: HistoryRepository + Send + Sync + 'static,
    TR: TriggerRepository + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    BS: BinaryStore + Send + Sync + 'static,
{
    let id = parse_sensor_id(&id)?;
    let sensor = state.sensor_service.get_sensor(id).await?;

    let staged = std::env::temp_dir().join(format!("sensorhub-upload-{}", uuid::Uuid::new_v4()));
    tokio::fs::write(&staged, &body)
        .await
        .map_err(ApiError::Staging)?;

    let result = state
        .image_service
        .save_image(&sensor, &staged, dimensions.width, dimensions.height)
        .await;

    if let Err(err) = tokio::fs::remove_file(&staged).await {
        tracing::warn!(path = %staged.display(), error = %err, "unable to remove staged upload");
    }

    Ok(ImageResponse::Created(Json(result?)))
}
