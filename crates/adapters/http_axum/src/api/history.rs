//! JSON REST handler for sensor history.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use chrono::Duration;
use serde::Deserialize;

use sensorhub_app::ports::{
    BinaryStore, HistoryRepository, Publisher, SensorRepository, TriggerRepository,
};
use sensorhub_domain::history::HistoryRecord;
use sensorhub_domain::time::{Timestamp, now};

use super::parse_sensor_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Default limit for history records.
const DEFAULT_LIMIT: usize = 1000;

/// Default time range: last 24 hours.
const DEFAULT_HOURS: i64 = 24;

/// Query parameters for the history endpoint.
#[derive(Deserialize)]
pub struct HistoryQuery {
    /// Start of time range (RFC 3339). Defaults to 24 hours ago.
    pub from: Option<String>,
    /// End of time range (RFC 3339). Defaults to now.
    pub to: Option<String>,
    /// Maximum number of records. Defaults to 1000.
    pub limit: Option<usize>,
}

/// Possible responses from the history list endpoint.
pub enum ListResponse {
    /// 200 OK with a JSON array of history records.
    Ok(Json<Vec<HistoryRecord>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

fn parse_timestamp(name: &'static str, value: &str) -> Result<Timestamp, ApiError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.to_utc())
        .map_err(|_| ApiError::InvalidParameter {
            name,
            value: value.to_owned(),
        })
}

/// `GET /api/sensors/{id}/history?from=&to=&limit=`
pub async fn list<SR, HR, TR, P, BS>(
    State(state): State<AppState<SR, HR, TR, P, BS>>,
    Path(id): Path<String>,
    Query(params): Query<HistoryQuery>,
) -> Result<ListResponse, ApiError>
where
    SR: SensorRepository + Send + Sync + 'static,
    HR: HistoryRepository + Send + Sync + 'static,
    TR: TriggerRepository + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    BS: BinaryStore + Send + Sync + 'static,
{
    let id = parse_sensor_id(&id)?;
    let to = match params.to.as_deref() {
        Some(value) => parse_timestamp("to", value)?,
        None => now(),
    };
    let from = match params.from.as_deref() {
        Some(value) => parse_timestamp("from", value)?,
        None => to - Duration::hours(DEFAULT_HOURS),
    };
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);

    let records = state
        .sensor_service
        .history(id, from, to, Some(limit))
        .await?;
    Ok(ListResponse::Ok(Json(records)))
}
