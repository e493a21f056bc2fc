//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use sensorhub_app::ports::{
    BinaryStore, HistoryRepository, Publisher, SensorRepository, TriggerRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and includes a [`TraceLayer`] that logs
/// each HTTP request/response at the `DEBUG` level using the `tracing`
/// ecosystem.
pub fn build<SR, HR, TR, P, BS>(state: AppState<SR, HR, TR, P, BS>) -> Router
where
    SR: SensorRepository + Send + Sync + 'static,
    HR: HistoryRepository + Send + Sync + 'static,
    TR: TriggerRepository + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    BS: BinaryStore + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use sensorhub_app::services::image_service::ImageService;
    use sensorhub_app::services::ingestion_service::IngestionService;
    use sensorhub_app::services::sensor_service::SensorService;
    use sensorhub_domain::error::SensorHubError;
    use sensorhub_domain::history::HistoryRecord;
    use sensorhub_domain::id::SensorId;
    use sensorhub_domain::sensor::{Sensor, SensorType};
    use sensorhub_domain::shard::ShardId;
    use sensorhub_domain::time::Timestamp;
    use sensorhub_domain::trigger::Trigger;
    use std::path::Path;
    use tower::ServiceExt;

    /// Knows a single number sensor with id 1.
    struct StubSensorRepo;
    struct StubHistoryRepo;
    struct StubTriggerRepo;
    struct StubPublisher;
    struct StubBinaryStore;

    impl SensorRepository for StubSensorRepo {
        async fn get_by_id(
            &self,
            _shard: ShardId,
            id: SensorId,
        ) -> Result<Option<Sensor>, SensorHubError> {
            Ok((id.get() == 1).then(|| {
                Sensor::builder()
                    .id(id)
                    .name("stub")
                    .sensor_type(SensorType::Number)
                    .build()
            }))
        }
        async fn update_snapshot(
            &self,
            _shard: ShardId,
            _id: SensorId,
            _value: &str,
            _last_update_time: Timestamp,
        ) -> Result<(), SensorHubError> {
            Ok(())
        }
        async fn touch(
            &self,
            _shard: ShardId,
            _id: SensorId,
            _last_update_time: Timestamp,
        ) -> Result<(), SensorHubError> {
            Ok(())
        }
    }

    impl HistoryRepository for StubHistoryRepo {
        async fn append(
            &self,
            _shard: ShardId,
            record: HistoryRecord,
        ) -> Result<HistoryRecord, SensorHubError> {
            Ok(record)
        }
        async fn find_by_sensor_in_range(
            &self,
            _shard: ShardId,
            _sensor_id: SensorId,
            _sensor_type: SensorType,
            _from: Timestamp,
            _to: Timestamp,
            _limit: Option<usize>,
        ) -> Result<Vec<HistoryRecord>, SensorHubError> {
            Ok(vec![])
        }
    }

    impl TriggerRepository for StubTriggerRepo {
        async fn find_by_sensor(
            &self,
            _shard: ShardId,
            _sensor_id: SensorId,
        ) -> Result<Vec<Trigger>, SensorHubError> {
            Ok(vec![])
        }
    }

    impl Publisher for StubPublisher {
        async fn publish(&self, _topic: &str, _payload: &str) -> Result<(), SensorHubError> {
            Ok(())
        }
    }

    impl BinaryStore for StubBinaryStore {
        async fn init(&self) -> Result<(), SensorHubError> {
            Ok(())
        }
        async fn copy(&self, _source: &Path, _relative: &Path) -> Result<(), SensorHubError> {
            Ok(())
        }
    }

    fn test_app() -> Router {
        build(AppState::new(
            IngestionService::new(StubSensorRepo, StubHistoryRepo, StubTriggerRepo, StubPublisher),
            ImageService::new(StubSensorRepo, StubHistoryRepo, StubBinaryStore),
            SensorService::new(StubSensorRepo, StubHistoryRepo),
        ))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_sensor() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/sensors/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_400_for_non_numeric_sensor_id() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/sensors/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_report_reason_for_single_reading() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sensors/1/upload")
                    .body(Body::from(r#"{"value":"warm"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, r#"{"err":"bad value"}"#);
    }

    #[tokio::test]
    async fn should_report_null_err_for_accepted_reading() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sensors/1/upload")
                    .body(Body::from(r#"{"value":21.5}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(body_string(response).await, r#"{"err":null}"#);
    }

    #[tokio::test]
    async fn should_return_no_content_for_batch() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/sensors/1/upload")
                    .body(Body::from(r#"[{"value":1},{"value":"bad"}]"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn should_reject_history_with_bad_from() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/sensors/1/history?from=yesterday")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
