//! # sensorhubd — sensorhub daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Open the sharded `SQLite` database and run migrations on shard 0
//! - Construct repository implementations (adapters)
//! - Pick the publisher: MQTT broker when enabled, in-process bus otherwise
//! - Construct application services, injecting repositories via port traits
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve until SIGTERM/SIGINT
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use sensorhub_adapter_http_axum::state::AppState;
use sensorhub_adapter_mqtt::MqttPublisher;
use sensorhub_adapter_mqtt::config::MqttConfig;
use sensorhub_adapter_storage_sqlite_sqlx::history_repo::SqliteHistoryRepository;
use sensorhub_adapter_storage_sqlite_sqlx::photo_store::LocalPhotoStore;
use sensorhub_adapter_storage_sqlite_sqlx::pool::Config as StorageConfig;
use sensorhub_adapter_storage_sqlite_sqlx::sensor_repo::SqliteSensorRepository;
use sensorhub_adapter_storage_sqlite_sqlx::trigger_repo::SqliteTriggerRepository;
use sensorhub_app::ports::Publisher;
use sensorhub_app::publish_bus::InProcessBus;
use sensorhub_app::services::image_service::ImageService;
use sensorhub_app::services::ingestion_service::IngestionService;
use sensorhub_app::services::sensor_service::SensorService;
use sensorhub_domain::error::SensorHubError;

use crate::config::{Config, LoggingConfig};

/// Capacity of the in-process bus used when MQTT is disabled.
const BUS_CAPACITY: usize = 256;

/// How long to wait for the MQTT event loop to flush on shutdown.
const MQTT_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    // Database
    let db = StorageConfig {
        database_url: config.database.url.clone(),
    }
    .build()
    .await
    .context("failed to open database")?;
    let db = Arc::new(db);

    // Repositories
    let sensor_repo = SqliteSensorRepository::new(Arc::clone(&db));
    let history_repo = SqliteHistoryRepository::new(Arc::clone(&db));
    let trigger_repo = SqliteTriggerRepository::new(db);
    let photo_store = LocalPhotoStore::new(&config.storage.photo_root);

    // Publisher
    let (publisher, mqtt_task) = build_publisher(&config.mqtt);

    // Services
    let ingestion_service = IngestionService::new(
        sensor_repo.clone(),
        history_repo.clone(),
        trigger_repo,
        publisher.clone(),
    );
    let image_service = ImageService::new(sensor_repo.clone(), history_repo.clone(), photo_store);
    image_service
        .init()
        .await
        .context("failed to prepare photo store")?;
    let sensor_service = SensorService::new(sensor_repo, history_repo);

    // HTTP
    let state = AppState::new(ingestion_service, image_service, sensor_service);
    let app = sensorhub_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    tracing::info!(%bind_addr, database_url = %config.database.url, "sensorhubd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    publisher.close().await;
    if let Some(task) = mqtt_task {
        if tokio::time::timeout(MQTT_DRAIN_TIMEOUT, task).await.is_err() {
            tracing::warn!("MQTT event loop did not stop in time");
        }
    }

    tracing::info!("sensorhubd stopped");
    Ok(())
}

/// Publisher selected at startup.
#[derive(Clone)]
enum AppPublisher {
    Mqtt(MqttPublisher),
    InProcess(Arc<InProcessBus>),
}

impl AppPublisher {
    async fn close(&self) {
        if let Self::Mqtt(mqtt) = self {
            if let Err(err) = mqtt.disconnect().await {
                tracing::warn!(error = %err, "failed to disconnect from MQTT broker");
            }
        }
    }
}

impl Publisher for AppPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), SensorHubError> {
        match self {
            Self::Mqtt(mqtt) => mqtt.publish(topic, payload).await,
            Self::InProcess(bus) => bus.publish(topic, payload).await,
        }
    }
}

fn build_publisher(config: &MqttConfig) -> (AppPublisher, Option<JoinHandle<()>>) {
    if config.enabled {
        let (mqtt, task) = MqttPublisher::spawn(config);
        return (AppPublisher::Mqtt(mqtt), Some(task));
    }

    tracing::info!("MQTT disabled, publishing in-process");
    let bus = Arc::new(InProcessBus::new(BUS_CAPACITY));
    spawn_bus_logger(&bus);
    (AppPublisher::InProcess(bus), None)
}

/// Log every in-process message at `DEBUG`.
fn spawn_bus_logger(bus: &InProcessBus) {
    let mut receiver = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(message) => {
                    tracing::debug!(topic = %message.topic, payload = %message.payload, "published");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "publish logger lagging behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.filter).unwrap_or_else(|err| {
        eprintln!("invalid log filter {:?}: {err}, falling back to info", logging.filter);
        EnvFilter::new("info")
    });

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(filter)
        .compact()
        .init();
}

/// Resolve on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
