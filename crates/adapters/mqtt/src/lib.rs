//! # sensorhub-adapter-mqtt
//!
//! MQTT adapter — carries sensor snapshots and trigger messages to a broker.
//!
//! ## Responsibilities
//! - Implement the `Publisher` port over a rumqttc [`AsyncClient`]
//! - Drive the client's event loop (connection, reconnection, acks) in a
//!   background task
//!
//! Publishing only enqueues the message for the event loop; delivery to the
//! broker happens in the background and is never awaited by the pipeline.
//!
//! ## Dependency rule
//! Same as other adapters: depends on `sensorhub-app` and `sensorhub-domain`.

pub mod config;
pub mod error;

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use tokio::task::JoinHandle;

use sensorhub_app::ports::Publisher;
use sensorhub_domain::error::SensorHubError;

use crate::config::MqttConfig;
use crate::error::MqttError;

/// Shortest keep-alive the client accepts.
const MIN_KEEP_ALIVE_SECS: u16 = 5;

/// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// [`Publisher`] backed by an MQTT broker.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    /// Build the client and its event loop without starting anything.
    #[must_use]
    pub fn new(config: &MqttConfig) -> (Self, EventLoop) {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(
            config.keep_alive_secs.max(MIN_KEEP_ALIVE_SECS),
        )));
        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity.max(1));
        (Self { client }, eventloop)
    }

    /// Build the client and drive its event loop on the current runtime.
    #[must_use]
    pub fn spawn(config: &MqttConfig) -> (Self, JoinHandle<()>) {
        let (publisher, eventloop) = Self::new(config);
        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "starting MQTT publisher"
        );
        (publisher, tokio::spawn(drive(eventloop)))
    }

    /// Ask the broker connection to close.
    ///
    /// # Errors
    ///
    /// Returns [`MqttError::Client`] if the event loop is already gone.
    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client.disconnect().await.map_err(MqttError::Client)
    }
}

/// Poll the event loop until the client disconnects.
pub async fn drive(mut eventloop: EventLoop) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
            }
            Ok(Event::Outgoing(rumqttc::Outgoing::Disconnect)) => {
                tracing::info!("disconnected from MQTT broker");
                return;
            }
            Ok(event) => tracing::trace!(?event, "mqtt event"),
            Err(err) => {
                tracing::warn!(error = %err, "MQTT connection error, retrying");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), SensorHubError> {
        // Never wait for room in the request queue: while the broker is
        // unreachable the event loop does not drain it.
        self.client
            .try_publish(topic, QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(MqttError::Client)?;
        tracing::debug!(%topic, bytes = payload.len(), "queued MQTT publish");
        Ok(())
    }
}
