//! MQTT adapter error types.

use sensorhub_domain::error::SensorHubError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the request (queue full or event loop gone).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::ClientError),
}

impl From<MqttError> for SensorHubError {
    fn from(err: MqttError) -> Self {
        Self::Publish(Box::new(err))
    }
}
