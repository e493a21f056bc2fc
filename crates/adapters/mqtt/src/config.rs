//! MQTT publisher configuration.

use serde::Deserialize;

/// Configuration for the MQTT publisher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Publish through the broker. When off, messages stay in-process.
    pub enabled: bool,
    /// MQTT broker hostname or IP address.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier.
    pub client_id: String,
    /// Keep-alive interval in seconds.
    pub keep_alive_secs: u16,
    /// Outgoing requests buffered while the broker is unreachable.
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            broker_host: "localhost".to_string(),
            broker_port: 1883,
            client_id: "sensorhub".to_string(),
            keep_alive_secs: 30,
            channel_capacity: 64,
        }
    }
}
