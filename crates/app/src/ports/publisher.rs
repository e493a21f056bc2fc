//! Publisher port — real-time fan-out of sensor values.

use std::future::Future;

use sensorhub_domain::error::SensorHubError;

/// Publishes a text payload on a topic of the pub/sub broker.
pub trait Publisher {
    /// Publish `payload` on `topic`.
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send;
}

impl<T: Publisher + Send + Sync> Publisher for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        (**self).publish(topic, payload)
    }
}
