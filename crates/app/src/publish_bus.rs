//! In-process publish bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use sensorhub_domain::error::SensorHubError;

use crate::ports::Publisher;

/// A message delivered on the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

/// In-process publisher using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the message is simply dropped).
pub struct InProcessBus {
    sender: broadcast::Sender<Message>,
}

impl InProcessBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to every topic.
    ///
    /// Returns a receiver that will get all messages published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Message> {
        self.sender.subscribe()
    }
}

impl Publisher for InProcessBus {
    fn publish(
        &self,
        topic: &str,
        payload: &str,
    ) -> impl Future<Output = Result<(), SensorHubError>> + Send {
        // broadcast::send fails only when there are zero receivers.
        let _ = self.sender.send(Message {
            topic: topic.to_string(),
            payload: payload.to_string(),
        });
        async { Ok(()) }
    }
}
