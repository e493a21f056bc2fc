//! Sensor — a typed source of readings.
//!
//! A sensor owns a declared [`SensorType`] that decides how its readings are
//! validated and stored, an [`UpdateRule`] that may suppress history, and a
//! denormalized snapshot of its most recent accepted reading.

mod sensor_type;
mod update_rule;

pub use sensor_type::SensorType;
pub use update_rule::UpdateRule;

use serde::{Deserialize, Serialize};

use crate::id::SensorId;
use crate::shard::ShardId;
use crate::time::Timestamp;

/// Prefix of the real-time topic every sensor publishes on.
pub const TOPIC_PREFIX: &str = "iot2/sensor";

/// A registered sensor as stored on its shard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: SensorId,
    pub name: String,
    pub sensor_type: SensorType,
    pub update_rule: UpdateRule,
    /// Serialized snapshot of the latest accepted reading.
    pub value: Option<String>,
    pub last_update_time: Option<Timestamp>,
}

impl Sensor {
    /// Create a builder for constructing a [`Sensor`].
    #[must_use]
    pub fn builder() -> SensorBuilder {
        SensorBuilder::default()
    }

    /// Shard owning this sensor's rows.
    #[must_use]
    pub fn shard(&self) -> ShardId {
        ShardId::of(self.id)
    }

    /// Real-time topic carrying this sensor's snapshot.
    #[must_use]
    pub fn topic(&self) -> String {
        format!("{TOPIC_PREFIX}/{}", self.id)
    }

    /// Whether accepted readings are appended to the history log.
    #[must_use]
    pub fn records_history(&self) -> bool {
        !matches!(self.update_rule, UpdateRule::Control)
    }
}

/// Step-by-step builder for [`Sensor`].
#[derive(Debug, Default)]
pub struct SensorBuilder {
    id: Option<SensorId>,
    name: Option<String>,
    sensor_type: Option<SensorType>,
    update_rule: Option<UpdateRule>,
    value: Option<String>,
    last_update_time: Option<Timestamp>,
}

impl SensorBuilder {
    #[must_use]
    pub fn id(mut self, id: SensorId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sensor_type(mut self, sensor_type: SensorType) -> Self {
        self.sensor_type = Some(sensor_type);
        self
    }

    #[must_use]
    pub fn update_rule(mut self, update_rule: UpdateRule) -> Self {
        self.update_rule = Some(update_rule);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    #[must_use]
    pub fn last_update_time(mut self, at: Timestamp) -> Self {
        self.last_update_time = Some(at);
        self
    }

    /// Consume the builder and return a [`Sensor`].
    #[must_use]
    pub fn build(self) -> Sensor {
        Sensor {
            id: self.id.unwrap_or(SensorId::new(0)),
            name: self.name.unwrap_or_default(),
            sensor_type: self.sensor_type.unwrap_or_default(),
            update_rule: self.update_rule.unwrap_or_default(),
            value: self.value,
            last_update_time: self.last_update_time,
        }
    }
}
