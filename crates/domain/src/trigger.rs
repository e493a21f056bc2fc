//! Trigger — a per-sensor rule evaluated on every accepted reading.
//!
//! A trigger has a [`TriggerCondition`] checked against the coerced value
//! and a [`TriggerAction`] turned into [`TriggerEffect`]s when it fires.
//! Evaluation is pure; the application layer carries out the effects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::id::{SensorId, TriggerId};
use crate::reading::Reading;
use crate::sensor::Sensor;
use crate::value::SensorValue;

/// A rule bound to one sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trigger {
    pub id: TriggerId,
    pub sensor_id: SensorId,
    pub name: String,
    pub enabled: bool,
    pub condition: TriggerCondition,
    pub action: TriggerAction,
}

/// Predicate over the coerced reading value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerCondition {
    /// Fires on every reading.
    Always,
    /// Numeric value strictly greater than `threshold`.
    Above { threshold: f64 },
    /// Numeric value strictly lower than `threshold`.
    Below { threshold: f64 },
    /// Coerced value equal to `value` (JSON equality).
    Equals { value: Value },
    /// A raw reading field equal to `value`, e.g. `{"field": "source", "value": "manual"}`.
    FieldEquals { field: String, value: Value },
}

/// What a fired trigger does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerAction {
    /// Publish to `topic`; without `payload` the sensor's stored snapshot is sent.
    Publish {
        topic: String,
        payload: Option<String>,
    },
}

/// Side effect requested by a fired trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerEffect {
    Publish { topic: String, payload: String },
}

/// Result of evaluating one trigger.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TriggerOutcome {
    pub fired: bool,
    pub effects: Vec<TriggerEffect>,
}

impl TriggerCondition {
    #[must_use]
    pub fn matches(&self, reading: &Reading, value: &SensorValue) -> bool {
        match self {
            Self::Always => true,
            Self::Above { threshold } => value.as_f64().is_some_and(|v| v > *threshold),
            Self::Below { threshold } => value.as_f64().is_some_and(|v| v < *threshold),
            Self::Equals { value: expected } => json_eq(&value.to_json(), expected),
            Self::FieldEquals {
                field,
                value: expected,
            } => reading
                .fields()
                .get(field)
                .is_some_and(|actual| json_eq(actual, expected)),
        }
    }
}

/// Numbers compare by value so `1` equals `1.0`.
fn json_eq(actual: &Value, expected: &Value) -> bool {
    match (actual.as_f64(), expected.as_f64()) {
        (Some(a), Some(b)) => (a - b).abs() < f64::EPSILON,
        _ => actual == expected,
    }
}

impl Trigger {
    /// Create a builder for constructing a [`Trigger`].
    #[must_use]
    pub fn builder() -> TriggerBuilder {
        TriggerBuilder::default()
    }

    /// Evaluate against a reading that has already been stored.
    ///
    /// `sensor` must reflect the post-update state: its `value` is the
    /// default payload of publish actions.
    #[must_use]
    pub fn evaluate(&self, sensor: &Sensor, reading: &Reading, value: &SensorValue) -> TriggerOutcome {
        if !self.enabled || !self.condition.matches(reading, value) {
            return TriggerOutcome::default();
        }
        let effect = match &self.action {
            TriggerAction::Publish { topic, payload } => TriggerEffect::Publish {
                topic: topic.clone(),
                payload: payload
                    .clone()
                    .or_else(|| sensor.value.clone())
                    .unwrap_or_default(),
            },
        };
        TriggerOutcome {
            fired: true,
            effects: vec![effect],
        }
    }
}

impl std::fmt::Display for TriggerCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::Above { threshold } => write!(f, "above({threshold})"),
            Self::Below { threshold } => write!(f, "below({threshold})"),
            Self::Equals { value } => write!(f, "equals({value})"),
            Self::FieldEquals { field, value } => write!(f, "field_equals({field}, {value})"),
        }
    }
}

/// Step-by-step builder for [`Trigger`].
#[derive(Debug, Default)]
pub struct TriggerBuilder {
    id: Option<TriggerId>,
    sensor_id: Option<SensorId>,
    name: Option<String>,
    enabled: Option<bool>,
    condition: Option<TriggerCondition>,
    action: Option<TriggerAction>,
}

impl TriggerBuilder {
    #[must_use]
    pub fn id(mut self, id: TriggerId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn sensor_id(mut self, sensor_id: SensorId) -> Self {
        self.sensor_id = Some(sensor_id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: TriggerCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: TriggerAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Consume the builder and return a [`Trigger`].
    ///
    /// Defaults: enabled, [`TriggerCondition::Always`], and a publish to
    /// `alerts/<sensor_id>`.
    #[must_use]
    pub fn build(self) -> Trigger {
        let sensor_id = self.sensor_id.unwrap_or(SensorId::new(0));
        Trigger {
            id: self.id.unwrap_or_default(),
            sensor_id,
            name: self.name.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            condition: self.condition.unwrap_or(TriggerCondition::Always),
            action: self.action.unwrap_or_else(|| TriggerAction::Publish {
                topic: format!("alerts/{sensor_id}"),
                payload: None,
            }),
        }
    }
}
