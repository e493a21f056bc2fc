//! Trigger dispatcher — evaluates a sensor's triggers after a reading lands.
//!
//! Triggers are loaded by sensor id from the sensor's shard and evaluated
//! in storage order. Each trigger is isolated: a failing effect is logged
//! and the remaining triggers still run.

use sensorhub_domain::error::SensorHubError;
use sensorhub_domain::id::TriggerId;
use sensorhub_domain::reading::Reading;
use sensorhub_domain::sensor::Sensor;
use sensorhub_domain::trigger::{Trigger, TriggerEffect};
use sensorhub_domain::value::SensorValue;

use crate::ports::{Publisher, TriggerRepository};

/// Runs the trigger rules bound to a sensor.
pub struct TriggerDispatcher<TR> {
    trigger_repo: TR,
}

impl<TR: TriggerRepository> TriggerDispatcher<TR> {
    /// Create a new dispatcher.
    pub fn new(trigger_repo: TR) -> Self {
        Self { trigger_repo }
    }

    /// Evaluate every trigger of `sensor` and apply the effects of those
    /// that fire. Returns the ids of the triggers whose effects all applied.
    ///
    /// `sensor` must already carry the stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the triggers cannot be loaded. Failures
    /// of individual triggers are logged, never returned.
    pub async fn dispatch<P: Publisher>(
        &self,
        publisher: &P,
        sensor: &Sensor,
        reading: &Reading,
        value: &SensorValue,
    ) -> Result<Vec<TriggerId>, SensorHubError> {
        let triggers = self
            .trigger_repo
            .find_by_sensor(sensor.shard(), sensor.id)
            .await?;
        let mut fired = Vec::new();

        for trigger in &triggers {
            let outcome = trigger.evaluate(sensor, reading, value);
            if !outcome.fired {
                continue;
            }
            match apply_effects(publisher, &outcome.effects).await {
                Ok(()) => {
                    tracing::debug!(sensor_id = %sensor.id, trigger_id = %trigger.id, condition = %trigger.condition, "trigger fired");
                    fired.push(trigger.id);
                }
                Err(err) => log_failure(trigger, &err),
            }
        }

        Ok(fired)
    }
}

async fn apply_effects<P: Publisher>(
    publisher: &P,
    effects: &[TriggerEffect],
) -> Result<(), SensorHubError> {
    for effect in effects {
        match effect {
            TriggerEffect::Publish { topic, payload } => publisher.publish(topic, payload).await?,
        }
    }
    Ok(())
}

fn log_failure(trigger: &Trigger, err: &SensorHubError) {
    tracing::warn!(
        sensor_id = %trigger.sensor_id,
        trigger_id = %trigger.id,
        error = %err,
        "trigger effect failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{InMemoryTriggerRepo, SpyPublisher};
    use sensorhub_domain::id::SensorId;
    use sensorhub_domain::trigger::{TriggerAction, TriggerCondition};
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn sensor() -> Sensor {
        Sensor::builder()
            .id(SensorId::new(7))
            .value(r#"{"value":31}"#)
            .build()
    }

    fn reading() -> Reading {
        Reading::try_from(json!({"value": 31})).unwrap()
    }

    fn publish_trigger(topic: &str, condition: TriggerCondition) -> Trigger {
        Trigger::builder()
            .sensor_id(SensorId::new(7))
            .name(topic)
            .condition(condition)
            .action(TriggerAction::Publish {
                topic: topic.to_string(),
                payload: None,
            })
            .build()
    }

    #[tokio::test]
    async fn should_fire_matching_trigger_with_stored_snapshot() {
        let trigger = publish_trigger("alerts/hot", TriggerCondition::Above { threshold: 30.0 });
        let dispatcher = TriggerDispatcher::new(InMemoryTriggerRepo::with(vec![trigger.clone()]));
        let publisher = SpyPublisher::default();

        let fired = dispatcher
            .dispatch(&publisher, &sensor(), &reading(), &SensorValue::Number { value: 31.0 })
            .await
            .unwrap();

        assert_eq!(fired, vec![trigger.id]);
        assert_eq!(
            publisher.sent(),
            vec![("alerts/hot".to_string(), r#"{"value":31}"#.to_string())]
        );
    }

    #[tokio::test]
    async fn should_skip_non_matching_trigger() {
        let trigger = publish_trigger("alerts/cold", TriggerCondition::Below { threshold: 0.0 });
        let dispatcher = TriggerDispatcher::new(InMemoryTriggerRepo::with(vec![trigger]));
        let publisher = SpyPublisher::default();

        let fired = dispatcher
            .dispatch(&publisher, &sensor(), &reading(), &SensorValue::Number { value: 31.0 })
            .await
            .unwrap();

        assert!(fired.is_empty());
        assert!(publisher.sent().is_empty());
    }

    #[tokio::test]
    async fn should_ignore_triggers_of_other_sensors() {
        let mut trigger = publish_trigger("alerts/any", TriggerCondition::Always);
        trigger.sensor_id = SensorId::new(8);
        let dispatcher = TriggerDispatcher::new(InMemoryTriggerRepo::with(vec![trigger]));
        let publisher = SpyPublisher::default();

        let fired = dispatcher
            .dispatch(&publisher, &sensor(), &reading(), &SensorValue::Number { value: 31.0 })
            .await
            .unwrap();

        assert!(fired.is_empty());
    }

    #[tokio::test]
    async fn should_keep_running_triggers_after_one_fails() {
        let broken = publish_trigger("alerts/broken", TriggerCondition::Always);
        let healthy = publish_trigger("alerts/healthy", TriggerCondition::Always);
        let dispatcher =
            TriggerDispatcher::new(InMemoryTriggerRepo::with(vec![broken, healthy.clone()]));
        let publisher = SpyPublisher::default();
        publisher.fail_on("alerts/broken");

        let fired = dispatcher
            .dispatch(&publisher, &sensor(), &reading(), &SensorValue::Number { value: 31.0 })
            .await
            .unwrap();

        assert_eq!(fired, vec![healthy.id]);
        assert_eq!(publisher.sent().len(), 1);
        assert_eq!(publisher.sent()[0].0, "alerts/healthy");
    }

    #[tokio::test]
    async fn should_return_error_when_triggers_cannot_be_loaded() {
        let repo = InMemoryTriggerRepo::default();
        repo.fail.store(true, Ordering::SeqCst);
        let dispatcher = TriggerDispatcher::new(repo);

        let result = dispatcher
            .dispatch(
                &SpyPublisher::default(),
                &sensor(),
                &reading(),
                &SensorValue::Number { value: 31.0 },
            )
            .await;

        assert!(matches!(result, Err(SensorHubError::Storage(_))));
    }

    #[tokio::test]
    async fn should_evaluate_triggers_in_storage_order() {
        let first = publish_trigger("alerts/1", TriggerCondition::Always);
        let second = publish_trigger("alerts/2", TriggerCondition::Always);
        let dispatcher =
            TriggerDispatcher::new(InMemoryTriggerRepo::with(vec![first.clone(), second.clone()]));
        let publisher = SpyPublisher::default();

        let fired = dispatcher
            .dispatch(&publisher, &sensor(), &reading(), &SensorValue::Number { value: 31.0 })
            .await
            .unwrap();

        assert_eq!(fired, vec![first.id, second.id]);
    }
}
