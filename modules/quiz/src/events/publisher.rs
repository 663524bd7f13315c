//! Event publisher for the quiz service
//!
//! Serializes domain events and publishes them to the subject derived from
//! the static event-type table. The bus connection is injected once at
//! startup; this layer never re-acquires it.

use event_bus::{BusError, DomainEvent, EventBus};
use serde::Serialize;
use std::sync::Arc;

/// How much the saga cares about a publish failure
///
/// Saga-critical events must fail loudly so the coordinator can run its own
/// failure path; telemetry-only events are logged and dropped when the bus is
/// unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    Saga,
    Telemetry,
}

/// Publisher stamping the configured service ID into every event
#[derive(Clone)]
pub struct EventPublisher {
    bus: Arc<dyn EventBus>,
    service_id: String,
}

impl EventPublisher {
    pub fn new(bus: Arc<dyn EventBus>, service_id: String) -> Self {
        Self { bus, service_id }
    }

    /// The service identifier stamped into published events
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Publish a domain event to its mapped subject
    ///
    /// With `Criticality::Saga`, any publish error is returned to the caller.
    /// With `Criticality::Telemetry`, publish errors are logged and swallowed
    /// (the event is dropped).
    pub async fn publish<T: Serialize>(
        &self,
        event: &DomainEvent<T>,
        criticality: Criticality,
    ) -> Result<(), BusError> {
        let subject = event.subject();

        let payload = serde_json::to_vec(event)
            .map_err(|e| BusError::SerializationError(e.to_string()))?;

        match self.bus.publish(subject, payload).await {
            Ok(()) => {
                tracing::debug!(
                    event_id = %event.id,
                    subject = %subject,
                    correlation_id = %event.correlation_id,
                    "Event published"
                );
                Ok(())
            }
            Err(e) => match criticality {
                Criticality::Saga => {
                    tracing::error!(
                        event_id = %event.id,
                        subject = %subject,
                        correlation_id = %event.correlation_id,
                        error = %e,
                        "Failed to publish saga-critical event"
                    );
                    Err(e)
                }
                Criticality::Telemetry => {
                    tracing::warn!(
                        event_id = %event.id,
                        subject = %subject,
                        correlation_id = %event.correlation_id,
                        error = %e,
                        "Dropping telemetry event, bus unavailable"
                    );
                    Ok(())
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use event_bus::{EventType, InMemoryBus, NatsBus};
    use serde_json::json;

    #[tokio::test]
    async fn test_saga_criticality_surfaces_publish_failure() {
        // A disconnected NatsBus fails every publish
        let bus: Arc<dyn EventBus> = Arc::new(NatsBus::new());
        let publisher = EventPublisher::new(bus, "quiz-service".to_string());

        let event = DomainEvent::new(
            EventType::AnswerSubmitted,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({}),
        );

        let result = publisher.publish(&event, Criticality::Saga).await;
        assert!(matches!(result, Err(BusError::NotConnected)));
    }

    #[tokio::test]
    async fn test_telemetry_criticality_drops_publish_failure() {
        let bus: Arc<dyn EventBus> = Arc::new(NatsBus::new());
        let publisher = EventPublisher::new(bus, "quiz-service".to_string());

        let event = DomainEvent::new(
            EventType::AnswerSubmissionFailed,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({}),
        );

        let result = publisher.publish(&event, Criticality::Telemetry).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_publish_lands_on_mapped_subject() {
        use futures::StreamExt;

        let bus = Arc::new(InMemoryBus::new());
        let mut stream = bus.subscribe("answer.submitted").await.unwrap();

        let publisher = EventPublisher::new(bus.clone(), "quiz-service".to_string());

        let event = DomainEvent::new(
            EventType::AnswerSubmitted,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({"userId": 7}),
        );
        publisher.publish(&event, Criticality::Saga).await.unwrap();

        let msg = tokio::time::timeout(std::time::Duration::from_secs(1), stream.next())
            .await
            .expect("timeout")
            .expect("stream ended");
        assert_eq!(msg.subject, "answer.submitted");

        let decoded: serde_json::Value = serde_json::from_slice(&msg.payload).unwrap();
        assert_eq!(decoded["type"], json!("answer.submitted"));
        assert_eq!(decoded["serviceId"], json!("quiz-service"));
    }
}
