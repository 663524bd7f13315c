//! # Domain Event Envelope
//!
//! Platform-wide event shape for all inter-service communication.
//!
//! ## Envelope Fields
//!
//! - `id`: Unique event identifier (idempotency key)
//! - `type`: One of the [`EventType`](crate::EventType) values
//! - `aggregateId` / `aggregateType`: Primary entity the event refers to
//! - `payload`: Event-specific data, opaque to the transport
//! - `timestamp`: UTC instant the event was created
//! - `version`: Schema version for safe evolution
//! - `correlationId`: Shared by all events of one logical user action
//! - `causationId`: The `id` of the event that caused this one
//! - `serviceId`: The service that published the event
//!
//! Events are immutable once built: constructors and builders produce the
//! final value before publish, and consumers must treat the payload as opaque
//! structured data matching the declared type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::subjects::EventType;

/// Current envelope schema version stamped into new events
pub const EVENT_SCHEMA_VERSION: i32 = 1;

/// Standard domain event envelope
///
/// Wire format is camelCase JSON, matching what the platform's consumers
/// expect on the bus.
///
/// # Type Parameter
///
/// * `T` - The event-specific payload type
///
/// # Examples
///
/// ```rust
/// use event_bus::{DomainEvent, EventType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// #[serde(rename_all = "camelCase")]
/// struct AnswerSubmitted {
///     user_id: i64,
///     question_id: i64,
///     is_correct: bool,
/// }
///
/// let root = DomainEvent::new(
///     EventType::AnswerSubmitted,
///     "7".to_string(),
///     "quiz-service".to_string(),
///     AnswerSubmitted { user_id: 7, question_id: 42, is_correct: true },
/// );
///
/// // A child event inherits the correlation chain
/// let child = DomainEvent::new(
///     EventType::AchievementCheck,
///     "7".to_string(),
///     "quiz-service".to_string(),
///     serde_json::json!({"userId": 7}),
/// )
/// .caused_by(root.id, &root.correlation_id);
///
/// assert_eq!(child.correlation_id, root.correlation_id);
/// assert_eq!(child.causation_id, Some(root.id));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent<T> {
    /// Unique event identifier
    pub id: Uuid,

    /// Event type, also determines the publish subject
    #[serde(rename = "type")]
    pub event_type: EventType,

    /// Primary entity ID (userId, questionId, ...)
    pub aggregate_id: String,

    /// Kind of entity the aggregate ID refers to
    pub aggregate_type: String,

    /// Event-specific payload
    pub payload: T,

    /// UTC instant the event was created
    pub timestamp: DateTime<Utc>,

    /// Schema version for event evolution
    pub version: i32,

    /// Shared by all events of one logical user action; never empty
    pub correlation_id: String,

    /// The `id` of the immediate parent event, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<Uuid>,

    /// Identifier of the publishing service
    pub service_id: String,
}

impl<T> DomainEvent<T> {
    /// Create a new root event
    ///
    /// The event gets a fresh `id` and a fresh `correlationId`; use
    /// [`with_correlation_id`](Self::with_correlation_id) or
    /// [`caused_by`](Self::caused_by) to attach it to an existing chain.
    /// The aggregate type is derived from the event type.
    pub fn new(
        event_type: EventType,
        aggregate_id: String,
        service_id: String,
        payload: T,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            aggregate_type: event_type.aggregate_type().to_string(),
            aggregate_id,
            payload,
            timestamp: Utc::now(),
            version: EVENT_SCHEMA_VERSION,
            correlation_id: Uuid::new_v4().to_string(),
            causation_id: None,
            service_id,
        }
    }

    /// Attach this event to an existing correlation chain
    ///
    /// Empty correlation IDs are rejected by keeping the freshly generated
    /// one, so the non-empty invariant holds for every published event.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        let correlation_id = correlation_id.into();
        if !correlation_id.is_empty() {
            self.correlation_id = correlation_id;
        }
        self
    }

    /// Mark this event as caused by a parent event
    ///
    /// Inherits the parent's correlation ID and points `causationId` at the
    /// parent's `id`.
    pub fn caused_by(self, parent_id: Uuid, parent_correlation_id: &str) -> Self {
        let mut event = self.with_correlation_id(parent_correlation_id);
        event.causation_id = Some(parent_id);
        event
    }

    /// The subject this event publishes to
    pub fn subject(&self) -> &'static str {
        self.event_type.subject()
    }
}

/// Validate the envelope fields of a raw event
///
/// Used by consumers before dispatching to typed handlers.
///
/// # Validation Rules
///
/// - `id`: must be a valid UUID
/// - `type`: must be present
/// - `aggregateId`: must be non-empty
/// - `timestamp`: must be present
/// - `correlationId`: must be non-empty
/// - `serviceId`: must be non-empty
///
/// # Errors
///
/// Returns a descriptive error string if validation fails
pub fn validate_event_fields(event: &serde_json::Value) -> Result<(), String> {
    let id = event
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid id")?;
    Uuid::parse_str(id).map_err(|_| "id is not a valid UUID".to_string())?;

    event
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid type")?;

    let aggregate_id = event
        .get("aggregateId")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid aggregateId")?;
    if aggregate_id.is_empty() {
        return Err("aggregateId cannot be empty".to_string());
    }

    event
        .get("timestamp")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid timestamp")?;

    let correlation_id = event
        .get("correlationId")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid correlationId")?;
    if correlation_id.is_empty() {
        return Err("correlationId cannot be empty".to_string());
    }

    let service_id = event
        .get("serviceId")
        .and_then(|v| v.as_str())
        .ok_or("Missing or invalid serviceId")?;
    if service_id.is_empty() {
        return Err("serviceId cannot be empty".to_string());
    }

    // causationId is optional
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_event_has_fresh_correlation() {
        let event = DomainEvent::new(
            EventType::AnswerSubmitted,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({"userId": 7}),
        );

        assert!(!event.correlation_id.is_empty());
        assert!(event.causation_id.is_none());
        assert_eq!(event.aggregate_type, "answer");
        assert_eq!(event.version, EVENT_SCHEMA_VERSION);
        assert_eq!(event.service_id, "quiz-service");
    }

    #[test]
    fn test_caused_by_inherits_chain() {
        let root = DomainEvent::new(
            EventType::AnswerSubmitted,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({}),
        );

        let child = DomainEvent::new(
            EventType::AchievementCheck,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({}),
        )
        .caused_by(root.id, &root.correlation_id);

        assert_eq!(child.correlation_id, root.correlation_id);
        assert_eq!(child.causation_id, Some(root.id));
        assert_ne!(child.id, root.id);
    }

    #[test]
    fn test_empty_correlation_id_is_rejected() {
        let event = DomainEvent::new(
            EventType::LeaderboardUpdate,
            "7".to_string(),
            "quiz-service".to_string(),
            json!({}),
        )
        .with_correlation_id("");

        assert!(!event.correlation_id.is_empty());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let event = DomainEvent::new(
            EventType::AnswerSubmitted,
            "42".to_string(),
            "quiz-service".to_string(),
            json!({"questionId": 42}),
        );

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], json!("answer.submitted"));
        assert_eq!(value["aggregateId"], json!("42"));
        assert_eq!(value["aggregateType"], json!("answer"));
        assert!(value.get("correlationId").is_some());
        assert!(value.get("serviceId").is_some());
        // Absent causation is omitted, not null
        assert!(value.get("causationId").is_none());
    }

    #[test]
    fn test_wire_round_trip() {
        let event = DomainEvent::new(
            EventType::AchievementUnlocked,
            "7".to_string(),
            "achievements-service".to_string(),
            json!({"achievementId": 3, "achievementTitle": "First Steps"}),
        );

        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: DomainEvent<serde_json::Value> = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(decoded.id, event.id);
        assert_eq!(decoded.event_type, EventType::AchievementUnlocked);
        assert_eq!(decoded.correlation_id, event.correlation_id);
        assert_eq!(decoded.payload["achievementTitle"], json!("First Steps"));
    }

    #[test]
    fn test_validate_event_fields_valid() {
        let event = json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "answer.submitted",
            "aggregateId": "7",
            "aggregateType": "answer",
            "payload": {},
            "timestamp": "2025-01-01T00:00:00Z",
            "version": 1,
            "correlationId": "corr-123",
            "serviceId": "quiz-service"
        });

        assert!(validate_event_fields(&event).is_ok());
    }

    #[test]
    fn test_validate_event_fields_missing_correlation() {
        let event = json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "answer.submitted",
            "aggregateId": "7",
            "timestamp": "2025-01-01T00:00:00Z",
            "serviceId": "quiz-service"
        });

        assert!(validate_event_fields(&event).is_err());
    }

    #[test]
    fn test_validate_event_fields_empty_correlation() {
        let event = json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "type": "answer.submitted",
            "aggregateId": "7",
            "timestamp": "2025-01-01T00:00:00Z",
            "correlationId": "",
            "serviceId": "quiz-service"
        });

        assert!(validate_event_fields(&event).is_err());
    }
}
