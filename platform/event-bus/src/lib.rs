//! # EventBus Abstraction
//!
//! A platform-level abstraction for event-driven messaging between the quiz
//! services.
//!
//! ## Why This Lives in `platform/`
//!
//! The EventBus is a **shared runtime capability** that all modules depend on.
//! Placing it in `platform/` allows:
//! - Modules to depend on platform crates without circular dependencies
//! - Plug-and-play module development (modules don't depend on each other)
//! - Config-driven swap between NATS (production) and InMemory (dev/test)
//!
//! ## Implementations
//!
//! - **NatsBus**: Production implementation over a NATS connection
//! - **InMemoryBus**: Test/dev implementation using in-memory channels
//!
//! ## Usage
//!
//! ```rust,no_run
//! use event_bus::{EventBus, NatsBus, InMemoryBus, BusMessage};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Production: NATS
//! let nats = NatsBus::new();
//! nats.connect("nats://localhost:4222").await?;
//! let bus: Arc<dyn EventBus> = Arc::new(nats);
//!
//! // Dev/Test: In-Memory
//! let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
//!
//! // Publish an event
//! let payload = serde_json::to_vec(&serde_json::json!({
//!     "type": "answer.submitted",
//!     "userId": 7
//! }))?;
//! bus.publish("answer.submitted", payload).await?;
//!
//! // Subscribe to events
//! let mut stream = bus.subscribe("answer.>").await?;
//! while let Some(msg) = futures::StreamExt::next(&mut stream).await {
//!     println!("Received: {} bytes on {}", msg.payload.len(), msg.subject);
//! }
//! # Ok(())
//! # }
//! ```

pub mod consumer_retry;
mod domain_event;
mod inmemory_bus;
mod nats_bus;
mod subjects;
mod subscriber;

pub use domain_event::{validate_event_fields, DomainEvent, EVENT_SCHEMA_VERSION};
pub use inmemory_bus::InMemoryBus;
pub use nats_bus::NatsBus;
pub use subjects::{compensation_subject, verify_subject_table, EventType};
pub use subscriber::{SubscriptionId, SubscriptionSet};

use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt;

/// A message received from the event bus
#[derive(Debug, Clone)]
pub struct BusMessage {
    /// The subject/topic this message was published to
    pub subject: String,
    /// The message payload (raw bytes)
    pub payload: Vec<u8>,
    /// Optional headers (reserved for future use)
    pub headers: Option<std::collections::HashMap<String, String>>,
    /// Optional reply-to subject (for request-response patterns)
    pub reply_to: Option<String>,
}

impl BusMessage {
    /// Create a new bus message
    pub fn new(subject: String, payload: Vec<u8>) -> Self {
        Self {
            subject,
            payload,
            headers: None,
            reply_to: None,
        }
    }

    /// Add headers to the message
    pub fn with_headers(mut self, headers: std::collections::HashMap<String, String>) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Add a reply-to subject
    pub fn with_reply_to(mut self, reply_to: String) -> Self {
        self.reply_to = Some(reply_to);
        self
    }
}

/// Errors that can occur when using the event bus
#[derive(Debug, thiserror::Error)]
pub enum BusError {
    #[error("failed to publish message: {0}")]
    PublishError(String),

    #[error("failed to subscribe to subject: {0}")]
    SubscribeError(String),

    #[error("connection error: {0}")]
    ConnectionError(String),

    #[error("not connected to the bus")]
    NotConnected,

    #[error("serialization error: {0}")]
    SerializationError(String),

    #[error("invalid subject pattern: {0}")]
    InvalidSubject(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

/// Result type for event bus operations
pub type BusResult<T> = Result<T, BusError>;

/// Core event bus abstraction for publish-subscribe messaging
///
/// This trait defines the interface that all event bus implementations must
/// satisfy. The bus itself gives at-most-once delivery: there are no built-in
/// retries and no delivery guarantee across reconnects. Retry policy belongs
/// to the caller.
#[async_trait]
pub trait EventBus: Send + Sync {
    /// Publish a message to a subject
    ///
    /// # Arguments
    /// * `subject` - The subject/topic to publish to (e.g., "answer.submitted")
    /// * `payload` - The message payload as raw bytes
    ///
    /// # Returns
    /// * `Ok(())` if the message was successfully handed to the transport
    /// * `Err(BusError)` if publishing failed (including `NotConnected`)
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()>;

    /// Subscribe to messages matching a subject pattern
    ///
    /// # Arguments
    /// * `subject` - The subject pattern to subscribe to (supports wildcards: `*`, `>`)
    ///   - `*` matches a single token (e.g., `answer.*`)
    ///   - `>` matches one or more tokens (e.g., `achievement.>`)
    ///
    /// # Returns
    /// * `Ok(BoxStream)` containing a stream of messages in receipt order for
    ///   this subject; there is no ordering guarantee across subjects
    /// * `Err(BusError)` if subscription failed
    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>>;
}

impl fmt::Debug for dyn EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventBus")
    }
}
