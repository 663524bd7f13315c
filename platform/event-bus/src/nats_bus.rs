//! NATS-based implementation of the EventBus trait

use crate::{BusError, BusMessage, BusResult, EventBus};
use async_nats::Client;
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::sync::Arc;
use tokio::sync::RwLock;

/// EventBus implementation backed by a NATS connection
///
/// The connection handle is acquired once at process startup via
/// [`connect`](NatsBus::connect) and owned by the bus; callers hold an
/// `Arc<dyn EventBus>` and never re-acquire the connection themselves.
///
/// # Example
/// ```rust,no_run
/// use event_bus::{EventBus, NatsBus};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus = NatsBus::new();
/// bus.connect("nats://localhost:4222").await?;
///
/// // Use the bus
/// bus.publish("answer.submitted", b"{}".to_vec()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NatsBus {
    client: Arc<RwLock<Option<Client>>>,
}

impl NatsBus {
    /// Create a disconnected bus; call [`connect`](Self::connect) before use
    pub fn new() -> Self {
        Self {
            client: Arc::new(RwLock::new(None)),
        }
    }

    /// Create a NatsBus from an already-connected NATS client
    pub fn with_client(client: Client) -> Self {
        Self {
            client: Arc::new(RwLock::new(Some(client))),
        }
    }

    /// Establish the connection to the NATS server
    ///
    /// Idempotent: calling this while already connected is a no-op. Fails
    /// with `BusError::ConnectionError` if the transport is unreachable.
    pub async fn connect(&self, url: &str) -> BusResult<()> {
        let mut slot = self.client.write().await;
        if slot.is_some() {
            tracing::debug!(url = %url, "NATS connection already established, skipping connect");
            return Ok(());
        }

        let client = async_nats::connect(url)
            .await
            .map_err(|e| BusError::ConnectionError(e.to_string()))?;

        tracing::info!(url = %url, "Connected to NATS");
        *slot = Some(client);
        Ok(())
    }

    /// Whether the bus currently holds a connection
    pub async fn is_connected(&self) -> bool {
        self.client.read().await.is_some()
    }
}

impl Default for NatsBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventBus for NatsBus {
    async fn publish(&self, subject: &str, payload: Vec<u8>) -> BusResult<()> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(BusError::NotConnected)?;

        client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| BusError::PublishError(e.to_string()))?;

        Ok(())
    }

    async fn subscribe(&self, subject: &str) -> BusResult<BoxStream<'static, BusMessage>> {
        let guard = self.client.read().await;
        let client = guard.as_ref().ok_or(BusError::NotConnected)?;

        let subscriber = client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BusError::SubscribeError(e.to_string()))?;

        // Convert NATS messages to BusMessages
        let stream = subscriber.map(|nats_msg| {
            let mut msg = BusMessage::new(nats_msg.subject.to_string(), nats_msg.payload.to_vec());

            // Extract reply-to if present
            if let Some(reply) = nats_msg.reply {
                msg = msg.with_reply_to(reply.to_string());
            }

            // Extract headers if present
            if let Some(nats_headers) = nats_msg.headers {
                let mut headers = std::collections::HashMap::new();
                for (key, values) in nats_headers.iter() {
                    // Take the first value for each header
                    if let Some(value) = values.first() {
                        headers.insert(key.to_string(), value.to_string());
                    }
                }
                if !headers.is_empty() {
                    msg = msg.with_headers(headers);
                }
            }

            msg
        });

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: Most tests require a running NATS server
    // For CI, use InMemoryBus tests instead
    // For manual testing: docker run -p 4222:4222 nats:2.10-alpine

    #[tokio::test]
    async fn test_publish_without_connection_fails() {
        let bus = NatsBus::new();

        let result = bus.publish("answer.submitted", b"{}".to_vec()).await;
        assert!(matches!(result, Err(BusError::NotConnected)));
    }

    #[tokio::test]
    async fn test_subscribe_without_connection_fails() {
        let bus = NatsBus::new();

        let result = bus.subscribe("answer.>").await;
        assert!(matches!(result, Err(BusError::NotConnected)));
    }

    #[tokio::test]
    #[ignore] // Requires NATS server
    async fn test_connect_is_idempotent() {
        let bus = NatsBus::new();

        bus.connect("nats://localhost:4222")
            .await
            .expect("NATS server must be running on localhost:4222");
        assert!(bus.is_connected().await);

        // Second connect is a no-op
        bus.connect("nats://localhost:4222").await.unwrap();
        assert!(bus.is_connected().await);
    }

    #[tokio::test]
    #[ignore] // Requires NATS server
    async fn test_nats_bus_publish_subscribe() {
        let bus = NatsBus::new();
        bus.connect("nats://localhost:4222")
            .await
            .expect("NATS server must be running on localhost:4222");

        // Subscribe first
        let mut stream = bus.subscribe("answer.>").await.unwrap();

        // Publish a message
        let payload = b"test message".to_vec();
        bus.publish("answer.submitted", payload.clone())
            .await
            .unwrap();

        // Receive the message
        let msg = tokio::time::timeout(std::time::Duration::from_secs(2), stream.next())
            .await
            .expect("timeout waiting for message")
            .expect("stream ended");

        assert_eq!(msg.subject, "answer.submitted");
        assert_eq!(msg.payload, payload);
    }
}
