//! Idempotent event consumer
//!
//! Ensures events are processed at most once by tracking processed event IDs
//! in the `processed_events` table. The bus redelivers on reconnect and the
//! quiz side is at-least-once, so duplicates are expected, not exceptional.

use event_bus::{BusMessage, DomainEvent};
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use uuid::Uuid;

pub struct EventConsumer {
    pool: PgPool,
}

impl EventConsumer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Check if an event has already been processed
    pub async fn is_processed(&self, event_id: Uuid) -> Result<bool, sqlx::Error> {
        #[derive(sqlx::FromRow)]
        struct ProcessedEvent {
            #[allow(dead_code)]
            event_id: Uuid,
        }

        let result: Option<ProcessedEvent> = sqlx::query_as(
            r#"
            SELECT event_id FROM processed_events
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(result.is_some())
    }

    /// Mark an event as processed
    pub async fn mark_processed(
        &self,
        event_id: Uuid,
        subject: &str,
        service_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO processed_events (event_id, subject, source_service)
            VALUES ($1, $2, $3)
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(subject)
        .bind(service_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Process an event with idempotency guarantee
    ///
    /// Deserializes the typed envelope, skips events already processed, and
    /// records the event ID after the handler succeeds.
    pub async fn process_idempotent<T, F, Fut>(
        &self,
        msg: &BusMessage,
        handler: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        T: DeserializeOwned,
        F: FnOnce(DomainEvent<T>) -> Fut,
        Fut: std::future::Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>>,
    {
        let event: DomainEvent<T> = serde_json::from_slice(&msg.payload)?;

        let event_id = event.id;
        let service_id = event.service_id.clone();

        // Check if already processed
        if self.is_processed(event_id).await? {
            tracing::debug!(
                event_id = %event_id,
                subject = %msg.subject,
                "Event already processed, skipping"
            );
            return Ok(());
        }

        // Call handler
        handler(event).await?;

        // Mark as processed
        self.mark_processed(event_id, &msg.subject, &service_id)
            .await?;

        tracing::info!(
            event_id = %event_id,
            subject = %msg.subject,
            "Event processed successfully"
        );

        Ok(())
    }
}
