//! Long-lived consumer tasks
//!
//! Subscriptions are registered on a [`SubscriptionSet`]: one long-lived task
//! per subject, one handler invocation per received message, per-message
//! errors logged without stopping the loop. Transient processing failures are
//! retried with exponential backoff before the message is dropped.

use event_bus::consumer_retry::{retry_with_backoff, RetryConfig, NON_RETRIABLE};
use event_bus::{BusMessage, BusResult, EventBus, EventType, SubscriptionId, SubscriptionSet};
use sqlx::PgPool;
use std::sync::Arc;

use crate::consumer::EventConsumer;
use crate::handlers::handle_answer_submitted;
use crate::models::AnswerSubmittedPayload;

/// Register the consumer for `answer.submitted` events
///
/// The returned subscription stays live as long as the `SubscriptionSet`
/// does; the caller keeps the set for the lifetime of the process.
pub async fn start_answer_submitted_consumer(
    subscriptions: &SubscriptionSet,
    bus: Arc<dyn EventBus>,
    pool: PgPool,
    service_id: String,
) -> BusResult<SubscriptionId> {
    let consumer = Arc::new(EventConsumer::new(pool.clone()));
    let retry_config = RetryConfig::default();

    let subject = EventType::AnswerSubmitted.subject();
    tracing::info!("Starting answer submitted consumer on {}", subject);

    subscriptions
        .subscribe(subject, move |msg| {
            let consumer = consumer.clone();
            let pool = pool.clone();
            let bus = bus.clone();
            let service_id = service_id.clone();
            let retry_config = retry_config.clone();

            async move {
                let result = retry_with_backoff(
                    || {
                        let pool = pool.clone();
                        let bus = bus.clone();
                        let service_id = service_id.clone();
                        let msg = msg.clone();
                        let consumer = &consumer;
                        async move {
                            process_answer_submitted(consumer, &pool, &bus, &service_id, &msg)
                                .await
                                .map_err(classify_error)
                        }
                    },
                    &retry_config,
                    "answer_submitted_consumer",
                )
                .await;

                if let Err(e) = result {
                    tracing::error!(
                        subject = %msg.subject,
                        retry_count = retry_config.max_attempts,
                        error = %e,
                        "Event processing failed after retries, dropping message"
                    );
                }

                // Failures are handled above; never propagate an error that
                // would count against the subscription loop itself
                Ok(())
            }
        })
        .await
}

async fn process_answer_submitted(
    consumer: &EventConsumer,
    pool: &PgPool,
    bus: &Arc<dyn EventBus>,
    service_id: &str,
    msg: &BusMessage,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    consumer
        .process_idempotent(msg, |event: event_bus::DomainEvent<AnswerSubmittedPayload>| {
            handle_answer_submitted(pool, bus, service_id, event)
        })
        .await
}

/// Classify errors for the retry loop
///
/// Malformed envelopes can never succeed on a later attempt; everything else
/// (database, bus) is treated as transient.
fn classify_error(e: Box<dyn std::error::Error + Send + Sync>) -> String {
    if e.downcast_ref::<serde_json::Error>().is_some() {
        format!("{} {}", NON_RETRIABLE, e)
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_errors_are_non_retriable() {
        let parse_err: Box<dyn std::error::Error + Send + Sync> =
            Box::new(serde_json::from_str::<serde_json::Value>("not json").unwrap_err());

        assert!(classify_error(parse_err).starts_with(NON_RETRIABLE));
    }

    #[test]
    fn test_other_errors_are_retriable() {
        let io_err: Box<dyn std::error::Error + Send + Sync> = Box::new(
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "db down"),
        );

        assert!(!classify_error(io_err).starts_with(NON_RETRIABLE));
    }
}
