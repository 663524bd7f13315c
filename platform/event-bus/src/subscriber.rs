//! Handler-based subscription management
//!
//! [`SubscriptionSet`] layers a handler-per-subject model on top of the
//! stream-based [`EventBus`] API: each subscription runs as a long-lived
//! concurrent task pulling from its subject stream, invoking the registered
//! async handler once per message in receipt order. Handler errors are caught
//! and logged per message; one failing message never stops delivery of
//! subsequent messages to the same subscription.

use crate::{BusMessage, BusResult, EventBus};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Opaque identifier for a registered subscription
pub type SubscriptionId = Uuid;

struct SubscriptionHandle {
    subject: String,
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Registry of handler-based subscriptions over a shared bus
///
/// # Example
/// ```rust
/// use event_bus::{EventBus, InMemoryBus, SubscriptionSet};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let bus: Arc<dyn EventBus> = Arc::new(InMemoryBus::new());
/// let subs = SubscriptionSet::new(bus.clone());
///
/// let id = subs
///     .subscribe("answer.submitted", |msg| async move {
///         println!("got {} bytes", msg.payload.len());
///         Ok(())
///     })
///     .await?;
///
/// // ... later
/// subs.unsubscribe(id).await;
/// # Ok(())
/// # }
/// ```
pub struct SubscriptionSet {
    bus: Arc<dyn EventBus>,
    subscriptions: Mutex<HashMap<SubscriptionId, SubscriptionHandle>>,
}

impl SubscriptionSet {
    /// Create a new subscription set over the given bus
    pub fn new(bus: Arc<dyn EventBus>) -> Self {
        Self {
            bus,
            subscriptions: Mutex::new(HashMap::new()),
        }
    }

    /// Register an async handler for a subject pattern
    ///
    /// Spawns a task that invokes `handler` once per received message, in
    /// receipt order for that subject. A handler error is logged and the loop
    /// continues with the next message.
    ///
    /// Returns the subscription ID used for [`unsubscribe`](Self::unsubscribe).
    pub async fn subscribe<F, Fut>(&self, subject: &str, handler: F) -> BusResult<SubscriptionId>
    where
        F: Fn(BusMessage) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), Box<dyn std::error::Error + Send + Sync>>> + Send + 'static,
    {
        let mut stream = self.bus.subscribe(subject).await?;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let id = Uuid::new_v4();
        let task_subject = subject.to_string();

        let task = tokio::spawn(async move {
            use futures::StreamExt;

            loop {
                // The stop signal is only checked between messages, so an
                // in-flight handler invocation always runs to completion.
                tokio::select! {
                    _ = &mut stop_rx => break,
                    next = stream.next() => match next {
                        Some(msg) => {
                            let msg_subject = msg.subject.clone();
                            if let Err(e) = handler(msg).await {
                                tracing::error!(
                                    subject = %msg_subject,
                                    subscription_id = %id,
                                    error = %e,
                                    "Handler failed for message, continuing"
                                );
                            }
                        }
                        None => break,
                    }
                }
            }

            tracing::debug!(subject = %task_subject, subscription_id = %id, "Subscription loop stopped");
        });

        let mut subs = self.subscriptions.lock().await;
        subs.insert(
            id,
            SubscriptionHandle {
                subject: subject.to_string(),
                stop: stop_tx,
                task,
            },
        );

        tracing::info!(subject = %subject, subscription_id = %id, "Subscribed");
        Ok(id)
    }

    /// Stop delivery for a subscription
    ///
    /// Returns `true` if the subscription existed. The subscription task stops
    /// pulling new messages; an outstanding handler invocation completes.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let handle = self.subscriptions.lock().await.remove(&id);

        match handle {
            Some(handle) => {
                // Dropping the sender would also stop the loop; an explicit
                // send keeps the shutdown path observable in one place.
                let _ = handle.stop.send(());
                tracing::info!(subject = %handle.subject, subscription_id = %id, "Unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Number of currently registered subscriptions
    pub async fn len(&self) -> usize {
        self.subscriptions.lock().await.len()
    }

    /// Whether no subscriptions are registered
    pub async fn is_empty(&self) -> bool {
        self.subscriptions.lock().await.is_empty()
    }

    /// Stop all subscriptions and wait for their tasks to exit
    pub async fn shutdown(&self) {
        let handles: Vec<SubscriptionHandle> = {
            let mut subs = self.subscriptions.lock().await;
            subs.drain().map(|(_, h)| h).collect()
        };

        for handle in handles {
            let _ = handle.stop.send(());
            let _ = handle.task.await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryBus;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_bus() -> Arc<dyn EventBus> {
        Arc::new(InMemoryBus::new())
    }

    #[tokio::test]
    async fn test_handler_receives_messages_in_order() {
        let bus = test_bus();
        let subs = SubscriptionSet::new(bus.clone());

        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        subs.subscribe("answer.submitted", move |msg| {
            let tx = tx.clone();
            async move {
                tx.send(msg.payload).unwrap();
                Ok(())
            }
        })
        .await
        .unwrap();

        for i in 0..3u8 {
            bus.publish("answer.submitted", vec![i]).await.unwrap();
        }

        for i in 0..3u8 {
            let payload = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .expect("timeout")
                .expect("channel closed");
            assert_eq!(payload, vec![i]);
        }
    }

    #[tokio::test]
    async fn test_handler_error_does_not_stop_delivery() {
        let bus = test_bus();
        let subs = SubscriptionSet::new(bus.clone());

        let processed = Arc::new(AtomicUsize::new(0));
        let processed_clone = processed.clone();

        subs.subscribe("answer.submitted", move |msg| {
            let processed = processed_clone.clone();
            async move {
                if msg.payload == b"poison" {
                    return Err("poison message".into());
                }
                processed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await
        .unwrap();

        bus.publish("answer.submitted", b"poison".to_vec())
            .await
            .unwrap();
        bus.publish("answer.submitted", b"ok".to_vec()).await.unwrap();
        bus.publish("answer.submitted", b"ok".to_vec()).await.unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while processed.load(Ordering::SeqCst) < 2 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("messages after a failing one should still be delivered");
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let bus = test_bus();
        let subs = SubscriptionSet::new(bus.clone());

        let received = Arc::new(AtomicUsize::new(0));
        let received_clone = received.clone();

        let id = subs
            .subscribe("leaderboard.update", move |_msg| {
                let received = received_clone.clone();
                async move {
                    received.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await
            .unwrap();

        bus.publish("leaderboard.update", b"one".to_vec())
            .await
            .unwrap();

        tokio::time::timeout(Duration::from_secs(1), async {
            while received.load(Ordering::SeqCst) < 1 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("first message should arrive");

        assert!(subs.unsubscribe(id).await);
        assert!(subs.is_empty().await);

        // Give the loop time to observe the stop signal before publishing more
        tokio::time::sleep(Duration::from_millis(20)).await;
        bus.publish("leaderboard.update", b"two".to_vec())
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(received.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_unknown_id() {
        let subs = SubscriptionSet::new(test_bus());
        assert!(!subs.unsubscribe(Uuid::new_v4()).await);
    }
}
