//! Answer-submission saga coordinator
//!
//! Orchestrates one submission as a sequence of local steps plus asynchronous
//! event emissions, without a distributed transaction:
//!
//! 1. Validate the input shape
//! 2. Durably record the stats counter (the only step with a durability
//!    guarantee; nothing is published unless this commits)
//! 3. Publish `answer.submitted`, enriched best-effort from the question
//!    catalog
//! 4. If the answer was correct, fan out `achievement.check` then
//!    `leaderboard.update` on the same correlation chain
//! 5. Return to the caller as soon as the publish calls return; downstream
//!    processing is not awaited
//!
//! When a publish fails after the durable write committed, local state is
//! ahead of the announcement. The write is NOT rolled back: the coordinator
//! logs the gap, emits `answer.submission.failed` best-effort, and surfaces
//! the failure to the caller. Reconciliation (event-log replay, periodic
//! audit) is an external concern.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use event_bus::{BusError, DomainEvent, EventType};

use crate::catalog::CatalogClient;
use crate::events::payloads::{
    AchievementCheckPayload, AnswerSubmissionFailedPayload, AnswerSubmittedPayload,
    LeaderboardUpdatePayload,
};
use crate::events::publisher::{Criticality, EventPublisher};
use crate::repos::stats_repo::StatsCounter;
use crate::stats_store::{StatsError, StatsStore};
use crate::validation::{validate_submission, ValidationError};

/// One answer submission, consumed exactly once by the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmission {
    pub user_id: i64,
    pub question_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_choice_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_mode_id: Option<String>,
    pub is_correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// Errors surfaced to the submission caller
///
/// `Publish` means the durable write already committed; the caller sees a
/// failure, and a retry records a new attempt (at-least-once by count).
#[derive(Debug, thiserror::Error)]
pub enum SagaError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("durable stats write failed: {0}")]
    Persistence(#[from] StatsError),

    #[error("event publish failed after durable write: {0}")]
    Publish(BusError),
}

/// Successful saga result returned to the caller
#[derive(Debug, Clone)]
pub struct SagaOutcome {
    pub correlation_id: String,
    pub counter: StatsCounter,
    pub fanout_published: bool,
}

/// Coordinator for the answer-submission workflow
///
/// Owns nothing durable itself: the stats store and bus are injected once at
/// startup and shared across submissions. Each submission is handled on its
/// own task and only contends with others through the row lock taken by the
/// stats upsert.
pub struct SagaCoordinator {
    stats: Arc<dyn StatsStore>,
    publisher: EventPublisher,
    catalog: CatalogClient,
}

impl SagaCoordinator {
    pub fn new(
        stats: Arc<dyn StatsStore>,
        publisher: EventPublisher,
        catalog: CatalogClient,
    ) -> Self {
        Self {
            stats,
            publisher,
            catalog,
        }
    }

    /// Run the saga for one submission
    pub async fn record_answer(
        &self,
        submission: AnswerSubmission,
    ) -> Result<SagaOutcome, SagaError> {
        validate_submission(&submission)?;

        let correlation_id = Uuid::new_v4().to_string();

        tracing::debug!(
            correlation_id = %correlation_id,
            user_id = submission.user_id,
            question_id = submission.question_id,
            is_correct = submission.is_correct,
            "Starting answer submission saga"
        );

        // Durable write. Must commit before anything is announced; on failure
        // the saga aborts and only the failure event goes out.
        let counter = match self
            .stats
            .increment(
                submission.user_id,
                submission.question_id,
                submission.is_correct,
            )
            .await
        {
            Ok(counter) => counter,
            Err(e) => {
                tracing::error!(
                    correlation_id = %correlation_id,
                    user_id = submission.user_id,
                    question_id = submission.question_id,
                    error = %e,
                    "Durable stats write failed, aborting saga"
                );
                self.publish_submission_failed(&submission, &correlation_id, &e.to_string())
                    .await;
                return Err(SagaError::Persistence(e));
            }
        };

        // Announce the submission. Enrichment is best-effort: catalog failure
        // or timeout degrades the payload, never the submission.
        let submitted = self.build_submitted_event(&submission, &correlation_id).await;

        if let Err(e) = self.publisher.publish(&submitted, Criticality::Saga).await {
            tracing::error!(
                correlation_id = %correlation_id,
                event_id = %submitted.id,
                error = %e,
                "Stats committed but answer.submitted could not be published, local state is ahead of the announcement"
            );
            self.publish_submission_failed(&submission, &correlation_id, &e.to_string())
                .await;
            return Err(SagaError::Publish(e));
        }

        // Conditional fan-out, fixed order: achievement.check then
        // leaderboard.update. Fire-and-forget downstream; the coordinator
        // does not wait for consumer acknowledgment.
        let mut fanout_published = false;
        if submission.is_correct {
            let check = DomainEvent::new(
                EventType::AchievementCheck,
                submission.user_id.to_string(),
                self.publisher.service_id().to_string(),
                AchievementCheckPayload {
                    user_id: submission.user_id,
                    question_id: submission.question_id,
                    quiz_mode_id: submission.quiz_mode_id.clone(),
                    correlation_id: correlation_id.clone(),
                },
            )
            .caused_by(submitted.id, &submitted.correlation_id);

            if let Err(e) = self.publisher.publish(&check, Criticality::Saga).await {
                self.publish_submission_failed(&submission, &correlation_id, &e.to_string())
                    .await;
                return Err(SagaError::Publish(e));
            }

            let update = DomainEvent::new(
                EventType::LeaderboardUpdate,
                submission.user_id.to_string(),
                self.publisher.service_id().to_string(),
                LeaderboardUpdatePayload {
                    user_id: submission.user_id,
                    quiz_mode_id: submission.quiz_mode_id.clone(),
                    correlation_id: correlation_id.clone(),
                },
            )
            .caused_by(submitted.id, &submitted.correlation_id);

            if let Err(e) = self.publisher.publish(&update, Criticality::Saga).await {
                self.publish_submission_failed(&submission, &correlation_id, &e.to_string())
                    .await;
                return Err(SagaError::Publish(e));
            }

            fanout_published = true;
        }

        tracing::info!(
            correlation_id = %correlation_id,
            user_id = submission.user_id,
            question_id = submission.question_id,
            fanout = fanout_published,
            "Answer submission saga completed"
        );

        Ok(SagaOutcome {
            correlation_id,
            counter,
            fanout_published,
        })
    }

    /// Build the `answer.submitted` event, enriched from the catalog when the
    /// submission itself did not carry the question metadata
    async fn build_submitted_event(
        &self,
        submission: &AnswerSubmission,
        correlation_id: &str,
    ) -> DomainEvent<AnswerSubmittedPayload> {
        let needs_enrichment = submission.question_type.is_none()
            || submission.practical.is_none()
            || submission.difficulty.is_none();

        let meta = if needs_enrichment {
            self.catalog
                .fetch_question(submission.question_id)
                .await
                .unwrap_or_default()
        } else {
            Default::default()
        };

        let payload = AnswerSubmittedPayload {
            user_id: submission.user_id,
            question_id: submission.question_id,
            selected_choice_id: submission.selected_choice_id,
            quiz_mode_id: submission.quiz_mode_id.clone(),
            is_correct: submission.is_correct,
            timestamp: chrono::Utc::now().to_rfc3339(),
            correlation_id: correlation_id.to_string(),
            question_type: submission.question_type.clone().or(meta.question_type),
            practical: submission.practical.or(meta.practical),
            difficulty: submission.difficulty.clone().or(meta.difficulty),
        };

        DomainEvent::new(
            EventType::AnswerSubmitted,
            submission.user_id.to_string(),
            self.publisher.service_id().to_string(),
            payload,
        )
        .with_correlation_id(correlation_id)
    }

    /// Best-effort failure announcement on a side channel
    ///
    /// Telemetry criticality: if the bus itself is down this event is dropped
    /// too, which is a documented gap, not an error path.
    async fn publish_submission_failed(
        &self,
        submission: &AnswerSubmission,
        correlation_id: &str,
        error: &str,
    ) {
        let event = DomainEvent::new(
            EventType::AnswerSubmissionFailed,
            submission.user_id.to_string(),
            self.publisher.service_id().to_string(),
            AnswerSubmissionFailedPayload {
                user_id: submission.user_id,
                question_id: submission.question_id,
                error: error.to_string(),
                correlation_id: correlation_id.to_string(),
            },
        )
        .with_correlation_id(correlation_id);

        let _ = self.publisher.publish(&event, Criticality::Telemetry).await;
    }
}
