//! Event handlers for the achievement reactor

use event_bus::{DomainEvent, EventBus, EventType};
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::{AchievementUnlockedPayload, AnswerSubmittedPayload};
use crate::repos::{award_repo, projection_repo};
use crate::rules;

/// Handle one `answer.submitted` event
///
/// 1. Applies the answer to the user's projection
/// 2. On a correct answer, evaluates award rules against the fresh totals
/// 3. Publishes `achievement.unlocked` for each newly awarded achievement,
///    on the incoming event's correlation chain
pub async fn handle_answer_submitted(
    pool: &PgPool,
    bus: &Arc<dyn EventBus>,
    service_id: &str,
    event: DomainEvent<AnswerSubmittedPayload>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let payload = &event.payload;

    tracing::info!(
        user_id = payload.user_id,
        question_id = payload.question_id,
        is_correct = payload.is_correct,
        correlation_id = %event.correlation_id,
        "Handling answer submission"
    );

    let projection = projection_repo::upsert_answer(
        pool,
        payload.user_id,
        payload.is_correct,
        payload.practical.unwrap_or(false),
    )
    .await?;

    // Awards only ever trigger on correct answers
    if !payload.is_correct {
        return Ok(());
    }

    for rule in rules::qualifying_rules(&projection) {
        let newly_awarded = award_repo::award(pool, payload.user_id, rule.id).await?;
        if !newly_awarded {
            continue;
        }

        tracing::info!(
            user_id = payload.user_id,
            achievement_id = rule.id,
            achievement_title = rule.title,
            correlation_id = %event.correlation_id,
            "Achievement unlocked"
        );

        publish_unlocked(bus, service_id, &event, rule.id, rule.title).await;
    }

    Ok(())
}

/// Publish `achievement.unlocked` as a child of the incoming event
///
/// Fire-and-forget: the award is already durable, so a publish failure is
/// logged and the handler still succeeds. Re-announcing is a replay concern,
/// not a processing failure.
async fn publish_unlocked(
    bus: &Arc<dyn EventBus>,
    service_id: &str,
    cause: &DomainEvent<AnswerSubmittedPayload>,
    achievement_id: i64,
    achievement_title: &str,
) {
    let unlocked = DomainEvent::new(
        EventType::AchievementUnlocked,
        cause.payload.user_id.to_string(),
        service_id.to_string(),
        AchievementUnlockedPayload {
            user_id: cause.payload.user_id,
            achievement_id,
            achievement_title: achievement_title.to_string(),
        },
    )
    .caused_by(cause.id, &cause.correlation_id);

    let payload = match serde_json::to_vec(&unlocked) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize achievement.unlocked event");
            return;
        }
    };

    if let Err(e) = bus.publish(unlocked.subject(), payload).await {
        tracing::warn!(
            event_id = %unlocked.id,
            achievement_id = achievement_id,
            error = %e,
            "Failed to publish achievement.unlocked, award is recorded locally"
        );
    }
}
