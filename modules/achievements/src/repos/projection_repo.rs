//! Repository for the per-user answer projection
//!
//! The projection is updated once per consumed `answer.submitted` event; the
//! idempotent consumer guarantees each event is applied at most once.

use sqlx::PgPool;

use crate::models::AnswerProjection;

/// Atomically apply one answer to the user's projection
///
/// INSERT on first answer, additive UPDATE afterwards, returning the updated
/// row so award rules can be evaluated against fresh totals.
pub async fn upsert_answer(
    pool: &PgPool,
    user_id: i64,
    is_correct: bool,
    practical: bool,
) -> Result<AnswerProjection, sqlx::Error> {
    let correct_delta: i64 = if is_correct { 1 } else { 0 };
    let practical_delta: i64 = if is_correct && practical { 1 } else { 0 };

    sqlx::query_as::<_, AnswerProjection>(
        r#"
        INSERT INTO user_answer_projection
            (user_id, total_answers, correct_answers, practical_correct, updated_at)
        VALUES ($1, 1, $2, $3, NOW())
        ON CONFLICT (user_id)
        DO UPDATE SET
            total_answers = user_answer_projection.total_answers + 1,
            correct_answers = user_answer_projection.correct_answers + EXCLUDED.correct_answers,
            practical_correct = user_answer_projection.practical_correct + EXCLUDED.practical_correct,
            updated_at = NOW()
        RETURNING user_id, total_answers, correct_answers, practical_correct
        "#,
    )
    .bind(user_id)
    .bind(correct_delta)
    .bind(practical_delta)
    .fetch_one(pool)
    .await
}

/// Current projection for a user, if any answers have been recorded
pub async fn find_by_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Option<AnswerProjection>, sqlx::Error> {
    sqlx::query_as::<_, AnswerProjection>(
        r#"
        SELECT user_id, total_answers, correct_answers, practical_correct
        FROM user_answer_projection
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}
