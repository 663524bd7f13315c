//! Repository for per-user/per-question answer counters
//!
//! Provides the atomic upsert used by the saga coordinator and the read
//! queries behind the stats reporting endpoints. Counters are monotonically
//! incremented; nothing in the hot path ever decrements or deletes a row.

use sqlx::{FromRow, PgPool};

/// One row of the stats projection, keyed by `(user_id, question_id)`
///
/// Invariant: `correct_count + incorrect_count` equals the number of
/// submissions ever recorded for that pair.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct StatsCounter {
    pub user_id: i64,
    pub question_id: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
}

/// Per-user rollup across all questions
#[derive(Debug, Clone, FromRow)]
pub struct OverallStats {
    pub total_attempts: Option<i64>,
    pub correct_answers: Option<i64>,
    pub incorrect_answers: Option<i64>,
}

/// Atomically record one submission for `(user_id, question_id)`
///
/// INSERT on first submission, additive UPDATE afterwards. Concurrent calls
/// for the same pair serialize on the row lock taken by the upsert; there is
/// no read-then-write window, so no lost updates. Each call counts: replaying
/// the same submission increments again (at-least-once by count, by design).
pub async fn upsert_increment(
    pool: &PgPool,
    user_id: i64,
    question_id: i64,
    is_correct: bool,
) -> Result<StatsCounter, sqlx::Error> {
    let correct_delta: i64 = if is_correct { 1 } else { 0 };
    let incorrect_delta: i64 = if is_correct { 0 } else { 1 };

    let counter = sqlx::query_as::<_, StatsCounter>(
        r#"
        INSERT INTO user_question_stats
            (user_id, question_id, correct_count, incorrect_count, updated_at)
        VALUES ($1, $2, $3, $4, NOW())
        ON CONFLICT (user_id, question_id)
        DO UPDATE SET
            correct_count = user_question_stats.correct_count + EXCLUDED.correct_count,
            incorrect_count = user_question_stats.incorrect_count + EXCLUDED.incorrect_count,
            updated_at = NOW()
        RETURNING user_id, question_id, correct_count, incorrect_count
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .bind(correct_delta)
    .bind(incorrect_delta)
    .fetch_one(pool)
    .await?;

    Ok(counter)
}

/// Find the counter for a `(user_id, question_id)` pair
///
/// Returns None if the pair has never been recorded.
pub async fn find_by_pair(
    pool: &PgPool,
    user_id: i64,
    question_id: i64,
) -> Result<Option<StatsCounter>, sqlx::Error> {
    sqlx::query_as::<_, StatsCounter>(
        r#"
        SELECT user_id, question_id, correct_count, incorrect_count
        FROM user_question_stats
        WHERE user_id = $1
          AND question_id = $2
        "#,
    )
    .bind(user_id)
    .bind(question_id)
    .fetch_optional(pool)
    .await
}

/// Aggregate totals for one user across all questions
pub async fn user_overall(pool: &PgPool, user_id: i64) -> Result<OverallStats, sqlx::Error> {
    sqlx::query_as::<_, OverallStats>(
        r#"
        SELECT
            SUM(correct_count + incorrect_count)::BIGINT AS total_attempts,
            SUM(correct_count)::BIGINT AS correct_answers,
            SUM(incorrect_count)::BIGINT AS incorrect_answers
        FROM user_question_stats
        WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}

/// Per-question counters for one user, ordered by question
pub async fn user_question_rows(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<StatsCounter>, sqlx::Error> {
    sqlx::query_as::<_, StatsCounter>(
        r#"
        SELECT user_id, question_id, correct_count, incorrect_count
        FROM user_question_stats
        WHERE user_id = $1
        ORDER BY question_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

/// Question IDs the user has answered incorrectly at least once
pub async fn wrong_question_ids(pool: &PgPool, user_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    #[derive(FromRow)]
    struct QuestionIdRow {
        question_id: i64,
    }

    let rows = sqlx::query_as::<_, QuestionIdRow>(
        r#"
        SELECT question_id
        FROM user_question_stats
        WHERE user_id = $1
          AND incorrect_count > 0
        ORDER BY question_id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.question_id).collect())
}
