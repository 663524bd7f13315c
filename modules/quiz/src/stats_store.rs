//! Stats projection store
//!
//! Single source of truth for correct/incorrect counts. The coordinator only
//! goes through [`StatsStore::increment`]; it never reads-then-writes. The
//! trait seam lets tests drive the saga against a failing or in-memory store.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::repos::stats_repo::{self, StatsCounter};

/// Errors from the stats projection store
#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Durable counter store keyed by `(user_id, question_id)`
///
/// `increment` must be atomic: concurrent calls for different pairs never
/// block each other, concurrent calls for the same pair serialize without
/// lost updates.
#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Record one submission, incrementing the matching counter
    async fn increment(
        &self,
        user_id: i64,
        question_id: i64,
        is_correct: bool,
    ) -> Result<StatsCounter, StatsError>;
}

/// Postgres-backed stats store over the `user_question_stats` table
pub struct PgStatsStore {
    pool: PgPool,
}

impl PgStatsStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for PgStatsStore {
    async fn increment(
        &self,
        user_id: i64,
        question_id: i64,
        is_correct: bool,
    ) -> Result<StatsCounter, StatsError> {
        let counter =
            stats_repo::upsert_increment(&self.pool, user_id, question_id, is_correct).await?;

        tracing::debug!(
            user_id = user_id,
            question_id = question_id,
            correct_count = counter.correct_count,
            incorrect_count = counter.incorrect_count,
            "Stats counter incremented"
        );

        Ok(counter)
    }
}
