use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// INCOMING EVENT PAYLOADS
// ============================================================================

/// Payload for `answer.submitted` events consumed from the quiz service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmittedPayload {
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

// ============================================================================
// OUTGOING EVENT PAYLOADS
// ============================================================================

/// Payload for `achievement.unlocked`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementUnlockedPayload {
    pub user_id: i64,
    pub achievement_id: i64,
    pub achievement_title: String,
}

// ============================================================================
// DATABASE MODELS
// ============================================================================

/// One achievement definition
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub sprite_col: i32,
    pub sprite_row: i32,
}

/// Achievement with per-user unlock status
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub sprite_col: i32,
    pub sprite_row: i32,
    pub unlocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Per-user answer projection maintained from `answer.submitted`
#[derive(Debug, Clone, FromRow)]
pub struct AnswerProjection {
    pub user_id: i64,
    pub total_answers: i64,
    pub correct_answers: i64,
    pub practical_correct: i64,
}
