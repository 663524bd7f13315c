//! Outgoing event payloads published by the quiz service
//!
//! Payload field names follow the camelCase wire convention; the correlation
//! ID is duplicated into the payload so consumers that only look at payloads
//! can still join the trace.

use serde::{Deserialize, Serialize};

/// Payload for `answer.submitted`
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
    pub timestamp: String,
    pub correlation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub practical: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
}

/// Payload for `answer.submission.failed`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerSubmissionFailedPayload {
    pub user_id: i64,
    pub question_id: i64,
    pub error: String,
    pub correlation_id: String,
}

/// Payload for `achievement.check`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementCheckPayload {
    pub user_id: i64,
    pub question_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_mode_id: Option<String>,
    pub correlation_id: String,
}

/// Payload for `leaderboard.update`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardUpdatePayload {
    pub user_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiz_mode_id: Option<String>,
    pub correlation_id: String,
}
