//! Stats reporting API routes
//!
//! Read-only views over the stats projection. These never touch the
//! increment path; resets are an administrative operation outside this
//! service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::repos::stats_repo;
use crate::routes::AppState;

/// Overall totals for one user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStatsResponse {
    pub total_correct: i64,
    pub total_incorrect: i64,
    pub total_attempts: i64,
    pub overall_accuracy: f64,
}

/// Per-question counters for one user
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStatsResponse {
    pub question_id: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub accuracy_percentage: f64,
}

/// Response for GET /api/quiz/stats/{userId}
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatsResponse {
    pub overall: OverallStatsResponse,
    pub questions: Vec<QuestionStatsResponse>,
}

/// Response for GET /api/quiz/stats/{userId}/wrong-questions
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WrongQuestionsResponse {
    pub question_ids: Vec<i64>,
}

/// Stats error response
#[derive(Debug)]
pub struct StatsErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for StatsErrorResponse {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

fn internal_error(e: impl std::fmt::Display) -> StatsErrorResponse {
    StatsErrorResponse {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("Failed to fetch stats: {}", e),
    }
}

/// Percentage rounded to two decimals; 0 when there were no attempts
fn accuracy(correct: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (100.0 * correct as f64 / total as f64 * 100.0).round() / 100.0
}

/// Handler for GET /api/quiz/stats/{userId}
pub async fn get_user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserStatsResponse>, StatsErrorResponse> {
    let overall = stats_repo::user_overall(&state.pool, user_id)
        .await
        .map_err(internal_error)?;

    let total_correct = overall.correct_answers.unwrap_or(0);
    let total_incorrect = overall.incorrect_answers.unwrap_or(0);
    let total_attempts = overall.total_attempts.unwrap_or(0);

    let rows = stats_repo::user_question_rows(&state.pool, user_id)
        .await
        .map_err(internal_error)?;

    let questions = rows
        .into_iter()
        .map(|row| {
            let attempts = row.correct_count + row.incorrect_count;
            QuestionStatsResponse {
                question_id: row.question_id,
                correct_count: row.correct_count,
                incorrect_count: row.incorrect_count,
                accuracy_percentage: accuracy(row.correct_count, attempts),
            }
        })
        .collect();

    Ok(Json(UserStatsResponse {
        overall: OverallStatsResponse {
            total_correct,
            total_incorrect,
            total_attempts,
            overall_accuracy: accuracy(total_correct, total_attempts),
        },
        questions,
    }))
}

/// Handler for GET /api/quiz/stats/{userId}/wrong-questions
pub async fn get_wrong_questions(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<WrongQuestionsResponse>, StatsErrorResponse> {
    let question_ids = stats_repo::wrong_question_ids(&state.pool, user_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(WrongQuestionsResponse { question_ids }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(1, 3), 33.33);
        assert_eq!(accuracy(2, 3), 66.67);
        assert_eq!(accuracy(1, 1), 100.0);
    }

    #[test]
    fn test_accuracy_zero_attempts() {
        assert_eq!(accuracy(0, 0), 0.0);
    }
}
