//! Answer submission API route
//!
//! POST /api/quiz/answers runs the submission saga. Callers get either a
//! success acknowledgment (durable write + announcement both succeeded) or a
//! failure; never "partially succeeded". Achievements are awarded
//! asynchronously by the downstream reactor, so the acknowledgment carries an
//! empty award list.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::routes::AppState;
use crate::saga::{AnswerSubmission, SagaError};

/// Response for a recorded answer
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordAnswerResponse {
    pub success: bool,
    pub correlation_id: String,
    /// Filled asynchronously by the achievements reactor; always empty here
    pub awarded_achievements: Vec<serde_json::Value>,
    pub leaderboard_updated: bool,
}

/// Error response with mapped status code
#[derive(Debug)]
pub struct AnswerErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AnswerErrorResponse {
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

impl From<SagaError> for AnswerErrorResponse {
    fn from(err: SagaError) -> Self {
        let status = match &err {
            SagaError::Validation(_) => StatusCode::BAD_REQUEST,
            SagaError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            SagaError::Publish(_) => StatusCode::BAD_GATEWAY,
        };

        AnswerErrorResponse {
            status,
            message: err.to_string(),
        }
    }
}

/// Handler for POST /api/quiz/answers
pub async fn record_answer(
    State(state): State<AppState>,
    Json(submission): Json<AnswerSubmission>,
) -> Result<Json<RecordAnswerResponse>, AnswerErrorResponse> {
    let outcome = state.saga.record_answer(submission).await?;

    Ok(Json(RecordAnswerResponse {
        success: true,
        correlation_id: outcome.correlation_id,
        awarded_achievements: Vec::new(),
        leaderboard_updated: outcome.fanout_published,
    }))
}
