//! Achievement read API
//!
//! Serves achievement definitions and per-user unlock status. Awarding only
//! ever happens through the event consumer.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sqlx::PgPool;

use crate::models::{Achievement, UserAchievement};
use crate::repos::achievement_repo;

/// Achievement error response
#[derive(Debug)]
pub struct AchievementErrorResponse {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AchievementErrorResponse {
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

fn internal_error(e: impl std::fmt::Display) -> AchievementErrorResponse {
    AchievementErrorResponse {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: format!("Failed to fetch achievements: {}", e),
    }
}

/// Handler for GET /api/achievements
pub async fn list_achievements(
    State(pool): State<PgPool>,
) -> Result<Json<Vec<Achievement>>, AchievementErrorResponse> {
    let achievements = achievement_repo::find_all(&pool)
        .await
        .map_err(internal_error)?;

    Ok(Json(achievements))
}

/// Handler for GET /api/achievements/user/{userId}
pub async fn get_user_achievements(
    State(pool): State<PgPool>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<UserAchievement>>, AchievementErrorResponse> {
    let achievements = achievement_repo::find_for_user(&pool, user_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(achievements))
}
