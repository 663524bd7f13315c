//! Repository for achievement definitions and per-user unlock status

use sqlx::PgPool;

use crate::models::{Achievement, UserAchievement};

/// All achievement definitions, ordered by ID
pub async fn find_all(pool: &PgPool) -> Result<Vec<Achievement>, sqlx::Error> {
    sqlx::query_as::<_, Achievement>(
        r#"
        SELECT id, title, description, sprite_col, sprite_row
        FROM achievements
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
}

/// All achievements with the user's unlock status
pub async fn find_for_user(
    pool: &PgPool,
    user_id: i64,
) -> Result<Vec<UserAchievement>, sqlx::Error> {
    sqlx::query_as::<_, UserAchievement>(
        r#"
        SELECT
            a.id,
            a.title,
            a.description,
            a.sprite_col,
            a.sprite_row,
            (ua.achievement_id IS NOT NULL) AS unlocked,
            ua.unlocked_at
        FROM achievements a
        LEFT JOIN user_achievements ua
            ON ua.achievement_id = a.id
           AND ua.user_id = $1
        ORDER BY a.id
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}
