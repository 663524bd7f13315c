//! Repository for awarded achievements

use sqlx::PgPool;

/// Award an achievement to a user
///
/// Returns `true` only when the row was newly inserted; a user can hold each
/// achievement once, and only first-time awards publish an unlock event.
pub async fn award(
    pool: &PgPool,
    user_id: i64,
    achievement_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO user_achievements (user_id, achievement_id, unlocked_at)
        VALUES ($1, $2, NOW())
        ON CONFLICT (user_id, achievement_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(achievement_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
