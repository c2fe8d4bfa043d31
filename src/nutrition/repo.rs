use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::NutritionTarget;

const TARGET_COLUMNS: &str = "user_id, daily_calories, daily_protein, daily_fat, \
    daily_carbohydrates, daily_fiber, daily_sodium, updated_at";

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<NutritionTarget>> {
    sqlx::query_as::<_, NutritionTarget>(&format!(
        "SELECT {TARGET_COLUMNS} FROM nutrition_targets WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find nutrition target")
}

pub async fn insert_if_absent(db: &PgPool, t: &NutritionTarget) -> anyhow::Result<NutritionTarget> {
    sqlx::query_as::<_, NutritionTarget>(&format!(
        r#"
        INSERT INTO nutrition_targets (
            user_id, daily_calories, daily_protein, daily_fat,
            daily_carbohydrates, daily_fiber, daily_sodium
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING {TARGET_COLUMNS}
        "#
    ))
    .bind(t.user_id)
    .bind(t.daily_calories)
    .bind(t.daily_protein)
    .bind(t.daily_fat)
    .bind(t.daily_carbohydrates)
    .bind(t.daily_fiber)
    .bind(t.daily_sodium)
    .fetch_one(db)
    .await
    .context("insert default nutrition target")
}
