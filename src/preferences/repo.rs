use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::UserPreferences;

const PREFERENCE_COLUMNS: &str = "user_id, family_size, has_children, has_elderly, \
    allows_curry_two_days, eats_breakfast_bread, eats_granola_or_cereal, wants_rest_days, \
    uses_frozen_foods, uses_prepared_foods, allergies, created_at, updated_at";

pub async fn find_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<UserPreferences>> {
    let prefs = sqlx::query_as::<_, UserPreferences>(&format!(
        "SELECT {PREFERENCE_COLUMNS} FROM user_preferences WHERE user_id = $1"
    ))
    .bind(user_id)
    .fetch_optional(db)
    .await
    .context("find user preferences")?;
    Ok(prefs)
}

/// Insert unless present. The no-op update makes `RETURNING` yield the
/// existing row when another request created it first.
pub async fn insert_if_absent(db: &PgPool, p: &UserPreferences) -> anyhow::Result<UserPreferences> {
    let prefs = sqlx::query_as::<_, UserPreferences>(&format!(
        r#"
        INSERT INTO user_preferences (
            user_id, family_size, has_children, has_elderly, allows_curry_two_days,
            eats_breakfast_bread, eats_granola_or_cereal, wants_rest_days,
            uses_frozen_foods, uses_prepared_foods, allergies
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id
        RETURNING {PREFERENCE_COLUMNS}
        "#
    ))
    .bind(p.user_id)
    .bind(p.family_size)
    .bind(p.has_children)
    .bind(p.has_elderly)
    .bind(p.allows_curry_two_days)
    .bind(p.eats_breakfast_bread)
    .bind(p.eats_granola_or_cereal)
    .bind(p.wants_rest_days)
    .bind(p.uses_frozen_foods)
    .bind(p.uses_prepared_foods)
    .bind(&p.allergies)
    .fetch_one(db)
    .await
    .context("insert default user preferences")?;
    Ok(prefs)
}

pub async fn upsert(db: &PgPool, p: &UserPreferences) -> anyhow::Result<UserPreferences> {
    let prefs = sqlx::query_as::<_, UserPreferences>(&format!(
        r#"
        INSERT INTO user_preferences (
            user_id, family_size, has_children, has_elderly, allows_curry_two_days,
            eats_breakfast_bread, eats_granola_or_cereal, wants_rest_days,
            uses_frozen_foods, uses_prepared_foods, allergies
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO UPDATE SET
            family_size            = EXCLUDED.family_size,
            has_children           = EXCLUDED.has_children,
            has_elderly            = EXCLUDED.has_elderly,
            allows_curry_two_days  = EXCLUDED.allows_curry_two_days,
            eats_breakfast_bread   = EXCLUDED.eats_breakfast_bread,
            eats_granola_or_cereal = EXCLUDED.eats_granola_or_cereal,
            wants_rest_days        = EXCLUDED.wants_rest_days,
            uses_frozen_foods      = EXCLUDED.uses_frozen_foods,
            uses_prepared_foods    = EXCLUDED.uses_prepared_foods,
            allergies              = EXCLUDED.allergies,
            updated_at             = now()
        RETURNING {PREFERENCE_COLUMNS}
        "#
    ))
    .bind(p.user_id)
    .bind(p.family_size)
    .bind(p.has_children)
    .bind(p.has_elderly)
    .bind(p.allows_curry_two_days)
    .bind(p.eats_breakfast_bread)
    .bind(p.eats_granola_or_cereal)
    .bind(p.wants_rest_days)
    .bind(p.uses_frozen_foods)
    .bind(p.uses_prepared_foods)
    .bind(&p.allergies)
    .fetch_one(db)
    .await
    .context("upsert user preferences")?;
    Ok(prefs)
}
