use std::collections::HashSet;

use anyhow::Context;
use sqlx::{types::Json, PgPool, Postgres, Transaction};
use time::Date;
use uuid::Uuid;

use super::repo_types::{MealPlanRecord, NewMealPlanRecord, SlotUpdate};
use crate::dates::week_end;
use crate::recipes::model::{MealType, Nutrition, RecipeId};

const RECORD_COLUMNS: &str = "id, user_id, date, breakfast_id, lunch_id, dinner_id, is_generated, \
     generation_settings, user_rating, notes, weekly_meal_plan_id";

/// Whitelisted column for a slot; never interpolate anything else.
fn slot_column(meal_type: MealType) -> &'static str {
    match meal_type {
        MealType::Breakfast => "breakfast_id",
        MealType::Lunch => "lunch_id",
        MealType::Dinner => "dinner_id",
    }
}

pub async fn recipe_ids_between(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    to: Date,
) -> anyhow::Result<HashSet<RecipeId>> {
    let rows = sqlx::query_as::<_, (Option<String>, Option<String>, Option<String>)>(
        r#"
        SELECT breakfast_id, lunch_id, dinner_id
          FROM meal_plans
         WHERE user_id = $1
           AND date BETWEEN $2 AND $3
        "#,
    )
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
    .context("list recent meal plan ids")?;

    Ok(rows
        .into_iter()
        .flat_map(|(b, l, d)| [b, l, d])
        .flatten()
        .map(RecipeId)
        .collect())
}

pub async fn records_between(
    db: &PgPool,
    user_id: Uuid,
    from: Date,
    to: Date,
) -> anyhow::Result<Vec<MealPlanRecord>> {
    sqlx::query_as::<_, MealPlanRecord>(&format!(
        r#"
        SELECT {RECORD_COLUMNS}
          FROM meal_plans
         WHERE user_id = $1
           AND date BETWEEN $2 AND $3
         ORDER BY date ASC
        "#
    ))
    .bind(user_id)
    .bind(from)
    .bind(to)
    .fetch_all(db)
    .await
    .context("list meal plans")
}

pub async fn find_weekly_plan_id(
    db: &PgPool,
    user_id: Uuid,
    week_start: Date,
) -> anyhow::Result<Option<Uuid>> {
    sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM weekly_meal_plans WHERE user_id = $1 AND week_start_date = $2",
    )
    .bind(user_id)
    .bind(week_start)
    .fetch_optional(db)
    .await
    .context("find weekly meal plan")
}

/// Delete the week and write it again, all in one transaction.
pub async fn replace_week(
    db: &PgPool,
    user_id: Uuid,
    week_start: Date,
    records: &[NewMealPlanRecord],
    total_nutrition: &Nutrition,
) -> anyhow::Result<Uuid> {
    let mut tx = db.begin().await.context("begin tx")?;

    sqlx::query("DELETE FROM meal_plans WHERE user_id = $1 AND date BETWEEN $2 AND $3")
        .bind(user_id)
        .bind(week_start)
        .bind(week_end(week_start))
        .execute(&mut *tx)
        .await
        .context("delete week meal plans")?;

    sqlx::query("DELETE FROM weekly_meal_plans WHERE user_id = $1 AND week_start_date = $2")
        .bind(user_id)
        .bind(week_start)
        .execute(&mut *tx)
        .await
        .context("delete weekly meal plan")?;

    let weekly_id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO weekly_meal_plans (id, user_id, week_start_date, total_nutrition)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(weekly_id)
    .bind(user_id)
    .bind(week_start)
    .bind(Json(total_nutrition))
    .execute(&mut *tx)
    .await
    .context("insert weekly meal plan")?;

    for r in records {
        sqlx::query(
            r#"
            INSERT INTO meal_plans
                (id, user_id, date, breakfast_id, lunch_id, dinner_id,
                 is_generated, generation_settings, weekly_meal_plan_id)
            VALUES ($1, $2, $3, $4, $5, $6, TRUE, $7, $8)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(r.date)
        .bind(r.breakfast_id.as_ref().map(RecipeId::as_str))
        .bind(r.lunch_id.as_ref().map(RecipeId::as_str))
        .bind(r.dinner_id.as_ref().map(RecipeId::as_str))
        .bind(r.generation_settings.as_ref().map(Json))
        .bind(weekly_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("insert meal plan for {}", r.date))?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(weekly_id)
}

async fn ensure_weekly_plan(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    week_start: Date,
) -> anyhow::Result<Uuid> {
    sqlx::query_scalar::<_, Uuid>(
        r#"
        INSERT INTO weekly_meal_plans (id, user_id, week_start_date)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id, week_start_date)
        DO UPDATE SET week_start_date = EXCLUDED.week_start_date
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(week_start)
    .fetch_one(&mut **tx)
    .await
    .context("ensure weekly meal plan")
}

/// Rewrite one slot on each listed day. The upsert touches only that slot's
/// column, so the other meals of an existing day survive.
pub async fn update_slot_for_week(
    db: &PgPool,
    user_id: Uuid,
    week_start: Date,
    meal_type: MealType,
    updates: &[SlotUpdate],
    settings: &serde_json::Value,
) -> anyhow::Result<()> {
    let column = slot_column(meal_type);
    let mut tx = db.begin().await.context("begin tx")?;
    let weekly_id = ensure_weekly_plan(&mut tx, user_id, week_start).await?;

    for u in updates {
        sqlx::query(&format!(
            r#"
            INSERT INTO meal_plans
                (id, user_id, date, {column}, is_generated, generation_settings, weekly_meal_plan_id)
            VALUES ($1, $2, $3, $4, TRUE, $5, $6)
            ON CONFLICT (user_id, date) DO UPDATE
               SET {column} = EXCLUDED.{column},
                   is_generated = TRUE,
                   generation_settings = EXCLUDED.generation_settings,
                   weekly_meal_plan_id = EXCLUDED.weekly_meal_plan_id
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(u.date)
        .bind(u.recipe_id.as_ref().map(RecipeId::as_str))
        .bind(Json(settings))
        .bind(weekly_id)
        .execute(&mut *tx)
        .await
        .with_context(|| format!("update {meal_type} for {}", u.date))?;
    }

    tx.commit().await.context("commit tx")?;
    Ok(())
}

/// Manual edit of one slot. Rating and notes are kept when not given.
pub async fn set_slot(
    db: &PgPool,
    user_id: Uuid,
    date: Date,
    meal_type: MealType,
    recipe_id: Option<&RecipeId>,
    rating: Option<i16>,
    notes: Option<&str>,
) -> anyhow::Result<MealPlanRecord> {
    let column = slot_column(meal_type);
    sqlx::query_as::<_, MealPlanRecord>(&format!(
        r#"
        INSERT INTO meal_plans (id, user_id, date, {column}, is_generated, user_rating, notes)
        VALUES ($1, $2, $3, $4, FALSE, $5, $6)
        ON CONFLICT (user_id, date) DO UPDATE
           SET {column} = EXCLUDED.{column},
               user_rating = COALESCE(EXCLUDED.user_rating, meal_plans.user_rating),
               notes = COALESCE(EXCLUDED.notes, meal_plans.notes)
        RETURNING {RECORD_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(date)
    .bind(recipe_id.map(RecipeId::as_str))
    .bind(rating)
    .bind(notes)
    .fetch_one(db)
    .await
    .with_context(|| format!("set {meal_type} for {date}"))
}
