use std::collections::HashMap;

use anyhow::Context;
use sqlx::PgPool;

use super::model::{MealType, Recipe, RecipeIngredient};
use super::repo_types::{RecipeIngredientRow, RecipeRow};

const RECIPE_COLUMNS: &str =
    "id, name, category, cooking_time, difficulty, servings, tags, seasonality, nutrition";

/// Load the whole catalog with ingredients.
pub async fn list_all(db: &PgPool) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY name ASC"
    ))
    .fetch_all(db)
    .await
    .context("list recipes")?;
    attach_ingredients(db, rows).await
}

/// Recipes of one category, minus the given ids.
pub async fn list_by_category(
    db: &PgPool,
    category: MealType,
    exclude_ids: &[String],
) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        r#"
        SELECT {RECIPE_COLUMNS}
          FROM recipes
         WHERE category = $1
           AND NOT (id = ANY($2))
         ORDER BY name ASC
        "#
    ))
    .bind(category.as_str())
    .bind(exclude_ids)
    .fetch_all(db)
    .await
    .with_context(|| format!("list {category} recipes"))?;
    attach_ingredients(db, rows).await
}

/// Recipes whose name or any tag contains one of `patterns`.
pub async fn list_by_name_or_tag(db: &PgPool, patterns: &[String]) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        r#"
        SELECT {RECIPE_COLUMNS}
          FROM recipes r
         WHERE EXISTS (
                SELECT 1
                  FROM unnest($1::text[]) AS p(pattern)
                 WHERE strpos(r.name, p.pattern) > 0
                    OR EXISTS (SELECT 1 FROM unnest(r.tags) AS t(tag) WHERE strpos(t.tag, p.pattern) > 0)
               )
         ORDER BY name ASC
        "#
    ))
    .bind(patterns)
    .fetch_all(db)
    .await
    .context("list recipes by name or tag")?;
    attach_ingredients(db, rows).await
}

pub async fn list_by_ids(db: &PgPool, ids: &[String]) -> anyhow::Result<Vec<Recipe>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = sqlx::query_as::<_, RecipeRow>(&format!(
        "SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = ANY($1)"
    ))
    .bind(ids)
    .fetch_all(db)
    .await
    .context("list recipes by id")?;
    attach_ingredients(db, rows).await
}

async fn attach_ingredients(db: &PgPool, rows: Vec<RecipeRow>) -> anyhow::Result<Vec<Recipe>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
    let ingredient_rows = sqlx::query_as::<_, RecipeIngredientRow>(
        r#"
        SELECT ri.recipe_id,
               ri.quantity,
               ri.unit,
               i.id                 AS ingredient_id,
               i.name               AS ingredient_name,
               i.category           AS ingredient_category,
               i.unit               AS default_unit,
               i.nutrition_per_100g,
               i.storage_type,
               i.shelf_life_days
          FROM recipe_ingredients ri
          JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ANY($1)
         ORDER BY ri.recipe_id, ri.position ASC
        "#,
    )
    .bind(&ids)
    .fetch_all(db)
    .await
    .context("list recipe ingredients")?;

    let mut by_recipe: HashMap<String, Vec<RecipeIngredient>> = HashMap::new();
    for row in ingredient_rows {
        by_recipe
            .entry(row.recipe_id.clone())
            .or_default()
            .push(row.into());
    }

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let ingredients = by_recipe.remove(&row.id).unwrap_or_default();
            row.into_recipe(ingredients)
        })
        .collect())
}
