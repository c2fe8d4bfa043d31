use super::dto::RecipeQuery;
use super::model::{MealType, Recipe};
use crate::error::PlanError;
use crate::storage::RecipeCatalog;

/// Catalog browsing: category, free-text search over name and tags, and a
/// required-tag list, ordered by name.
pub async fn search<S>(store: &S, q: &RecipeQuery) -> Result<Vec<Recipe>, PlanError>
where
    S: RecipeCatalog + ?Sized,
{
    let category = match q.category.as_deref().filter(|c| !c.trim().is_empty()) {
        Some(raw) => Some(MealType::parse(raw).ok_or_else(|| {
            PlanError::invalid("category must be one of breakfast, lunch, dinner")
        })?),
        None => None,
    };
    let search = q
        .search
        .as_deref()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let tags: Vec<String> = q
        .tags
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    let mut recipes: Vec<Recipe> = store
        .all_recipes()
        .await?
        .into_iter()
        .filter(|r| category.map_or(true, |c| r.category == c))
        .filter(|r| search.as_deref().map_or(true, |s| matches_text(r, s)))
        .filter(|r| tags.iter().all(|t| matches_tag(r, t)))
        .collect();
    recipes.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(recipes)
}

fn matches_text(recipe: &Recipe, needle: &str) -> bool {
    recipe.name.to_lowercase().contains(needle) || matches_tag(recipe, needle)
}

fn matches_tag(recipe: &Recipe, needle: &str) -> bool {
    recipe.tags.iter().any(|t| t.to_lowercase().contains(needle))
}
