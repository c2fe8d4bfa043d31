use sqlx::{types::Json, FromRow};
use tracing::warn;

use super::model::{
    Ingredient, IngredientCategory, MealType, Nutrition, Recipe, RecipeId, RecipeIngredient,
    Season, StorageType,
};

/// Row of `recipes`, without ingredients.
#[derive(Debug, FromRow)]
pub struct RecipeRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub cooking_time: i32,
    pub difficulty: i16,
    pub servings: i32,
    pub tags: Vec<String>,
    pub seasonality: Vec<String>,
    pub nutrition: Json<Nutrition>,
}

/// `recipe_ingredients` joined with `ingredients`.
#[derive(Debug, FromRow)]
pub struct RecipeIngredientRow {
    pub recipe_id: String,
    pub quantity: f64,
    pub unit: String,
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub ingredient_category: String,
    pub default_unit: String,
    pub nutrition_per_100g: Option<Json<Nutrition>>,
    pub storage_type: Option<String>,
    pub shelf_life_days: Option<i32>,
}

impl RecipeRow {
    /// Rows with a category outside breakfast/lunch/dinner are skipped.
    pub fn into_recipe(self, ingredients: Vec<RecipeIngredient>) -> Option<Recipe> {
        let Some(category) = MealType::parse(&self.category) else {
            warn!(recipe_id = %self.id, category = %self.category, "skipping recipe with unknown category");
            return None;
        };
        Some(Recipe {
            id: RecipeId(self.id),
            name: self.name,
            category,
            cooking_time: self.cooking_time,
            difficulty: self.difficulty,
            servings: self.servings,
            tags: self.tags,
            seasonality: self.seasonality.iter().filter_map(|s| Season::parse(s)).collect(),
            nutrition: self.nutrition.0,
            ingredients,
        })
    }
}

impl From<RecipeIngredientRow> for RecipeIngredient {
    fn from(r: RecipeIngredientRow) -> Self {
        Self {
            ingredient: Ingredient {
                id: r.ingredient_id,
                name: r.ingredient_name,
                category: IngredientCategory::parse(&r.ingredient_category),
                unit: r.default_unit,
                nutrition_per_100g: r.nutrition_per_100g.map(|j| j.0),
                storage_type: r.storage_type.as_deref().and_then(StorageType::parse),
                shelf_life_days: r.shelf_life_days,
            },
            quantity: r.quantity,
            unit: r.unit,
        }
    }
}
