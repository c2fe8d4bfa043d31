//! Catalog fixtures shared by the unit tests.

use crate::recipes::model::{
    Ingredient, IngredientCategory, MealType, Nutrition, Recipe, RecipeId, RecipeIngredient,
};

/// Two-serving recipe with 100 g of each named ingredient.
pub fn recipe(id: &str, name: &str, category: MealType, ingredients: &[&str]) -> Recipe {
    Recipe {
        id: RecipeId::new(id),
        name: name.to_string(),
        category,
        cooking_time: 20,
        difficulty: 2,
        servings: 2,
        tags: Vec::new(),
        seasonality: Vec::new(),
        nutrition: Nutrition::default(),
        ingredients: ingredients
            .iter()
            .map(|n| RecipeIngredient {
                ingredient: Ingredient {
                    id: n.to_string(),
                    name: n.to_string(),
                    category: IngredientCategory::Others,
                    unit: "g".into(),
                    nutrition_per_100g: None,
                    storage_type: None,
                    shelf_life_days: None,
                },
                quantity: 100.0,
                unit: "g".into(),
            })
            .collect(),
    }
}

pub fn with_tags(mut recipe: Recipe, tags: &[&str]) -> Recipe {
    recipe.tags = tags.iter().map(|t| t.to_string()).collect();
    recipe
}
