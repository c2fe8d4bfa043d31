use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::PgPool;
use time::Date;
use uuid::Uuid;

use super::{MealPlanStore, PreferencesStore, RecipeCatalog, ShoppingListStore};
use crate::nutrition::{self, repo_types::NutritionTarget};
use crate::planner::{self, repo_types::{MealPlanRecord, NewMealPlanRecord, SlotUpdate}};
use crate::preferences::{self, repo_types::UserPreferences};
use crate::recipes::{self, model::{MealType, Nutrition, Recipe, RecipeId}};
use crate::shopping::{
    self,
    repo_types::{NewShoppingList, ShoppingItem, ShoppingItemUpdate, ShoppingList},
};

/// Postgres-backed store; every call delegates to a feature `repo` module.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn raw_ids(ids: impl IntoIterator<Item = RecipeId>) -> Vec<String> {
    ids.into_iter().map(|id| id.0).collect()
}

#[async_trait]
impl PreferencesStore for PgStore {
    async fn find_preferences(&self, user_id: Uuid) -> anyhow::Result<Option<UserPreferences>> {
        preferences::repo::find_by_user(&self.pool, user_id).await
    }

    async fn insert_preferences_if_absent(
        &self,
        prefs: &UserPreferences,
    ) -> anyhow::Result<UserPreferences> {
        preferences::repo::insert_if_absent(&self.pool, prefs).await
    }

    async fn upsert_preferences(&self, prefs: &UserPreferences) -> anyhow::Result<UserPreferences> {
        preferences::repo::upsert(&self.pool, prefs).await
    }

    async fn find_nutrition_target(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionTarget>> {
        nutrition::repo::find_by_user(&self.pool, user_id).await
    }

    async fn insert_nutrition_target_if_absent(
        &self,
        target: &NutritionTarget,
    ) -> anyhow::Result<NutritionTarget> {
        nutrition::repo::insert_if_absent(&self.pool, target).await
    }
}

#[async_trait]
impl RecipeCatalog for PgStore {
    async fn all_recipes(&self) -> anyhow::Result<Vec<Recipe>> {
        recipes::repo::list_all(&self.pool).await
    }

    async fn recipes_by_category(
        &self,
        category: MealType,
        exclude_ids: &HashSet<RecipeId>,
    ) -> anyhow::Result<Vec<Recipe>> {
        let exclude = raw_ids(exclude_ids.iter().cloned());
        recipes::repo::list_by_category(&self.pool, category, &exclude).await
    }

    async fn recipes_by_name_or_tag(&self, patterns: &[&str]) -> anyhow::Result<Vec<Recipe>> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        recipes::repo::list_by_name_or_tag(&self.pool, &patterns).await
    }

    async fn recipes_by_ids(&self, ids: &[RecipeId]) -> anyhow::Result<Vec<Recipe>> {
        recipes::repo::list_by_ids(&self.pool, &raw_ids(ids.iter().cloned())).await
    }
}

#[async_trait]
impl MealPlanStore for PgStore {
    async fn recipe_ids_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<HashSet<RecipeId>> {
        planner::repo::recipe_ids_between(&self.pool, user_id, from, to).await
    }

    async fn records_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<MealPlanRecord>> {
        planner::repo::records_between(&self.pool, user_id, from, to).await
    }

    async fn weekly_plan_id(&self, user_id: Uuid, week_start: Date) -> anyhow::Result<Option<Uuid>> {
        planner::repo::find_weekly_plan_id(&self.pool, user_id, week_start).await
    }

    async fn replace_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        records: &[NewMealPlanRecord],
        total_nutrition: &Nutrition,
    ) -> anyhow::Result<Uuid> {
        planner::repo::replace_week(&self.pool, user_id, week_start, records, total_nutrition).await
    }

    async fn update_slot_for_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        meal_type: MealType,
        updates: &[SlotUpdate],
        settings: &serde_json::Value,
    ) -> anyhow::Result<()> {
        planner::repo::update_slot_for_week(&self.pool, user_id, week_start, meal_type, updates, settings)
            .await
    }

    async fn set_slot(
        &self,
        user_id: Uuid,
        date: Date,
        meal_type: MealType,
        recipe_id: Option<&RecipeId>,
        rating: Option<i16>,
        notes: Option<&str>,
    ) -> anyhow::Result<MealPlanRecord> {
        planner::repo::set_slot(&self.pool, user_id, date, meal_type, recipe_id, rating, notes).await
    }
}

#[async_trait]
impl ShoppingListStore for PgStore {
    async fn insert_shopping_list(&self, list: &NewShoppingList) -> anyhow::Result<ShoppingList> {
        shopping::repo::insert(&self.pool, list).await
    }

    async fn shopping_lists_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ShoppingList>> {
        shopping::repo::list_by_user(&self.pool, user_id).await
    }

    async fn find_shopping_list(&self, id: Uuid) -> anyhow::Result<Option<ShoppingList>> {
        shopping::repo::find(&self.pool, id).await
    }

    async fn update_shopping_item(
        &self,
        item_id: Uuid,
        update: &ShoppingItemUpdate,
    ) -> anyhow::Result<Option<ShoppingItem>> {
        shopping::repo::update_item(&self.pool, item_id, update).await
    }

    async fn set_shopping_list_completed(&self, id: Uuid, is_completed: bool) -> anyhow::Result<bool> {
        shopping::repo::set_completed(&self.pool, id, is_completed).await
    }

    async fn delete_shopping_list(&self, id: Uuid) -> anyhow::Result<bool> {
        shopping::repo::delete(&self.pool, id).await
    }
}
