//! Repository seams between the domain code and the database.
//!
//! Services are generic over these traits (`S: RecipeCatalog + ?Sized`) so
//! the same code runs against [`postgres::PgStore`] in production and the
//! in-memory store in tests.

use std::collections::HashSet;

use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::nutrition::repo_types::NutritionTarget;
use crate::planner::repo_types::{MealPlanRecord, NewMealPlanRecord, SlotUpdate};
use crate::preferences::repo_types::UserPreferences;
use crate::recipes::model::{MealType, Nutrition, Recipe, RecipeId};
use crate::shopping::repo_types::{NewShoppingList, ShoppingItem, ShoppingItemUpdate, ShoppingList};

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn find_preferences(&self, user_id: Uuid) -> anyhow::Result<Option<UserPreferences>>;

    /// Insert `prefs` unless a row already exists; returns the stored row either way.
    async fn insert_preferences_if_absent(
        &self,
        prefs: &UserPreferences,
    ) -> anyhow::Result<UserPreferences>;

    async fn upsert_preferences(&self, prefs: &UserPreferences) -> anyhow::Result<UserPreferences>;

    async fn find_nutrition_target(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionTarget>>;

    async fn insert_nutrition_target_if_absent(
        &self,
        target: &NutritionTarget,
    ) -> anyhow::Result<NutritionTarget>;
}

#[async_trait]
pub trait RecipeCatalog: Send + Sync {
    async fn all_recipes(&self) -> anyhow::Result<Vec<Recipe>>;

    async fn recipes_by_category(
        &self,
        category: MealType,
        exclude_ids: &HashSet<RecipeId>,
    ) -> anyhow::Result<Vec<Recipe>>;

    async fn recipes_by_name_or_tag(&self, patterns: &[&str]) -> anyhow::Result<Vec<Recipe>>;

    async fn recipes_by_ids(&self, ids: &[RecipeId]) -> anyhow::Result<Vec<Recipe>>;
}

#[async_trait]
pub trait MealPlanStore: Send + Sync {
    /// Non-null slot ids of every record dated within `[from, to]`.
    async fn recipe_ids_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<HashSet<RecipeId>>;

    /// Records dated within `[from, to]`, ordered by date.
    async fn records_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<MealPlanRecord>>;

    async fn weekly_plan_id(&self, user_id: Uuid, week_start: Date) -> anyhow::Result<Option<Uuid>>;

    /// In one transaction: drop the week's records and summary, then write
    /// a fresh summary and `records`. Returns the new summary id.
    async fn replace_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        records: &[NewMealPlanRecord],
        total_nutrition: &Nutrition,
    ) -> anyhow::Result<Uuid>;

    /// In one transaction: rewrite a single slot on each listed day, keeping
    /// the other two slots of existing records.
    async fn update_slot_for_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        meal_type: MealType,
        updates: &[SlotUpdate],
        settings: &serde_json::Value,
    ) -> anyhow::Result<()>;

    /// Manual edit of one slot on one day, creating the record if needed.
    async fn set_slot(
        &self,
        user_id: Uuid,
        date: Date,
        meal_type: MealType,
        recipe_id: Option<&RecipeId>,
        rating: Option<i16>,
        notes: Option<&str>,
    ) -> anyhow::Result<MealPlanRecord>;
}

#[async_trait]
pub trait ShoppingListStore: Send + Sync {
    async fn insert_shopping_list(&self, list: &NewShoppingList) -> anyhow::Result<ShoppingList>;

    /// Newest first, items in stored order.
    async fn shopping_lists_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ShoppingList>>;

    async fn find_shopping_list(&self, id: Uuid) -> anyhow::Result<Option<ShoppingList>>;

    /// `None` when no item has that id.
    async fn update_shopping_item(
        &self,
        item_id: Uuid,
        update: &ShoppingItemUpdate,
    ) -> anyhow::Result<Option<ShoppingItem>>;

    /// False when no list has that id.
    async fn set_shopping_list_completed(&self, id: Uuid, is_completed: bool) -> anyhow::Result<bool>;

    /// Removes the list and its items. False when no list has that id.
    async fn delete_shopping_list(&self, id: Uuid) -> anyhow::Result<bool>;
}

/// Everything the HTTP layer needs from storage.
pub trait Store: PreferencesStore + RecipeCatalog + MealPlanStore + ShoppingListStore {}

impl<T> Store for T where T: PreferencesStore + RecipeCatalog + MealPlanStore + ShoppingListStore {}
