use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use sqlx::types::Json;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::{MealPlanStore, PreferencesStore, RecipeCatalog, ShoppingListStore};
use crate::dates::week_end;
use crate::nutrition::repo_types::NutritionTarget;
use crate::planner::repo_types::{MealPlanRecord, NewMealPlanRecord, SlotUpdate};
use crate::preferences::repo_types::UserPreferences;
use crate::recipes::model::{MealType, Nutrition, Recipe, RecipeId};
use crate::shopping::repo_types::{
    NewShoppingList, ShoppingItem, ShoppingItemUpdate, ShoppingList, ShoppingListRow,
};

#[derive(Default)]
struct Inner {
    recipes: Vec<Recipe>,
    preferences: HashMap<Uuid, UserPreferences>,
    targets: HashMap<Uuid, NutritionTarget>,
    weeks: HashMap<(Uuid, Date), Uuid>,
    records: HashMap<(Uuid, Date), MealPlanRecord>,
    shopping_lists: Vec<ShoppingList>,
}

/// In-memory stand-in for Postgres, mirroring its ordering and upsert rules.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipes(mut recipes: Vec<Recipe>) -> Self {
        recipes.sort_by(|a, b| a.name.cmp(&b.name));
        let store = Self::default();
        store.lock().recipes = recipes;
        store
    }

    /// Make every read fail, as if the database were down.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn preference_count(&self) -> usize {
        self.lock().preferences.len()
    }

    pub fn shopping_list_count(&self) -> usize {
        self.lock().shopping_lists.len()
    }

    pub fn has_recipe(&self, id: &RecipeId) -> bool {
        self.lock().recipes.iter().any(|r| &r.id == id)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    fn read(&self) -> anyhow::Result<MutexGuard<'_, Inner>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            anyhow::bail!("storage unavailable");
        }
        Ok(self.lock())
    }
}

fn empty_record(user_id: Uuid, date: Date) -> MealPlanRecord {
    MealPlanRecord {
        id: Uuid::new_v4(),
        user_id,
        date,
        breakfast_id: None,
        lunch_id: None,
        dinner_id: None,
        is_generated: false,
        generation_settings: None,
        user_rating: None,
        notes: None,
        weekly_meal_plan_id: None,
    }
}

fn slot_mut(record: &mut MealPlanRecord, meal_type: MealType) -> &mut Option<String> {
    match meal_type {
        MealType::Breakfast => &mut record.breakfast_id,
        MealType::Lunch => &mut record.lunch_id,
        MealType::Dinner => &mut record.dinner_id,
    }
}

fn in_range(date: Date, from: Date, to: Date) -> bool {
    from <= date && date <= to
}

#[async_trait]
impl PreferencesStore for MemoryStore {
    async fn find_preferences(&self, user_id: Uuid) -> anyhow::Result<Option<UserPreferences>> {
        Ok(self.read()?.preferences.get(&user_id).cloned())
    }

    async fn insert_preferences_if_absent(
        &self,
        prefs: &UserPreferences,
    ) -> anyhow::Result<UserPreferences> {
        let mut inner = self.lock();
        Ok(inner
            .preferences
            .entry(prefs.user_id)
            .or_insert_with(|| prefs.clone())
            .clone())
    }

    async fn upsert_preferences(&self, prefs: &UserPreferences) -> anyhow::Result<UserPreferences> {
        self.lock().preferences.insert(prefs.user_id, prefs.clone());
        Ok(prefs.clone())
    }

    async fn find_nutrition_target(&self, user_id: Uuid) -> anyhow::Result<Option<NutritionTarget>> {
        Ok(self.read()?.targets.get(&user_id).cloned())
    }

    async fn insert_nutrition_target_if_absent(
        &self,
        target: &NutritionTarget,
    ) -> anyhow::Result<NutritionTarget> {
        let mut inner = self.lock();
        Ok(inner
            .targets
            .entry(target.user_id)
            .or_insert_with(|| target.clone())
            .clone())
    }
}

#[async_trait]
impl RecipeCatalog for MemoryStore {
    async fn all_recipes(&self) -> anyhow::Result<Vec<Recipe>> {
        Ok(self.read()?.recipes.clone())
    }

    async fn recipes_by_category(
        &self,
        category: MealType,
        exclude_ids: &HashSet<RecipeId>,
    ) -> anyhow::Result<Vec<Recipe>> {
        Ok(self
            .read()?
            .recipes
            .iter()
            .filter(|r| r.category == category && !exclude_ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn recipes_by_name_or_tag(&self, patterns: &[&str]) -> anyhow::Result<Vec<Recipe>> {
        Ok(self
            .read()?
            .recipes
            .iter()
            .filter(|r| patterns.iter().any(|p| r.mentions(p)))
            .cloned()
            .collect())
    }

    async fn recipes_by_ids(&self, ids: &[RecipeId]) -> anyhow::Result<Vec<Recipe>> {
        Ok(self
            .read()?
            .recipes
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl MealPlanStore for MemoryStore {
    async fn recipe_ids_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<HashSet<RecipeId>> {
        Ok(self
            .read()?
            .records
            .values()
            .filter(|r| r.user_id == user_id && in_range(r.date, from, to))
            .flat_map(|r| r.slot_ids().collect::<Vec<_>>())
            .collect())
    }

    async fn records_between(
        &self,
        user_id: Uuid,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<MealPlanRecord>> {
        let mut records: Vec<MealPlanRecord> = self
            .read()?
            .records
            .values()
            .filter(|r| r.user_id == user_id && in_range(r.date, from, to))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.date);
        Ok(records)
    }

    async fn weekly_plan_id(&self, user_id: Uuid, week_start: Date) -> anyhow::Result<Option<Uuid>> {
        Ok(self.read()?.weeks.get(&(user_id, week_start)).copied())
    }

    async fn replace_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        records: &[NewMealPlanRecord],
        _total_nutrition: &Nutrition,
    ) -> anyhow::Result<Uuid> {
        let mut inner = self.lock();
        let end = week_end(week_start);
        inner
            .records
            .retain(|(user, date), _| *user != user_id || !in_range(*date, week_start, end));

        let weekly_id = Uuid::new_v4();
        inner.weeks.insert((user_id, week_start), weekly_id);
        for r in records {
            let record = MealPlanRecord {
                breakfast_id: r.breakfast_id.clone().map(|id| id.0),
                lunch_id: r.lunch_id.clone().map(|id| id.0),
                dinner_id: r.dinner_id.clone().map(|id| id.0),
                is_generated: true,
                generation_settings: r.generation_settings.clone().map(Json),
                weekly_meal_plan_id: Some(weekly_id),
                ..empty_record(user_id, r.date)
            };
            inner.records.insert((user_id, r.date), record);
        }
        Ok(weekly_id)
    }

    async fn update_slot_for_week(
        &self,
        user_id: Uuid,
        week_start: Date,
        meal_type: MealType,
        updates: &[SlotUpdate],
        settings: &serde_json::Value,
    ) -> anyhow::Result<()> {
        let mut inner = self.lock();
        let weekly_id = *inner
            .weeks
            .entry((user_id, week_start))
            .or_insert_with(Uuid::new_v4);
        for u in updates {
            let record = inner
                .records
                .entry((user_id, u.date))
                .or_insert_with(|| empty_record(user_id, u.date));
            *slot_mut(record, meal_type) = u.recipe_id.clone().map(|id| id.0);
            record.is_generated = true;
            record.generation_settings = Some(Json(settings.clone()));
            record.weekly_meal_plan_id = Some(weekly_id);
        }
        Ok(())
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
        let mut inner = self.lock();
        let record = inner
            .records
            .entry((user_id, date))
            .or_insert_with(|| empty_record(user_id, date));
        *slot_mut(record, meal_type) = recipe_id.map(|id| id.0.clone());
        if rating.is_some() {
            record.user_rating = rating;
        }
        if let Some(notes) = notes {
            record.notes = Some(notes.to_string());
        }
        Ok(record.clone())
    }
}

#[async_trait]
impl ShoppingListStore for MemoryStore {
    async fn insert_shopping_list(&self, list: &NewShoppingList) -> anyhow::Result<ShoppingList> {
        let row = ShoppingListRow {
            id: Uuid::new_v4(),
            created_at: OffsetDateTime::now_utc(),
        };
        let item_ids = list.items.iter().map(|_| Uuid::new_v4()).collect();
        let saved = ShoppingList::from_saved(list, row, item_ids);
        self.lock().shopping_lists.push(saved.clone());
        Ok(saved)
    }

    async fn shopping_lists_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<ShoppingList>> {
        let inner = self.read()?;
        // insertion order breaks created_at ties
        Ok(inner
            .shopping_lists
            .iter()
            .rev()
            .filter(|l| l.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_shopping_list(&self, id: Uuid) -> anyhow::Result<Option<ShoppingList>> {
        let inner = self.read()?;
        Ok(inner.shopping_lists.iter().find(|l| l.id == id).cloned())
    }

    async fn update_shopping_item(
        &self,
        item_id: Uuid,
        update: &ShoppingItemUpdate,
    ) -> anyhow::Result<Option<ShoppingItem>> {
        let mut inner = self.lock();
        let item = inner
            .shopping_lists
            .iter_mut()
            .flat_map(|l| l.items.iter_mut())
            .find(|i| i.id == item_id);
        Ok(item.map(|item| {
            update.apply(item);
            item.clone()
        }))
    }

    async fn set_shopping_list_completed(&self, id: Uuid, is_completed: bool) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        match inner.shopping_lists.iter_mut().find(|l| l.id == id) {
            Some(list) => {
                list.is_completed = is_completed;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_shopping_list(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.lock();
        let before = inner.shopping_lists.len();
        inner.shopping_lists.retain(|l| l.id != id);
        Ok(inner.shopping_lists.len() < before)
    }
}
