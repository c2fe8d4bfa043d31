use std::collections::HashMap;

use time::Date;
use tracing::warn;
use uuid::Uuid;

use super::model::{DayPlan, SlotEntry};
use super::repo_types::MealPlanRecord;
use crate::dates::{week_dates, week_end};
use crate::recipes::model::{MealType, Recipe, RecipeId};
use crate::storage::{MealPlanStore, RecipeCatalog};

/// A persisted week joined with the catalog.
#[derive(Debug, Clone)]
pub struct StoredWeek {
    pub days: Vec<DayPlan>,
    pub records: Vec<MealPlanRecord>,
}

/// Load the seven stored days starting at `week_start`. Days without a
/// record come back empty; ids no longer in the catalog are dropped.
pub async fn load_week<S>(store: &S, user_id: Uuid, week_start: Date) -> anyhow::Result<StoredWeek>
where
    S: MealPlanStore + RecipeCatalog + ?Sized,
{
    let records = store
        .records_between(user_id, week_start, week_end(week_start))
        .await?;

    let mut ids: Vec<RecipeId> = records.iter().flat_map(|r| r.slot_ids()).collect();
    ids.sort();
    ids.dedup();
    let recipes: HashMap<RecipeId, Recipe> = store
        .recipes_by_ids(&ids)
        .await?
        .into_iter()
        .map(|r| (r.id.clone(), r))
        .collect();

    Ok(StoredWeek {
        days: resolve_days(week_start, &records, &recipes),
        records,
    })
}

pub fn resolve_days(
    week_start: Date,
    records: &[MealPlanRecord],
    recipes: &HashMap<RecipeId, Recipe>,
) -> Vec<DayPlan> {
    let by_date: HashMap<Date, &MealPlanRecord> = records.iter().map(|r| (r.date, r)).collect();
    week_dates(week_start)
        .into_iter()
        .map(|date| {
            let mut day = DayPlan::empty(date);
            let Some(record) = by_date.get(&date) else {
                return day;
            };
            for meal_type in MealType::ALL {
                let Some(id) = record.slot_id(meal_type) else {
                    continue;
                };
                match recipes.get(&id) {
                    Some(recipe) => *day.slot_mut(meal_type) = Some(SlotEntry::Recipe(recipe.clone())),
                    None => warn!(%date, %meal_type, recipe_id = %id, "stored recipe missing from catalog"),
                }
            }
            day
        })
        .collect()
}
