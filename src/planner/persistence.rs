use lazy_static::lazy_static;
use regex::Regex;
use tracing::warn;

use super::model::{DayPlan, GenerationSettings, PartialDay, SlotEntry};
use super::repo_types::{NewMealPlanRecord, SlotUpdate};
use crate::recipes::model::{MealType, RecipeId};

/// False for ids minted by the planner itself, which must never reach a
/// foreign-key column.
pub fn is_valid_recipe_id(id: &str) -> bool {
    lazy_static! {
        static ref SYNTHETIC_ID_RE: Regex =
            Regex::new(r"^(fallback|error|rest-day|arrangement)-").unwrap();
    }
    !id.trim().is_empty() && !SYNTHETIC_ID_RE.is_match(id)
}

/// Id to store for a slot: the catalog id, or `None` for synthetic entries.
pub fn persistable_id(entry: Option<&SlotEntry>) -> Option<RecipeId> {
    let id = entry?.catalog_id()?;
    if is_valid_recipe_id(id.as_str()) {
        Some(id.clone())
    } else {
        warn!(recipe_id = %id, "refusing to persist synthetic recipe id");
        None
    }
}

pub fn day_record(day: &DayPlan, settings: &GenerationSettings) -> NewMealPlanRecord {
    NewMealPlanRecord {
        date: day.date,
        breakfast_id: persistable_id(day.slot(MealType::Breakfast)),
        lunch_id: persistable_id(day.slot(MealType::Lunch)),
        dinner_id: persistable_id(day.slot(MealType::Dinner)),
        generation_settings: serde_json::to_value(settings).ok(),
    }
}

pub fn slot_update(day: &PartialDay) -> SlotUpdate {
    SlotUpdate {
        date: day.date,
        recipe_id: persistable_id(day.entry.as_ref()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::model::{MealAttributes, Placeholder};
    use crate::test_support::recipe;
    use time::macros::date;

    #[test]
    fn synthetic_prefixes_are_rejected() {
        for id in ["fallback-dinner-0", "error-1", "rest-day-3", "arrangement-2", "", "  "] {
            assert!(!is_valid_recipe_id(id), "{id:?}");
        }
        for id in ["beef-curry", "c1a2b3", "my-fallback-dish"] {
            assert!(is_valid_recipe_id(id), "{id}");
        }
    }

    #[test]
    fn day_record_nulls_placeholder_slots() {
        let mut day = DayPlan::empty(date!(2024 - 05 - 13));
        day.lunch = Some(SlotEntry::Recipe(recipe("l1", "焼きそば", MealType::Lunch, &[])));
        day.dinner = Some(SlotEntry::Fallback(Placeholder {
            id: "fallback-dinner-0".into(),
            attributes: MealAttributes {
                name: "簡単炒め物".into(),
                cooking_time: 15,
                difficulty: 1,
                servings: 2,
                nutrition: None,
            },
        }));
        let settings = GenerationSettings {
            consider_seasonality: true,
            avoid_recent_meals: true,
            recent_meals_days: 14,
            meal_type: None,
        };
        let record = day_record(&day, &settings);
        assert_eq!(record.breakfast_id, None);
        assert_eq!(record.lunch_id, Some(RecipeId::new("l1")));
        assert_eq!(record.dinner_id, None);
        assert_eq!(record.generation_settings.unwrap()["recentMealsDays"], 14);
    }

    #[test]
    fn catalog_recipe_with_synthetic_looking_id_is_refused() {
        let bogus = SlotEntry::Recipe(recipe("rest-day-1", "x", MealType::Dinner, &[]));
        assert_eq!(persistable_id(Some(&bogus)), None);
        assert_eq!(persistable_id(None), None);
    }
}
