use serde::Serialize;
use sqlx::{types::Json, FromRow};
use time::Date;
use uuid::Uuid;

use crate::dates::iso_date;
use crate::recipes::model::{MealType, RecipeId};

/// One stored day of a user's plan.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub breakfast_id: Option<String>,
    pub lunch_id: Option<String>,
    pub dinner_id: Option<String>,
    pub is_generated: bool,
    pub generation_settings: Option<Json<serde_json::Value>>,
    pub user_rating: Option<i16>,
    pub notes: Option<String>,
    pub weekly_meal_plan_id: Option<Uuid>,
}

impl MealPlanRecord {
    pub fn slot_id(&self, meal_type: MealType) -> Option<RecipeId> {
        let id = match meal_type {
            MealType::Breakfast => &self.breakfast_id,
            MealType::Lunch => &self.lunch_id,
            MealType::Dinner => &self.dinner_id,
        };
        id.as_deref().map(RecipeId::new)
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = RecipeId> + '_ {
        MealType::ALL.into_iter().filter_map(|m| self.slot_id(m))
    }
}

/// A day to write when replacing a week. Slot ids are already validated.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMealPlanRecord {
    pub date: Date,
    pub breakfast_id: Option<RecipeId>,
    pub lunch_id: Option<RecipeId>,
    pub dinner_id: Option<RecipeId>,
    pub generation_settings: Option<serde_json::Value>,
}

/// New value of a single slot on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotUpdate {
    pub date: Date,
    pub recipe_id: Option<RecipeId>,
}
