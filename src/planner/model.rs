use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::dates::iso_date;
use crate::recipes::model::{MealType, Nutrition, Recipe, RecipeId};

/// Display attributes of a slot entry that has no catalog recipe behind it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealAttributes {
    pub name: String,
    pub cooking_time: i32,
    pub difficulty: i16,
    pub servings: i32,
    pub nutrition: Option<Nutrition>,
}

/// Synthetic entry: a fallback dish or a rest-day substitute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placeholder {
    /// Display id such as `fallback-dinner-3`; never a catalog id.
    pub id: String,
    #[serde(flatten)]
    pub attributes: MealAttributes,
}

/// Leftover reuse of a previous curry dinner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arrangement {
    /// Catalog recipe the arrangement was drawn from, if the catalog had one.
    pub recipe: Option<Recipe>,
    /// The curry dinner whose leftovers are reused.
    pub leftover_of: Option<RecipeId>,
    #[serde(flatten)]
    pub attributes: MealAttributes,
}

/// What fills one meal slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SlotEntry {
    Recipe(Recipe),
    Arrangement(Arrangement),
    Fallback(Placeholder),
    RestDay(Placeholder),
}

impl SlotEntry {
    pub fn name(&self) -> &str {
        match self {
            SlotEntry::Recipe(r) => &r.name,
            SlotEntry::Arrangement(a) => &a.attributes.name,
            SlotEntry::Fallback(p) | SlotEntry::RestDay(p) => &p.attributes.name,
        }
    }

    /// Catalog identity, present only for entries backed by a real recipe.
    pub fn catalog_id(&self) -> Option<&RecipeId> {
        self.recipe().map(|r| &r.id)
    }

    /// The catalog recipe behind this entry, if any.
    pub fn recipe(&self) -> Option<&Recipe> {
        match self {
            SlotEntry::Recipe(r) => Some(r),
            SlotEntry::Arrangement(a) => a.recipe.as_ref(),
            SlotEntry::Fallback(_) | SlotEntry::RestDay(_) => None,
        }
    }

    pub fn nutrition(&self) -> Option<Nutrition> {
        match self {
            SlotEntry::Recipe(r) => Some(r.nutrition),
            SlotEntry::Arrangement(a) => a.recipe.as_ref().map(|r| r.nutrition).or(a.attributes.nutrition),
            SlotEntry::Fallback(p) | SlotEntry::RestDay(p) => p.attributes.nutrition,
        }
    }

    pub fn cooking_time(&self) -> i32 {
        match self {
            SlotEntry::Recipe(r) => r.cooking_time,
            SlotEntry::Arrangement(a) => a.attributes.cooking_time,
            SlotEntry::Fallback(p) | SlotEntry::RestDay(p) => p.attributes.cooking_time,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, SlotEntry::Fallback(_))
    }

    pub fn is_rest_day(&self) -> bool {
        matches!(self, SlotEntry::RestDay(_))
    }

    pub fn is_arrangement(&self) -> bool {
        matches!(self, SlotEntry::Arrangement(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub breakfast: Option<SlotEntry>,
    pub lunch: Option<SlotEntry>,
    pub dinner: Option<SlotEntry>,
}

impl DayPlan {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            breakfast: None,
            lunch: None,
            dinner: None,
        }
    }

    pub fn slot(&self, meal_type: MealType) -> Option<&SlotEntry> {
        match meal_type {
            MealType::Breakfast => self.breakfast.as_ref(),
            MealType::Lunch => self.lunch.as_ref(),
            MealType::Dinner => self.dinner.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, meal_type: MealType) -> &mut Option<SlotEntry> {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
        }
    }

    /// Filled slots in breakfast, lunch, dinner order.
    pub fn entries(&self) -> impl Iterator<Item = (MealType, &SlotEntry)> {
        MealType::ALL
            .into_iter()
            .filter_map(move |m| self.slot(m).map(|e| (m, e)))
    }

    pub fn has_meals(&self) -> bool {
        self.entries().next().is_some()
    }
}

/// Caller-controlled knobs of one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub consider_seasonality: bool,
    pub avoid_recent_meals: bool,
    pub recent_meals_days: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
}

/// Seven consecutive days starting at `week_start_date`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyPlan {
    #[serde(with = "iso_date")]
    pub week_start_date: Date,
    pub plans: Vec<DayPlan>,
    pub settings: GenerationSettings,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    /// Generation wall time in milliseconds.
    pub total_time: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialDay {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub entry: Option<SlotEntry>,
}

/// One meal slot regenerated across the week.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialPlan {
    #[serde(with = "iso_date")]
    pub week_start_date: Date,
    pub meal_type: MealType,
    pub plans: Vec<PartialDay>,
    pub settings: GenerationSettings,
    #[serde(with = "time::serde::rfc3339")]
    pub generated_at: OffsetDateTime,
    pub total_time: u64,
}
