use serde::{Deserialize, Serialize};
use time::Date;
use uuid::Uuid;

use super::model::{DayPlan, GenerationSettings, PartialPlan, WeeklyPlan};
use crate::dates::{iso_date, parse_date, parse_week_start};
use crate::error::PlanError;
use crate::recipes::model::{MealType, RecipeId};

/// Longest recency window a request may ask for.
const MAX_RECENT_MEALS_DAYS: u32 = 365;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub user_id: Option<Uuid>,
    pub week_start_date: Option<String>,
    #[serde(default = "default_true")]
    pub consider_seasonality: bool,
    #[serde(default = "default_true")]
    pub avoid_recent_meals: bool,
    pub recent_meals_days: Option<u32>,
    /// Only read by the partial endpoint.
    pub meal_type: Option<String>,
}
fn default_true() -> bool {
    true
}

/// Validated input of a generation run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanRequest {
    pub user_id: Uuid,
    pub week_start: Date,
    pub settings: GenerationSettings,
}

impl GenerateRequest {
    pub fn validate(&self, default_recent_days: u32) -> Result<PlanRequest, PlanError> {
        let user_id = self
            .user_id
            .ok_or_else(|| PlanError::invalid("userId is required"))?;
        let week_start = parse_week_start(self.week_start_date.as_deref())?;
        let recent_meals_days = self.recent_meals_days.unwrap_or(default_recent_days);
        if recent_meals_days > MAX_RECENT_MEALS_DAYS {
            return Err(PlanError::invalid(format!(
                "recentMealsDays must be at most {MAX_RECENT_MEALS_DAYS}"
            )));
        }
        Ok(PlanRequest {
            user_id,
            week_start,
            settings: GenerationSettings {
                consider_seasonality: self.consider_seasonality,
                avoid_recent_meals: self.avoid_recent_meals,
                recent_meals_days,
                meal_type: None,
            },
        })
    }

    pub fn validate_partial(&self, default_recent_days: u32) -> Result<(PlanRequest, MealType), PlanError> {
        let meal_type = parse_meal_type(self.meal_type.as_deref())?;
        let mut req = self.validate(default_recent_days)?;
        req.settings.meal_type = Some(meal_type);
        Ok((req, meal_type))
    }
}

pub fn parse_meal_type(raw: Option<&str>) -> Result<MealType, PlanError> {
    let raw = raw
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| PlanError::invalid("mealType is required"))?;
    MealType::parse(raw)
        .ok_or_else(|| PlanError::invalid("mealType must be breakfast, lunch or dinner"))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub weekly_plan_id: Uuid,
    #[serde(flatten)]
    pub plan: WeeklyPlan,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialResponse {
    pub weekly_plan_id: Option<Uuid>,
    #[serde(flatten)]
    pub plan: PartialPlan,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekQuery {
    pub user_id: Option<Uuid>,
    pub week_start_date: Option<String>,
}

/// Stored week as shown to the household.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekView {
    #[serde(with = "iso_date")]
    pub week_start_date: Date,
    pub weekly_plan_id: Option<Uuid>,
    pub plans: Vec<DayPlan>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetSlotRequest {
    pub user_id: Option<Uuid>,
    pub date: Option<String>,
    pub meal_type: Option<String>,
    /// `null` clears the slot.
    pub recipe_id: Option<String>,
    pub rating: Option<i16>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotEdit {
    pub user_id: Uuid,
    pub date: Date,
    pub meal_type: MealType,
    pub recipe_id: Option<RecipeId>,
    pub rating: Option<i16>,
    pub notes: Option<String>,
}

impl SetSlotRequest {
    pub fn validate(self) -> Result<SlotEdit, PlanError> {
        let user_id = self
            .user_id
            .ok_or_else(|| PlanError::invalid("userId is required"))?;
        let date = match self.date.as_deref().filter(|s| !s.trim().is_empty()) {
            Some(raw) => parse_date(raw, "date")?,
            None => return Err(PlanError::invalid("date is required")),
        };
        let meal_type = parse_meal_type(self.meal_type.as_deref())?;
        if let Some(rating) = self.rating {
            if !(1..=5).contains(&rating) {
                return Err(PlanError::invalid("rating must be between 1 and 5"));
            }
        }
        Ok(SlotEdit {
            user_id,
            date,
            meal_type,
            recipe_id: self
                .recipe_id
                .map(|id| id.trim().to_string())
                .filter(|id| !id.is_empty())
                .map(RecipeId),
            rating: self.rating,
            notes: self.notes,
        })
    }
}
