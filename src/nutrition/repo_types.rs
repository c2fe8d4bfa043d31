use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::model::Nutrition;

/// Daily intake goals of a household, one row per user.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NutritionTarget {
    pub user_id: Uuid,
    pub daily_calories: f64,
    pub daily_protein: f64,
    pub daily_fat: f64,
    pub daily_carbohydrates: f64,
    pub daily_fiber: f64,
    pub daily_sodium: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl NutritionTarget {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            daily_calories: 2200.0,
            daily_protein: 65.0,
            daily_fat: 60.0,
            daily_carbohydrates: 320.0,
            daily_fiber: 20.0,
            daily_sodium: 7500.0,
            updated_at: OffsetDateTime::now_utc(),
        }
    }

    pub fn daily(&self) -> Nutrition {
        Nutrition {
            calories: self.daily_calories,
            protein: self.daily_protein,
            fat: self.daily_fat,
            carbohydrates: self.daily_carbohydrates,
            fiber: self.daily_fiber,
            sodium: self.daily_sodium,
        }
    }
}
