use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Household dietary profile, one row per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub user_id: Uuid,
    pub family_size: i32,
    pub has_children: bool,
    pub has_elderly: bool,
    pub allows_curry_two_days: bool,
    pub eats_breakfast_bread: bool,
    pub eats_granola_or_cereal: bool,
    pub wants_rest_days: bool,
    pub uses_frozen_foods: bool,
    pub uses_prepared_foods: bool,
    /// Free-text allergen substrings.
    pub allergies: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl UserPreferences {
    /// Profile created on first access.
    pub fn defaults_for(user_id: Uuid) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            user_id,
            family_size: 2,
            has_children: false,
            has_elderly: false,
            allows_curry_two_days: true,
            eats_breakfast_bread: true,
            eats_granola_or_cereal: false,
            wants_rest_days: true,
            uses_frozen_foods: true,
            uses_prepared_foods: true,
            allergies: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn wants_breakfast(&self) -> bool {
        self.eats_breakfast_bread || self.eats_granola_or_cereal
    }
}
