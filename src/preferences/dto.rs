use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesQuery {
    pub user_id: Option<Uuid>,
}

/// Full settings form; every flag is replaced.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub user_id: Option<Uuid>,
    #[serde(default = "default_family_size")]
    pub family_size: i32,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub has_elderly: bool,
    #[serde(default)]
    pub allows_curry_two_days: bool,
    #[serde(default)]
    pub eats_breakfast_bread: bool,
    #[serde(default)]
    pub eats_granola_or_cereal: bool,
    #[serde(default)]
    pub wants_rest_days: bool,
    #[serde(default)]
    pub uses_frozen_foods: bool,
    #[serde(default)]
    pub uses_prepared_foods: bool,
    #[serde(default)]
    pub allergies: Vec<String>,
}
fn default_family_size() -> i32 {
    2
}
