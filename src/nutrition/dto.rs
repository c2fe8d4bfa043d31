use serde::{Deserialize, Serialize};
use time::Date;

use super::repo_types::NutritionTarget;
use super::services::{NutrientComparison, NutritionSummary};
use crate::dates::iso_date;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionQuery {
    pub user_id: Option<uuid::Uuid>,
    pub week_start_date: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyNutritionReport {
    #[serde(with = "iso_date")]
    pub week_start_date: Date,
    #[serde(flatten)]
    pub summary: NutritionSummary,
    pub target: NutritionTarget,
    pub comparison: Vec<NutrientComparison>,
}
