use serde::Serialize;
use time::Date;
use tracing::{debug, info};
use uuid::Uuid;

use super::dto::WeeklyNutritionReport;
use super::repo_types::NutritionTarget;
use crate::dates::iso_date;
use crate::error::PlanError;
use crate::planner::model::{DayPlan, SlotEntry};
use crate::planner::resolve;
use crate::recipes::model::Nutrition;
use crate::storage::{MealPlanStore, PreferencesStore, RecipeCatalog};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyNutrition {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub meal_count: usize,
    pub total: Nutrition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionSummary {
    pub daily: Vec<DailyNutrition>,
    pub total: Nutrition,
    /// Per day, over days that have at least one meal.
    pub average: Nutrition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientComparison {
    pub nutrient: &'static str,
    pub actual: f64,
    pub target: f64,
    /// `actual / target`, 0 when the target is 0.
    pub ratio: f64,
}

/// Rest days are store-bought and carry no estimate.
fn entry_nutrition(entry: &SlotEntry) -> Option<Nutrition> {
    match entry {
        SlotEntry::RestDay(_) => None,
        other => other.nutrition(),
    }
}

pub fn summarize(days: &[DayPlan]) -> NutritionSummary {
    let daily: Vec<DailyNutrition> = days
        .iter()
        .map(|day| DailyNutrition {
            date: day.date,
            meal_count: day.entries().count(),
            total: day
                .entries()
                .filter_map(|(_, e)| entry_nutrition(e))
                .fold(Nutrition::default(), |acc, n| acc + n),
        })
        .collect();

    let total = daily.iter().fold(Nutrition::default(), |acc, d| acc + d.total);
    let days_with_meals = daily.iter().filter(|d| d.meal_count > 0).count().max(1);
    NutritionSummary {
        average: total.divided_by(days_with_meals as f64),
        daily,
        total,
    }
}

pub fn compare(average: &Nutrition, target: &Nutrition) -> Vec<NutrientComparison> {
    [
        ("calories", average.calories, target.calories),
        ("protein", average.protein, target.protein),
        ("fat", average.fat, target.fat),
        ("carbohydrates", average.carbohydrates, target.carbohydrates),
        ("fiber", average.fiber, target.fiber),
        ("sodium", average.sodium, target.sodium),
    ]
    .into_iter()
    .map(|(nutrient, actual, target)| NutrientComparison {
        nutrient,
        actual,
        target,
        ratio: if target > 0.0 { actual / target } else { 0.0 },
    })
    .collect()
}

/// The user's target, creating the default one on first access.
pub async fn resolve_target<S>(store: &S, user_id: Uuid) -> anyhow::Result<NutritionTarget>
where
    S: PreferencesStore + ?Sized,
{
    if let Some(target) = store.find_nutrition_target(user_id).await? {
        return Ok(target);
    }
    let created = store
        .insert_nutrition_target_if_absent(&NutritionTarget::defaults_for(user_id))
        .await?;
    info!(%user_id, "created default nutrition target");
    Ok(created)
}

pub async fn weekly_report<S>(
    store: &S,
    user_id: Uuid,
    week_start: Date,
) -> Result<WeeklyNutritionReport, PlanError>
where
    S: PreferencesStore + RecipeCatalog + MealPlanStore + ?Sized,
{
    let (week, target) = tokio::try_join!(
        resolve::load_week(store, user_id, week_start),
        resolve_target(store, user_id),
    )?;
    let summary = summarize(&week.days);
    let comparison = compare(&summary.average, &target.daily());
    debug!(%user_id, %week_start, calories = summary.average.calories, "weekly nutrition computed");
    Ok(WeeklyNutritionReport {
        week_start_date: week_start,
        summary,
        target,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::model::{MealAttributes, Placeholder};
    use crate::planner::repo_types::NewMealPlanRecord;
    use crate::recipes::model::{MealType, RecipeId};
    use crate::storage::memory::MemoryStore;
    use crate::test_support::recipe;
    use time::macros::date;

    fn with_calories(id: &str, category: MealType, calories: f64) -> crate::recipes::model::Recipe {
        let mut r = recipe(id, id, category, &[]);
        r.nutrition = Nutrition {
            calories,
            protein: calories / 20.0,
            ..Default::default()
        };
        r
    }

    fn placeholder(id: &str, nutrition: Option<Nutrition>) -> Placeholder {
        Placeholder {
            id: id.into(),
            attributes: MealAttributes {
                name: id.into(),
                cooking_time: 5,
                difficulty: 1,
                servings: 2,
                nutrition,
            },
        }
    }

    #[test]
    fn average_counts_only_days_with_meals() {
        let mut days: Vec<DayPlan> = crate::dates::week_dates(date!(2024 - 05 - 13))
            .into_iter()
            .map(DayPlan::empty)
            .collect();
        days[0].lunch = Some(SlotEntry::Recipe(with_calories("a", MealType::Lunch, 600.0)));
        days[0].dinner = Some(SlotEntry::Recipe(with_calories("b", MealType::Dinner, 800.0)));
        days[1].dinner = Some(SlotEntry::Fallback(placeholder(
            "fallback-dinner-1",
            Some(Nutrition { calories: 400.0, ..Default::default() }),
        )));
        days[2].dinner = Some(SlotEntry::RestDay(placeholder("rest-day-2", None)));

        let summary = summarize(&days);
        assert_eq!(summary.daily[0].total.calories, 1400.0);
        assert_eq!(summary.daily[1].total.calories, 400.0);
        assert_eq!(summary.daily[2].total.calories, 0.0);
        assert_eq!(summary.daily[2].meal_count, 1);
        assert_eq!(summary.total.calories, 1800.0);
        // three days carry a meal
        assert_eq!(summary.average.calories, 600.0);
    }

    #[test]
    fn empty_week_averages_to_zero() {
        let summary = summarize(&[DayPlan::empty(date!(2024 - 05 - 13))]);
        assert_eq!(summary.average, Nutrition::default());
    }

    #[test]
    fn comparison_reports_ratios() {
        let average = Nutrition { calories: 1100.0, protein: 65.0, ..Default::default() };
        let target = NutritionTarget::defaults_for(Uuid::new_v4()).daily();
        let rows = compare(&average, &target);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].nutrient, "calories");
        assert_eq!(rows[0].ratio, 0.5);
        assert_eq!(rows[1].ratio, 1.0);
        let zero = compare(&average, &Nutrition::default());
        assert!(zero.iter().all(|r| r.ratio == 0.0));
    }

    #[tokio::test]
    async fn weekly_report_reads_stored_week_and_default_target() {
        let store = MemoryStore::with_recipes(vec![with_calories("d1", MealType::Dinner, 700.0)]);
        let user = Uuid::new_v4();
        let start = date!(2024 - 05 - 13);
        store
            .replace_week(
                user,
                start,
                &[NewMealPlanRecord {
                    date: start,
                    breakfast_id: None,
                    lunch_id: None,
                    dinner_id: Some(RecipeId::new("d1")),
                    generation_settings: None,
                }],
                &Nutrition::default(),
            )
            .await
            .unwrap();

        let report = weekly_report(&store, user, start).await.unwrap();
        assert_eq!(report.summary.total.calories, 700.0);
        assert_eq!(report.summary.average.calories, 700.0);
        assert_eq!(report.target.daily_calories, 2200.0);
        assert_eq!(resolve_target(&store, user).await.unwrap(), report.target);
    }
}
