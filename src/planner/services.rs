use std::collections::HashSet;
use std::time::Instant;

use time::{Date, OffsetDateTime};
use tracing::{debug, info};
use uuid::Uuid;

use super::catalog::{AllergyFilter, CatalogAccess, PrefetchedCatalog, QueryCatalog, RecipeSource};
use super::dto::{PlanRequest, SlotEdit, WeekView};
use super::engine::SelectionEngine;
use super::model::{DayPlan, PartialDay, PartialPlan, WeeklyPlan};
use super::persistence::{day_record, is_valid_recipe_id, slot_update};
use super::random::RandomSource;
use super::recency::recently_used_ids;
use super::repo_types::MealPlanRecord;
use super::resolve::load_week;
use crate::config::GenerationConfig;
use crate::dates::week_dates;
use crate::error::PlanError;
use crate::nutrition::services::summarize;
use crate::preferences::{repo_types::UserPreferences, services as preferences};
use crate::recipes::model::{MealType, Recipe, RecipeId, Season};
use crate::storage::{MealPlanStore, PreferencesStore, RecipeCatalog};

/// Everything a run reads before selection starts.
struct RunInputs {
    prefs: UserPreferences,
    recent: HashSet<RecipeId>,
    catalog: Option<Vec<Recipe>>,
}

/// Issue the independent reads concurrently. Any failure aborts the run.
async fn load_inputs<S>(
    store: &S,
    config: &GenerationConfig,
    req: &PlanRequest,
    today: Date,
) -> anyhow::Result<RunInputs>
where
    S: PreferencesStore + RecipeCatalog + MealPlanStore + ?Sized,
{
    let settings = req.settings;
    let recent = async {
        if settings.avoid_recent_meals {
            recently_used_ids(store, req.user_id, settings.recent_meals_days, today).await
        } else {
            Ok(HashSet::new())
        }
    };
    let catalog = async {
        match config.catalog_access {
            CatalogAccess::Bulk => store.all_recipes().await.map(Some),
            CatalogAccess::PerQuery => Ok(None),
        }
    };
    let (prefs, recent, catalog) =
        tokio::try_join!(preferences::resolve(store, req.user_id), recent, catalog)?;
    Ok(RunInputs {
        prefs,
        recent,
        catalog,
    })
}

fn recipe_source<'a, S>(store: &'a S, inputs: &mut RunInputs) -> Box<dyn RecipeSource + 'a>
where
    S: RecipeCatalog + ?Sized,
{
    let allergy = AllergyFilter::new(&inputs.prefs.allergies);
    match inputs.catalog.take() {
        Some(all) => Box::new(PrefetchedCatalog::new(all, &allergy)),
        None => Box::new(QueryCatalog::new(store, allergy)),
    }
}

fn season_of(req: &PlanRequest) -> Option<Season> {
    req.settings
        .consider_seasonality
        .then(|| Season::from_month(req.week_start.month()))
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Generate a full week. Nothing is persisted here.
pub async fn generate_weekly_plan<S>(
    store: &S,
    config: &GenerationConfig,
    req: &PlanRequest,
    rng: Box<dyn RandomSource>,
    today: Date,
) -> Result<WeeklyPlan, PlanError>
where
    S: PreferencesStore + RecipeCatalog + MealPlanStore + ?Sized,
{
    let started = Instant::now();
    let mut inputs = load_inputs(store, config, req, today).await?;
    let source = recipe_source(store, &mut inputs);

    let mut engine = SelectionEngine::new(
        source.as_ref(),
        &inputs.prefs,
        std::mem::take(&mut inputs.recent),
        season_of(req),
        config.engine_params(),
        rng,
    );
    let mut days: Vec<DayPlan> = week_dates(req.week_start).into_iter().map(DayPlan::empty).collect();
    engine.fill(&mut days, &MealType::ALL).await?;
    engine.inject_rest_days(&mut days);

    let stats = engine.stats();
    let total_time = elapsed_ms(started);
    info!(
        user_id = %req.user_id,
        week_start = %req.week_start,
        picked = stats.picked,
        relaxed = stats.relaxed,
        fallbacks = stats.fallbacks,
        arrangements = stats.arrangements,
        rest_days = stats.rest_days,
        elapsed_ms = total_time,
        "weekly plan generated"
    );
    Ok(WeeklyPlan {
        week_start_date: req.week_start,
        plans: days,
        settings: req.settings,
        generated_at: OffsetDateTime::now_utc(),
        total_time,
    })
}

/// Regenerate one slot across the stored week, keeping the other two slots
/// as context: their recipes count as used and a kept dinner can still
/// trigger the curry rule. Rest days apply only when regenerating dinner.
pub async fn generate_partial_plan<S>(
    store: &S,
    config: &GenerationConfig,
    req: &PlanRequest,
    meal_type: MealType,
    rng: Box<dyn RandomSource>,
    today: Date,
) -> Result<PartialPlan, PlanError>
where
    S: PreferencesStore + RecipeCatalog + MealPlanStore + ?Sized,
{
    let started = Instant::now();
    let (mut inputs, stored) = tokio::try_join!(
        load_inputs(store, config, req, today),
        load_week(store, req.user_id, req.week_start),
    )?;
    let source = recipe_source(store, &mut inputs);

    let mut days = stored.days;
    for day in &mut days {
        *day.slot_mut(meal_type) = None;
    }
    let kept: Vec<RecipeId> = days
        .iter()
        .flat_map(|d| d.entries())
        .filter_map(|(_, e)| e.catalog_id().cloned())
        .collect();

    let mut engine = SelectionEngine::new(
        source.as_ref(),
        &inputs.prefs,
        std::mem::take(&mut inputs.recent),
        season_of(req),
        config.engine_params(),
        rng,
    );
    engine.seed_used(kept);
    engine.fill(&mut days, &[meal_type]).await?;
    if meal_type == MealType::Dinner {
        engine.inject_rest_days(&mut days);
    }

    let stats = engine.stats();
    let total_time = elapsed_ms(started);
    info!(
        user_id = %req.user_id,
        week_start = %req.week_start,
        %meal_type,
        picked = stats.picked,
        fallbacks = stats.fallbacks,
        arrangements = stats.arrangements,
        rest_days = stats.rest_days,
        elapsed_ms = total_time,
        "partial plan generated"
    );
    Ok(PartialPlan {
        week_start_date: req.week_start,
        meal_type,
        plans: days
            .into_iter()
            .map(|d| PartialDay {
                date: d.date,
                entry: d.slot(meal_type).cloned(),
            })
            .collect(),
        settings: req.settings,
        generated_at: OffsetDateTime::now_utc(),
        total_time,
    })
}

/// Atomically replace the stored week with `plan`. Synthetic entries are
/// stored as empty slots. Concurrent saves for one user: last commit wins.
pub async fn save_weekly_plan<S>(store: &S, user_id: Uuid, plan: &WeeklyPlan) -> Result<Uuid, PlanError>
where
    S: MealPlanStore + ?Sized,
{
    let records: Vec<_> = plan.plans.iter().map(|d| day_record(d, &plan.settings)).collect();
    let total = summarize(&plan.plans).total;
    let weekly_id = store
        .replace_week(user_id, plan.week_start_date, &records, &total)
        .await?;
    debug!(%user_id, %weekly_id, days = records.len(), "weekly plan saved");
    Ok(weekly_id)
}

/// Write the regenerated slot day by day, leaving the other slots alone.
pub async fn save_partial_plan<S>(
    store: &S,
    user_id: Uuid,
    plan: &PartialPlan,
) -> Result<Option<Uuid>, PlanError>
where
    S: MealPlanStore + ?Sized,
{
    let updates: Vec<_> = plan.plans.iter().map(slot_update).collect();
    let settings = serde_json::to_value(plan.settings).unwrap_or_default();
    store
        .update_slot_for_week(user_id, plan.week_start_date, plan.meal_type, &updates, &settings)
        .await?;
    let weekly_id = store.weekly_plan_id(user_id, plan.week_start_date).await?;
    debug!(%user_id, meal_type = %plan.meal_type, "partial plan saved");
    Ok(weekly_id)
}

pub async fn view_week<S>(store: &S, user_id: Uuid, week_start: Date) -> Result<WeekView, PlanError>
where
    S: MealPlanStore + RecipeCatalog + ?Sized,
{
    let (week, weekly_plan_id) = tokio::try_join!(
        load_week(store, user_id, week_start),
        store.weekly_plan_id(user_id, week_start),
    )?;
    Ok(WeekView {
        week_start_date: week_start,
        weekly_plan_id,
        plans: week.days,
    })
}

/// Manual edit of one slot. The recipe must exist in the catalog.
pub async fn set_slot<S>(store: &S, edit: SlotEdit) -> Result<MealPlanRecord, PlanError>
where
    S: MealPlanStore + RecipeCatalog + ?Sized,
{
    if let Some(id) = &edit.recipe_id {
        let known = is_valid_recipe_id(id.as_str())
            && !store.recipes_by_ids(std::slice::from_ref(id)).await?.is_empty();
        if !known {
            return Err(PlanError::invalid(format!("unknown recipeId: {id}")));
        }
    }
    let record = store
        .set_slot(
            edit.user_id,
            edit.date,
            edit.meal_type,
            edit.recipe_id.as_ref(),
            edit.rating,
            edit.notes.as_deref(),
        )
        .await?;
    info!(user_id = %edit.user_id, date = %edit.date, meal_type = %edit.meal_type, "meal slot updated");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::model::{GenerationSettings, SlotEntry};
    use crate::planner::random::{ScriptedRandom, StdRandom};
    use crate::planner::repo_types::NewMealPlanRecord;
    use crate::recipes::model::Nutrition;
    use crate::storage::memory::MemoryStore;
    use crate::test_support::{recipe, with_tags};
    use time::macros::date;

    const START: Date = date!(2024 - 05 - 13);
    const TODAY: Date = date!(2024 - 05 - 10);

    fn request(user_id: Uuid) -> PlanRequest {
        PlanRequest {
            user_id,
            week_start: START,
            settings: GenerationSettings {
                consider_seasonality: true,
                avoid_recent_meals: true,
                recent_meals_days: 14,
                meal_type: None,
            },
        }
    }

    fn catalog(n: usize) -> Vec<Recipe> {
        let mut all = Vec::new();
        for category in MealType::ALL {
            for i in 0..n {
                let id = format!("{category}-{i}");
                all.push(recipe(&id, &id, category, &["米"]));
            }
        }
        all
    }

    async fn quiet_user(store: &MemoryStore) -> Uuid {
        let user = Uuid::new_v4();
        let prefs = UserPreferences {
            wants_rest_days: false,
            allows_curry_two_days: false,
            ..UserPreferences::defaults_for(user)
        };
        store.upsert_preferences(&prefs).await.unwrap();
        user
    }

    fn ids_of(plan: &WeeklyPlan) -> Vec<RecipeId> {
        plan.plans
            .iter()
            .flat_map(|d| d.entries())
            .filter_map(|(_, e)| e.catalog_id().cloned())
            .collect()
    }

    #[tokio::test]
    async fn generates_seven_consecutive_days() {
        let store = MemoryStore::with_recipes(catalog(10));
        let user = Uuid::new_v4();
        let plan = generate_weekly_plan(
            &store,
            &GenerationConfig::default(),
            &request(user),
            Box::new(StdRandom::seeded(5)),
            TODAY,
        )
        .await
        .unwrap();
        assert_eq!(plan.plans.len(), 7);
        for (i, day) in plan.plans.iter().enumerate() {
            assert_eq!(day.date, START + time::Duration::days(i as i64));
        }
        // default profile: bread breakfast and rest days are on
        assert!(plan.plans.iter().all(|d| d.breakfast.is_some()));
        let rest = plan.plans.iter().filter(|d| d.dinner.as_ref().is_some_and(|e| e.is_rest_day())).count();
        assert!((1..=2).contains(&rest));
        assert_eq!(store.preference_count(), 1);
    }

    #[tokio::test]
    async fn both_catalog_strategies_produce_the_same_plan() {
        let store = MemoryStore::with_recipes(catalog(10));
        let user = quiet_user(&store).await;
        let bulk = GenerationConfig::default();
        let per_query = GenerationConfig {
            catalog_access: CatalogAccess::PerQuery,
            ..GenerationConfig::default()
        };
        let a = generate_weekly_plan(&store, &bulk, &request(user), Box::new(StdRandom::seeded(11)), TODAY)
            .await
            .unwrap();
        let b = generate_weekly_plan(&store, &per_query, &request(user), Box::new(StdRandom::seeded(11)), TODAY)
            .await
            .unwrap();
        let mut ids_a = ids_of(&a);
        let mut ids_b = ids_of(&b);
        ids_a.sort();
        ids_b.sort();
        assert_eq!(ids_a.len(), 21);
        assert_eq!(ids_a, ids_b);
    }

    #[tokio::test]
    async fn recent_meals_are_avoided_while_alternatives_exist() {
        let store = MemoryStore::with_recipes(catalog(14));
        let user = quiet_user(&store).await;
        let recent: Vec<NewMealPlanRecord> = (0..7)
            .map(|i| NewMealPlanRecord {
                date: date!(2024 - 05 - 03) + time::Duration::days(i),
                breakfast_id: Some(RecipeId::new(format!("breakfast-{i}"))),
                lunch_id: Some(RecipeId::new(format!("lunch-{i}"))),
                dinner_id: Some(RecipeId::new(format!("dinner-{i}"))),
                generation_settings: None,
            })
            .collect();
        store
            .replace_week(user, date!(2024 - 05 - 03), &recent, &Nutrition::default())
            .await
            .unwrap();

        let plan = generate_weekly_plan(
            &store,
            &GenerationConfig::default(),
            &request(user),
            Box::new(StdRandom::seeded(2)),
            TODAY,
        )
        .await
        .unwrap();
        let recent_ids: HashSet<RecipeId> = recent.iter().flat_map(|r| r.dinner_id.clone()).collect();
        assert!(ids_of(&plan).iter().all(|id| !recent_ids.contains(id)));
    }

    #[tokio::test]
    async fn storage_failure_aborts_generation() {
        let store = MemoryStore::with_recipes(catalog(10));
        store.fail_reads(true);
        let err = generate_weekly_plan(
            &store,
            &GenerationConfig::default(),
            &request(Uuid::new_v4()),
            Box::new(StdRandom::seeded(1)),
            TODAY,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PlanError::Storage(_)));
    }

    #[tokio::test]
    async fn saved_week_holds_only_catalog_ids() {
        // nothing safe for dinner: every dinner is a fallback or rest day
        let mut all = catalog(10);
        all.retain(|r| r.category != MealType::Dinner);
        all.push(recipe("dinner-egg", "親子丼", MealType::Dinner, &["卵"]));
        let store = MemoryStore::with_recipes(all);
        let user = Uuid::new_v4();
        store
            .upsert_preferences(&UserPreferences {
                allergies: vec!["卵".into()],
                ..UserPreferences::defaults_for(user)
            })
            .await
            .unwrap();

        let plan = generate_weekly_plan(
            &store,
            &GenerationConfig::default(),
            &request(user),
            Box::new(StdRandom::seeded(8)),
            TODAY,
        )
        .await
        .unwrap();
        assert!(plan
            .plans
            .iter()
            .all(|d| d.dinner.as_ref().is_some_and(|e| e.is_fallback() || e.is_rest_day())));

        save_weekly_plan(&store, user, &plan).await.unwrap();
        let records = store.records_between(user, START, crate::dates::week_end(START)).await.unwrap();
        assert_eq!(records.len(), 7);
        for r in &records {
            assert_eq!(r.dinner_id, None);
            for id in r.slot_ids() {
                assert!(is_valid_recipe_id(id.as_str()));
                assert!(store.has_recipe(&id));
            }
        }
    }

    #[tokio::test]
    async fn regenerating_replaces_only_that_week() {
        let store = MemoryStore::with_recipes(catalog(10));
        let user = quiet_user(&store).await;
        let config = GenerationConfig::default();

        let mut previous = request(user);
        previous.week_start = date!(2024 - 05 - 06);
        let earlier = generate_weekly_plan(&store, &config, &previous, Box::new(StdRandom::seeded(1)), TODAY)
            .await
            .unwrap();
        let earlier_id = save_weekly_plan(&store, user, &earlier).await.unwrap();

        let first = generate_weekly_plan(&store, &config, &request(user), Box::new(StdRandom::seeded(2)), TODAY)
            .await
            .unwrap();
        let first_id = save_weekly_plan(&store, user, &first).await.unwrap();
        let second = generate_weekly_plan(&store, &config, &request(user), Box::new(StdRandom::seeded(3)), TODAY)
            .await
            .unwrap();
        let second_id = save_weekly_plan(&store, user, &second).await.unwrap();
        assert_ne!(first_id, second_id);

        let this_week = store.records_between(user, START, crate::dates::week_end(START)).await.unwrap();
        assert_eq!(this_week.len(), 7);
        assert!(this_week.iter().all(|r| r.weekly_meal_plan_id == Some(second_id)));

        let last_week = store
            .records_between(user, date!(2024 - 05 - 06), date!(2024 - 05 - 12))
            .await
            .unwrap();
        assert_eq!(last_week.len(), 7);
        assert!(last_week.iter().all(|r| r.weekly_meal_plan_id == Some(earlier_id)));
        assert_eq!(store.weekly_plan_id(user, date!(2024 - 05 - 06)).await.unwrap(), Some(earlier_id));
    }

    #[tokio::test]
    async fn partial_dinner_keeps_other_slots_and_their_ids() {
        let store = MemoryStore::with_recipes(catalog(10));
        let user = quiet_user(&store).await;
        let config = GenerationConfig::default();

        let full = generate_weekly_plan(&store, &config, &request(user), Box::new(StdRandom::seeded(4)), TODAY)
            .await
            .unwrap();
        save_weekly_plan(&store, user, &full).await.unwrap();

        let mut req = request(user);
        req.settings.meal_type = Some(MealType::Dinner);
        let partial = generate_partial_plan(
            &store,
            &config,
            &req,
            MealType::Dinner,
            Box::new(StdRandom::seeded(9)),
            TODAY,
        )
        .await
        .unwrap();
        assert_eq!(partial.plans.len(), 7);
        assert!(partial.plans.iter().all(|d| d.entry.is_some()));
        save_partial_plan(&store, user, &partial).await.unwrap();

        let after = load_week(&store, user, START).await.unwrap();
        for (before, now) in full.plans.iter().zip(&after.days) {
            assert_eq!(before.breakfast, now.breakfast);
            assert_eq!(before.lunch, now.lunch);
        }
        let mut ids: Vec<RecipeId> = after
            .days
            .iter()
            .flat_map(|d| d.entries())
            .filter_map(|(_, e)| e.catalog_id().cloned())
            .collect();
        let total = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[tokio::test]
    async fn partial_lunch_uses_stored_curry_dinner() {
        let mut all = catalog(10);
        all.push(with_tags(recipe("beef-curry", "ビーフカレー", MealType::Dinner, &["牛肉"]), &["カレー"]));
        all.push(with_tags(
            recipe("curry-udon", "カレーうどん", MealType::Lunch, &["うどん"]),
            &["カレーアレンジ"],
        ));
        let store = MemoryStore::with_recipes(all);
        let user = Uuid::new_v4();
        store
            .upsert_preferences(&UserPreferences {
                wants_rest_days: false,
                ..UserPreferences::defaults_for(user)
            })
            .await
            .unwrap();
        store
            .replace_week(
                user,
                START,
                &[NewMealPlanRecord {
                    date: START,
                    breakfast_id: None,
                    lunch_id: None,
                    dinner_id: Some(RecipeId::new("beef-curry")),
                    generation_settings: None,
                }],
                &Nutrition::default(),
            )
            .await
            .unwrap();

        let mut req = request(user);
        req.settings.meal_type = Some(MealType::Lunch);
        let partial = generate_partial_plan(
            &store,
            &GenerationConfig::default(),
            &req,
            MealType::Lunch,
            Box::new(ScriptedRandom::constant(0.0)),
            TODAY,
        )
        .await
        .unwrap();
        let lunch = partial.plans[1].entry.as_ref().unwrap();
        assert!(matches!(lunch, SlotEntry::Arrangement(_)));
        assert!(lunch.name().contains("カレーうどん"));
    }

    #[tokio::test]
    async fn manual_edit_rejects_unknown_recipes() {
        let store = MemoryStore::with_recipes(catalog(1));
        let user = Uuid::new_v4();
        let edit = |id: &str| SlotEdit {
            user_id: user,
            date: START,
            meal_type: MealType::Dinner,
            recipe_id: Some(RecipeId::new(id)),
            rating: Some(4),
            notes: Some("美味しかった".into()),
        };
        assert!(matches!(set_slot(&store, edit("nope")).await, Err(PlanError::InvalidInput(_))));
        assert!(matches!(
            set_slot(&store, edit("fallback-dinner-0")).await,
            Err(PlanError::InvalidInput(_))
        ));

        let record = set_slot(&store, edit("dinner-0")).await.unwrap();
        assert_eq!(record.dinner_id.as_deref(), Some("dinner-0"));
        assert_eq!(record.user_rating, Some(4));

        let view = view_week(&store, user, START).await.unwrap();
        assert_eq!(view.plans[0].dinner.as_ref().unwrap().name(), "dinner-0");
        assert_eq!(view.weekly_plan_id, None);
    }
}
