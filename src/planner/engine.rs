//! Slot-by-slot recipe selection for one week.
//!
//! Days are filled in date order and each day in breakfast, lunch, dinner
//! order. The order matters: the "used this week" set grows as slots are
//! filled, and the curry rule looks at the previous day's dinner.
//!
//! Dinner never stays empty. When the strict pool is exhausted the engine
//! relaxes in two steps (first the weekly dedupe, then recency and season)
//! before falling back to a fixed placeholder dish.

use std::collections::HashSet;

use tracing::debug;

use super::catalog::{CandidateFilter, RecipeSource};
use super::curry;
use super::model::{DayPlan, MealAttributes, Placeholder, SlotEntry};
use super::random::{chance, pick_index, RandomSource};
use crate::preferences::repo_types::UserPreferences;
use crate::recipes::model::{MealType, Nutrition, Recipe, RecipeId, Season};

pub const FALLBACK_DINNER_NAME: &str = "簡単炒め物";
pub const FROZEN_REST_DAY_NAME: &str = "冷凍餃子";
pub const PREPARED_REST_DAY_NAME: &str = "お惣菜";

/// Tunables of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineParams {
    /// Chance of serving leftovers the day after a curry dinner.
    pub arrangement_probability: f64,
    pub rest_days_min: usize,
    pub rest_days_max: usize,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            arrangement_probability: 0.3,
            rest_days_min: 1,
            rest_days_max: 2,
        }
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub picked: usize,
    pub relaxed: usize,
    pub fallbacks: usize,
    pub arrangements: usize,
    pub rest_days: usize,
}

pub struct SelectionEngine<'a> {
    source: &'a dyn RecipeSource,
    prefs: &'a UserPreferences,
    recent: HashSet<RecipeId>,
    season: Option<Season>,
    params: EngineParams,
    rng: Box<dyn RandomSource>,
    used: HashSet<RecipeId>,
    arrangement_pool: Option<Vec<Recipe>>,
    stats: RunStats,
}

impl<'a> SelectionEngine<'a> {
    /// `recent` is the recency exclusion set (empty when recency is ignored);
    /// `season` is `None` when seasonality is ignored.
    pub fn new(
        source: &'a dyn RecipeSource,
        prefs: &'a UserPreferences,
        recent: HashSet<RecipeId>,
        season: Option<Season>,
        params: EngineParams,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        Self {
            source,
            prefs,
            recent,
            season,
            params,
            rng,
            used: HashSet::new(),
            arrangement_pool: None,
            stats: RunStats::default(),
        }
    }

    /// Mark ids as already used this week, e.g. the slots a partial run keeps.
    pub fn seed_used<I: IntoIterator<Item = RecipeId>>(&mut self, ids: I) {
        self.used.extend(ids);
    }

    pub fn used(&self) -> &HashSet<RecipeId> {
        &self.used
    }

    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Fill `slots` of every day in place. Other slots are left untouched but
    /// still count as context (a kept dinner can trigger the curry rule).
    pub async fn fill(&mut self, days: &mut [DayPlan], slots: &[MealType]) -> anyhow::Result<()> {
        for i in 0..days.len() {
            let leftover = match i {
                0 => None,
                _ => days[i - 1]
                    .dinner
                    .as_ref()
                    .and_then(curry::leftover_curry)
                    .map(|r| r.id.clone()),
            };
            let mut leftover = leftover.filter(|_| self.prefs.allows_curry_two_days);
            let arrangement_slot = match leftover {
                Some(_) => self.roll_arrangement_slot(slots),
                None => None,
            };

            for meal_type in MealType::ALL {
                if !slots.contains(&meal_type) {
                    continue;
                }
                let curry_id = match arrangement_slot {
                    Some(slot) if slot == meal_type => leftover.take(),
                    _ => None,
                };
                let entry = match (curry_id, meal_type) {
                    (Some(id), _) => Some(self.arrangement(&id).await?),
                    (None, MealType::Breakfast) => self.pick_breakfast().await?,
                    (None, MealType::Lunch) => self.pick_lunch().await?,
                    (None, MealType::Dinner) => Some(self.pick_dinner(i).await?),
                };
                *days[i].slot_mut(meal_type) = entry;
            }
        }
        Ok(())
    }

    /// Replace the dinner of 1..=2 random days (by default) with a rest-day
    /// entry. Runs after `fill`.
    pub fn inject_rest_days(&mut self, days: &mut [DayPlan]) {
        if !self.prefs.wants_rest_days || days.is_empty() {
            return;
        }
        let n = days.len();
        let min = self.params.rest_days_min.min(n);
        let max = self.params.rest_days_max.min(n).max(min);
        let count = min + pick_index(self.rng.as_mut(), max - min + 1).unwrap_or(0);

        // partial Fisher-Yates over the day indices
        let mut order: Vec<usize> = (0..n).collect();
        for k in 0..count {
            let j = k + pick_index(self.rng.as_mut(), n - k).unwrap_or(0);
            order.swap(k, j);
        }
        let mut chosen = order[..count].to_vec();
        chosen.sort_unstable();

        for i in chosen {
            days[i].dinner = Some(self.rest_day(i));
            self.stats.rest_days += 1;
        }
        debug!(rest_days = self.stats.rest_days, "rest days injected");
    }

    /// One roll per day. A hit goes to lunch when lunch is being filled,
    /// otherwise to dinner.
    fn roll_arrangement_slot(&mut self, slots: &[MealType]) -> Option<MealType> {
        let slot = [MealType::Lunch, MealType::Dinner]
            .into_iter()
            .find(|m| slots.contains(m))?;
        chance(self.rng.as_mut(), self.params.arrangement_probability).then_some(slot)
    }

    async fn pick_breakfast(&mut self) -> anyhow::Result<Option<SlotEntry>> {
        if !self.prefs.wants_breakfast() {
            return Ok(None);
        }
        let pool = self
            .source
            .candidates(MealType::Breakfast, &self.strict_filter())
            .await?;
        Ok(self.choose(pool).map(|r| self.take(r)))
    }

    async fn pick_lunch(&mut self) -> anyhow::Result<Option<SlotEntry>> {
        let filter = self.strict_filter();
        let mut pool = self.source.candidates(MealType::Lunch, &filter).await?;
        if pool.is_empty() {
            pool = self.source.candidates(MealType::Dinner, &filter).await?;
            debug!(borrowed = pool.len(), "lunch pool empty, borrowing dinners");
        }
        Ok(self.choose(pool).map(|r| self.take(r)))
    }

    async fn pick_dinner(&mut self, day_index: usize) -> anyhow::Result<SlotEntry> {
        let pool = self
            .source
            .candidates(MealType::Dinner, &self.strict_filter())
            .await?;
        if let Some(r) = self.choose(pool) {
            return Ok(self.take(r));
        }

        let without_dedupe = CandidateFilter {
            used: None,
            ..self.strict_filter()
        };
        let pool = self
            .source
            .candidates(MealType::Dinner, &without_dedupe)
            .await?;
        if let Some(r) = self.choose(pool) {
            debug!(day_index, recipe = %r.id, "dinner picked after dropping weekly dedupe");
            self.stats.relaxed += 1;
            return Ok(self.take(r));
        }

        let pool = self
            .source
            .candidates(MealType::Dinner, &CandidateFilter::default())
            .await?;
        if let Some(r) = self.choose(pool) {
            debug!(day_index, recipe = %r.id, "dinner picked with allergy filter only");
            self.stats.relaxed += 1;
            return Ok(self.take(r));
        }

        debug!(day_index, "no dinner candidates, using fallback");
        self.stats.fallbacks += 1;
        Ok(self.fallback_dinner(day_index))
    }

    async fn arrangement(&mut self, leftover_of: &RecipeId) -> anyhow::Result<SlotEntry> {
        if self.arrangement_pool.is_none() {
            let pool = self.source.arrangements().await?;
            debug!(arrangements = pool.len(), "arrangement pool loaded");
            self.arrangement_pool = Some(pool);
        }
        self.stats.arrangements += 1;
        let pool = self.arrangement_pool.as_deref().unwrap_or_default();
        let picked = pick_index(self.rng.as_mut(), pool.len()).map(|i| pool[i].clone());
        Ok(match picked {
            Some(recipe) => curry::from_catalog(recipe, leftover_of),
            None => curry::synthesized(leftover_of, self.prefs.family_size),
        })
    }

    fn strict_filter(&self) -> CandidateFilter<'_> {
        CandidateFilter {
            recent: Some(&self.recent),
            used: Some(&self.used),
            season: self.season,
        }
    }

    fn choose(&mut self, mut pool: Vec<Recipe>) -> Option<Recipe> {
        let i = pick_index(self.rng.as_mut(), pool.len())?;
        Some(pool.swap_remove(i))
    }

    fn take(&mut self, recipe: Recipe) -> SlotEntry {
        self.used.insert(recipe.id.clone());
        self.stats.picked += 1;
        SlotEntry::Recipe(recipe)
    }

    fn fallback_dinner(&self, day_index: usize) -> SlotEntry {
        SlotEntry::Fallback(Placeholder {
            id: format!("fallback-dinner-{day_index}"),
            attributes: MealAttributes {
                name: FALLBACK_DINNER_NAME.to_string(),
                cooking_time: 15,
                difficulty: 1,
                servings: self.prefs.family_size,
                nutrition: Some(Nutrition {
                    calories: 400.0,
                    protein: 18.0,
                    fat: 15.0,
                    carbohydrates: 45.0,
                    fiber: 3.0,
                    sodium: 900.0,
                }),
            },
        })
    }

    fn rest_day(&self, day_index: usize) -> SlotEntry {
        let name = if self.prefs.uses_frozen_foods {
            FROZEN_REST_DAY_NAME
        } else {
            PREPARED_REST_DAY_NAME
        };
        SlotEntry::RestDay(Placeholder {
            id: format!("rest-day-{day_index}"),
            attributes: MealAttributes {
                name: name.to_string(),
                cooking_time: 5,
                difficulty: 1,
                servings: self.prefs.family_size,
                nutrition: None,
            },
        })
    }
}
