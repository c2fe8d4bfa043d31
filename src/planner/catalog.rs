use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use super::curry;
use crate::recipes::model::{MealType, Recipe, RecipeId, Season};
use crate::storage::RecipeCatalog;

/// Case-insensitive substring match of allergens against ingredient names.
///
/// Over-excludes on purpose: an allergen that happens to be a substring of an
/// unrelated ingredient name still removes the recipe.
#[derive(Debug, Clone, Default)]
pub struct AllergyFilter {
    allergens: Vec<String>,
}

impl AllergyFilter {
    pub fn new(allergies: &[String]) -> Self {
        let allergens = allergies
            .iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| !a.is_empty())
            .collect();
        Self { allergens }
    }

    pub fn allows(&self, recipe: &Recipe) -> bool {
        if self.allergens.is_empty() {
            return true;
        }
        recipe.ingredient_names().all(|name| {
            let name = name.to_lowercase();
            !self.allergens.iter().any(|a| name.contains(a.as_str()))
        })
    }
}

/// How the engine reaches the catalog during one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CatalogAccess {
    /// Load the whole catalog once and filter in memory.
    #[default]
    Bulk,
    /// One filtered query per candidate lookup.
    PerQuery,
}

impl CatalogAccess {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => Some(CatalogAccess::Bulk),
            "per-query" | "per_query" | "perquery" => Some(CatalogAccess::PerQuery),
            _ => None,
        }
    }
}

/// Exclusions applied on top of the allergy filter. `None` disables a rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct CandidateFilter<'a> {
    pub recent: Option<&'a HashSet<RecipeId>>,
    pub used: Option<&'a HashSet<RecipeId>>,
    pub season: Option<Season>,
}

impl CandidateFilter<'_> {
    pub fn admits(&self, recipe: &Recipe) -> bool {
        if self.recent.is_some_and(|ids| ids.contains(&recipe.id)) {
            return false;
        }
        if self.used.is_some_and(|ids| ids.contains(&recipe.id)) {
            return false;
        }
        self.season.map_or(true, |s| recipe.is_available_in(s))
    }

    /// Union of the id exclusions, for stores that filter ids in SQL.
    pub fn excluded_ids(&self) -> HashSet<RecipeId> {
        self.recent
            .into_iter()
            .chain(self.used)
            .flat_map(|ids| ids.iter().cloned())
            .collect()
    }
}

/// Allergy-safe recipe lookups for one generation run.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    async fn candidates(
        &self,
        category: MealType,
        filter: &CandidateFilter<'_>,
    ) -> anyhow::Result<Vec<Recipe>>;

    /// Curry arrangement recipes, whatever their category.
    async fn arrangements(&self) -> anyhow::Result<Vec<Recipe>>;
}

/// Catalog fetched once, allergy-filtered and partitioned by category.
pub struct PrefetchedCatalog {
    by_category: HashMap<MealType, Vec<Recipe>>,
    arrangements: Vec<Recipe>,
}

impl PrefetchedCatalog {
    pub fn new(all: Vec<Recipe>, allergy: &AllergyFilter) -> Self {
        let mut by_category: HashMap<MealType, Vec<Recipe>> = HashMap::new();
        let mut arrangements = Vec::new();
        for recipe in all.into_iter().filter(|r| allergy.allows(r)) {
            if curry::is_arrangement_recipe(&recipe) {
                arrangements.push(recipe.clone());
            }
            by_category.entry(recipe.category).or_default().push(recipe);
        }
        Self {
            by_category,
            arrangements,
        }
    }
}

#[async_trait]
impl RecipeSource for PrefetchedCatalog {
    async fn candidates(
        &self,
        category: MealType,
        filter: &CandidateFilter<'_>,
    ) -> anyhow::Result<Vec<Recipe>> {
        Ok(self
            .by_category
            .get(&category)
            .map(|recipes| recipes.iter().filter(|r| filter.admits(r)).cloned().collect())
            .unwrap_or_default())
    }

    async fn arrangements(&self) -> anyhow::Result<Vec<Recipe>> {
        Ok(self.arrangements.clone())
    }
}

/// Issues one store query per lookup.
pub struct QueryCatalog<'a, S: RecipeCatalog + ?Sized> {
    store: &'a S,
    allergy: AllergyFilter,
}

impl<'a, S: RecipeCatalog + ?Sized> QueryCatalog<'a, S> {
    pub fn new(store: &'a S, allergy: AllergyFilter) -> Self {
        Self { store, allergy }
    }
}

#[async_trait]
impl<S: RecipeCatalog + ?Sized> RecipeSource for QueryCatalog<'_, S> {
    async fn candidates(
        &self,
        category: MealType,
        filter: &CandidateFilter<'_>,
    ) -> anyhow::Result<Vec<Recipe>> {
        let recipes = self
            .store
            .recipes_by_category(category, &filter.excluded_ids())
            .await?;
        Ok(recipes
            .into_iter()
            .filter(|r| self.allergy.allows(r) && filter.admits(r))
            .collect())
    }

    async fn arrangements(&self) -> anyhow::Result<Vec<Recipe>> {
        let recipes = self
            .store
            .recipes_by_name_or_tag(&curry::arrangement_patterns())
            .await?;
        Ok(recipes
            .into_iter()
            .filter(|r| curry::is_arrangement_recipe(r) && self.allergy.allows(r))
            .collect())
    }
}
