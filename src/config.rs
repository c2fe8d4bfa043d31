use std::str::FromStr;

use anyhow::Context;
use tracing::warn;

use crate::planner::catalog::CatalogAccess;
use crate::planner::engine::EngineParams;
use crate::planner::random::{RandomSource, StdRandom};

/// Tunables of the weekly plan generator.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub arrangement_probability: f64,
    pub rest_days_min: usize,
    pub rest_days_max: usize,
    /// Recency window used when a request does not name one.
    pub recent_meals_days: u32,
    pub catalog_access: CatalogAccess,
    /// Fixed seed for reproducible runs; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            arrangement_probability: 0.3,
            rest_days_min: 1,
            rest_days_max: 2,
            recent_meals_days: 14,
            catalog_access: CatalogAccess::Bulk,
            seed: None,
        }
    }
}

impl GenerationConfig {
    fn from_lookup(get: &impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        let rest_days_min = parsed(get, "REST_DAYS_MIN", d.rest_days_min).min(7);
        let rest_days_max = parsed(get, "REST_DAYS_MAX", d.rest_days_max).min(7).max(rest_days_min);
        let catalog_access = match get("CATALOG_ACCESS") {
            Some(raw) => CatalogAccess::parse(&raw).unwrap_or_else(|| {
                warn!(value = %raw, "unknown CATALOG_ACCESS, using bulk");
                d.catalog_access
            }),
            None => d.catalog_access,
        };
        Self {
            arrangement_probability: parsed(get, "ARRANGEMENT_PROBABILITY", d.arrangement_probability)
                .clamp(0.0, 1.0),
            rest_days_min,
            rest_days_max,
            recent_meals_days: parsed(get, "RECENT_MEALS_DAYS", d.recent_meals_days),
            catalog_access,
            seed: get("GENERATION_SEED").and_then(|v| v.trim().parse().ok()),
        }
    }

    pub fn engine_params(&self) -> EngineParams {
        EngineParams {
            arrangement_probability: self.arrangement_probability,
            rest_days_min: self.rest_days_min,
            rest_days_max: self.rest_days_max,
        }
    }

    pub fn random_source(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(StdRandom::seeded(seed)),
            None => Box::new(StdRandom::from_entropy()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub generation: GenerationConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(&|key: &str| std::env::var(key).ok())
    }

    fn from_lookup(get: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;
        Ok(Self {
            database_url,
            max_connections: parsed(get, "DB_MAX_CONNECTIONS", 10),
            generation: GenerationConfig::from_lookup(get),
        })
    }
}

/// Parse `key`, keeping `default` when it is unset or malformed.
fn parsed<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match get(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, "invalid value, using default");
            default
        }),
        None => default,
    }
}
