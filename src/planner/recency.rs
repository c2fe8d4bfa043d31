use std::collections::HashSet;

use time::{Date, Duration};
use tracing::debug;
use uuid::Uuid;

use crate::recipes::model::RecipeId;
use crate::storage::MealPlanStore;

/// Recipe ids used in any slot dated within `[today - window_days, today]`.
pub async fn recently_used_ids<S>(
    store: &S,
    user_id: Uuid,
    window_days: u32,
    today: Date,
) -> anyhow::Result<HashSet<RecipeId>>
where
    S: MealPlanStore + ?Sized,
{
    let from = today.saturating_sub(Duration::days(i64::from(window_days)));
    let ids = store.recipe_ids_between(user_id, from, today).await?;
    debug!(%user_id, window_days, recent = ids.len(), "recency set loaded");
    Ok(ids)
}
