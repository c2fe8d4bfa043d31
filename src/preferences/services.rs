use time::OffsetDateTime;
use tracing::{debug, info};
use uuid::Uuid;

use super::dto::UpdatePreferencesRequest;
use super::repo_types::UserPreferences;
use crate::error::PlanError;
use crate::storage::PreferencesStore;

/// Load the user's profile, creating the default one on first access.
/// Storage failures propagate; nothing is retried here.
pub async fn resolve<S>(store: &S, user_id: Uuid) -> anyhow::Result<UserPreferences>
where
    S: PreferencesStore + ?Sized,
{
    if let Some(prefs) = store.find_preferences(user_id).await? {
        return Ok(prefs);
    }
    let created = store
        .insert_preferences_if_absent(&UserPreferences::defaults_for(user_id))
        .await?;
    info!(%user_id, "created default preferences");
    Ok(created)
}

/// Replace every setting of the user's profile.
pub async fn update<S>(
    store: &S,
    req: UpdatePreferencesRequest,
) -> Result<UserPreferences, PlanError>
where
    S: PreferencesStore + ?Sized,
{
    let user_id = req
        .user_id
        .ok_or_else(|| PlanError::invalid("userId is required"))?;
    if req.family_size < 1 {
        return Err(PlanError::invalid("familySize must be at least 1"));
    }

    let current = resolve(store, user_id).await?;
    let prefs = UserPreferences {
        user_id,
        family_size: req.family_size,
        has_children: req.has_children,
        has_elderly: req.has_elderly,
        allows_curry_two_days: req.allows_curry_two_days,
        eats_breakfast_bread: req.eats_breakfast_bread,
        eats_granola_or_cereal: req.eats_granola_or_cereal,
        wants_rest_days: req.wants_rest_days,
        uses_frozen_foods: req.uses_frozen_foods,
        uses_prepared_foods: req.uses_prepared_foods,
        allergies: normalize_allergies(req.allergies),
        created_at: current.created_at,
        updated_at: OffsetDateTime::now_utc(),
    };
    let saved = store.upsert_preferences(&prefs).await?;
    debug!(%user_id, allergies = saved.allergies.len(), "preferences saved");
    Ok(saved)
}

/// Trim entries and drop blanks and duplicates; an empty allergen would
/// otherwise match every ingredient.
fn normalize_allergies(raw: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for a in raw {
        let a = a.trim();
        if !a.is_empty() && !out.iter().any(|x| x == a) {
            out.push(a.to_string());
        }
    }
    out
}
