use crate::recipes::model::{Nutrition, Recipe, RecipeId};

use super::model::{Arrangement, MealAttributes, SlotEntry};

/// Marker in a recipe name or tag that identifies a curry dish.
pub const CURRY_MARKER: &str = "カレー";

/// Tag carried by catalog recipes that reuse leftover curry.
pub const ARRANGEMENT_TAG: &str = "カレーアレンジ";

/// Dish names that count as curry arrangements.
pub const ARRANGEMENT_NAMES: [&str; 3] = ["カレーうどん", "カレードリア", "カレーグラタン"];

/// Name and tag patterns used to look arrangement recipes up in the catalog.
pub fn arrangement_patterns() -> Vec<&'static str> {
    let mut patterns = vec![ARRANGEMENT_TAG];
    patterns.extend(ARRANGEMENT_NAMES);
    patterns
}

pub fn is_arrangement_recipe(recipe: &Recipe) -> bool {
    recipe.has_tag(ARRANGEMENT_TAG) || ARRANGEMENT_NAMES.iter().any(|n| recipe.name.contains(n))
}

/// The curry a dinner leaves behind: its catalog recipe, when the name or a
/// tag mentions curry. Synthesized entries have no recipe and leave nothing.
pub fn leftover_curry(entry: &SlotEntry) -> Option<&Recipe> {
    entry.recipe().filter(|r| r.mentions(CURRY_MARKER))
}

pub fn from_catalog(recipe: Recipe, leftover_of: &RecipeId) -> SlotEntry {
    let attributes = MealAttributes {
        name: recipe.name.clone(),
        cooking_time: recipe.cooking_time,
        difficulty: recipe.difficulty,
        servings: recipe.servings,
        nutrition: Some(recipe.nutrition),
    };
    SlotEntry::Arrangement(Arrangement {
        recipe: Some(recipe),
        leftover_of: Some(leftover_of.clone()),
        attributes,
    })
}

/// Curry udon built from the leftovers when the catalog has no arrangement.
pub fn synthesized(leftover_of: &RecipeId, servings: i32) -> SlotEntry {
    SlotEntry::Arrangement(Arrangement {
        recipe: None,
        leftover_of: Some(leftover_of.clone()),
        attributes: MealAttributes {
            name: ARRANGEMENT_NAMES[0].to_string(),
            cooking_time: 15,
            difficulty: 1,
            servings,
            nutrition: Some(Nutrition {
                calories: 380.0,
                protein: 12.5,
                fat: 8.2,
                carbohydrates: 68.0,
                fiber: 2.5,
                sodium: 800.0,
            }),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipes::model::MealType;
    use crate::test_support::{recipe, with_tags};

    #[test]
    fn recognizes_curry_by_name_or_tag() {
        let by_name = recipe("c1", "ビーフカレー", MealType::Dinner, &[]);
        let by_tag = with_tags(recipe("c2", "スパイス煮込み", MealType::Dinner, &[]), &["カレー"]);
        let other = recipe("n", "肉じゃが", MealType::Dinner, &[]);
        assert!(leftover_curry(&SlotEntry::Recipe(by_name)).is_some());
        assert!(leftover_curry(&SlotEntry::Recipe(by_tag)).is_some());
        assert!(leftover_curry(&SlotEntry::Recipe(other)).is_none());
    }

    #[test]
    fn curry_named_dishes_leave_leftovers() {
        let udon = with_tags(recipe("a1", "カレーうどん", MealType::Dinner, &[]), &["カレー"]);
        let doria = with_tags(recipe("a2", "カレードリア", MealType::Dinner, &[]), &["カレーアレンジ"]);
        assert!(is_arrangement_recipe(&udon));
        assert_eq!(
            leftover_curry(&SlotEntry::Recipe(udon)).map(|r| r.id.as_str()),
            Some("a1")
        );
        let served = from_catalog(doria, &RecipeId::new("c1"));
        assert_eq!(leftover_curry(&served).map(|r| r.id.as_str()), Some("a2"));
        assert!(leftover_curry(&synthesized(&RecipeId::new("c1"), 2)).is_none());
    }

    #[test]
    fn synthesized_arrangement_has_no_catalog_identity() {
        let entry = synthesized(&RecipeId::new("curry"), 3);
        assert!(entry.is_arrangement());
        assert!(entry.catalog_id().is_none());
        assert!(entry.name().contains("カレーうどん"));
    }
}
