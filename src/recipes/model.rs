use std::fmt;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// Catalog identity of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub String);

impl RecipeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Meal category of a recipe, and the slot a recipe fills in a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    /// Slot order within a day.
    pub const ALL: [MealType; 3] = [MealType::Breakfast, MealType::Lunch, MealType::Dinner];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            _ => None,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Mar–May spring, Jun–Aug summer, Sep–Nov autumn, Dec–Feb winter.
    pub fn from_month(month: time::Month) -> Self {
        match u8::from(month) {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "spring",
            Season::Summer => "summer",
            Season::Autumn => "autumn",
            Season::Winter => "winter",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Some(Season::Spring),
            "summer" => Some(Season::Summer),
            "autumn" | "fall" => Some(Season::Autumn),
            "winter" => Some(Season::Winter),
            _ => None,
        }
    }
}

/// The ten fixed ingredient categories, in shopping-list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngredientCategory {
    Vegetables,
    Fruits,
    Meat,
    Fish,
    Dairy,
    Grains,
    Legumes,
    Seasonings,
    Oils,
    Others,
}

impl IngredientCategory {
    pub fn sort_order(&self) -> u8 {
        match self {
            IngredientCategory::Vegetables => 1,
            IngredientCategory::Fruits => 2,
            IngredientCategory::Meat => 3,
            IngredientCategory::Fish => 4,
            IngredientCategory::Dairy => 5,
            IngredientCategory::Grains => 6,
            IngredientCategory::Legumes => 7,
            IngredientCategory::Seasonings => 8,
            IngredientCategory::Oils => 9,
            IngredientCategory::Others => 10,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IngredientCategory::Vegetables => "vegetables",
            IngredientCategory::Fruits => "fruits",
            IngredientCategory::Meat => "meat",
            IngredientCategory::Fish => "fish",
            IngredientCategory::Dairy => "dairy",
            IngredientCategory::Grains => "grains",
            IngredientCategory::Legumes => "legumes",
            IngredientCategory::Seasonings => "seasonings",
            IngredientCategory::Oils => "oils",
            IngredientCategory::Others => "others",
        }
    }

    /// Unknown categories land in `Others`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "vegetables" => IngredientCategory::Vegetables,
            "fruits" => IngredientCategory::Fruits,
            "meat" => IngredientCategory::Meat,
            "fish" => IngredientCategory::Fish,
            "dairy" => IngredientCategory::Dairy,
            "grains" => IngredientCategory::Grains,
            "legumes" => IngredientCategory::Legumes,
            "seasonings" => IngredientCategory::Seasonings,
            "oils" => IngredientCategory::Oils,
            _ => IngredientCategory::Others,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    Refrigerated,
    Frozen,
    Pantry,
}

impl StorageType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refrigerated" => Some(StorageType::Refrigerated),
            "frozen" => Some(StorageType::Frozen),
            "pantry" => Some(StorageType::Pantry),
            _ => None,
        }
    }
}

/// Per-serving nutrition values. All fields are non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nutrition {
    pub calories: f64,
    pub protein: f64,
    pub fat: f64,
    #[serde(alias = "carbs")]
    pub carbohydrates: f64,
    pub fiber: f64,
    pub sodium: f64,
}

impl Nutrition {
    pub fn divided_by(self, divisor: f64) -> Self {
        if divisor <= 0.0 {
            return self;
        }
        Self {
            calories: self.calories / divisor,
            protein: self.protein / divisor,
            fat: self.fat / divisor,
            carbohydrates: self.carbohydrates / divisor,
            fiber: self.fiber / divisor,
            sodium: self.sodium / divisor,
        }
    }
}

impl Add for Nutrition {
    type Output = Nutrition;

    fn add(mut self, rhs: Nutrition) -> Nutrition {
        self += rhs;
        self
    }
}

impl AddAssign for Nutrition {
    fn add_assign(&mut self, rhs: Nutrition) {
        self.calories += rhs.calories;
        self.protein += rhs.protein;
        self.fat += rhs.fat;
        self.carbohydrates += rhs.carbohydrates;
        self.fiber += rhs.fiber;
        self.sodium += rhs.sodium;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    pub category: IngredientCategory,
    pub unit: String,
    pub nutrition_per_100g: Option<Nutrition>,
    pub storage_type: Option<StorageType>,
    pub shelf_life_days: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    pub ingredient: Ingredient,
    pub quantity: f64,
    pub unit: String,
}

/// Immutable catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    pub category: MealType,
    pub cooking_time: i32,
    pub difficulty: i16,
    pub servings: i32,
    pub tags: Vec<String>,
    /// Empty means available all year.
    pub seasonality: Vec<Season>,
    pub nutrition: Nutrition,
    pub ingredients: Vec<RecipeIngredient>,
}

impl Recipe {
    pub fn ingredient_names(&self) -> impl Iterator<Item = &str> {
        self.ingredients.iter().map(|ri| ri.ingredient.name.as_str())
    }

    pub fn is_available_in(&self, season: Season) -> bool {
        self.seasonality.is_empty() || self.seasonality.contains(&season)
    }

    /// True when the name or any tag contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.name.contains(needle) || self.tags.iter().any(|t| t.contains(needle))
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meal_type_parse_is_case_insensitive() {
        assert_eq!(MealType::parse("Dinner"), Some(MealType::Dinner));
        assert_eq!(MealType::parse(" lunch "), Some(MealType::Lunch));
        assert_eq!(MealType::parse("snack"), None);
    }

    #[test]
    fn season_follows_calendar_months() {
        assert_eq!(Season::from_month(time::Month::March), Season::Spring);
        assert_eq!(Season::from_month(time::Month::August), Season::Summer);
        assert_eq!(Season::from_month(time::Month::November), Season::Autumn);
        assert_eq!(Season::from_month(time::Month::December), Season::Winter);
        assert_eq!(Season::from_month(time::Month::February), Season::Winter);
    }

    #[test]
    fn nutrition_accepts_carbs_alias() {
        let n: Nutrition = serde_json::from_str(r#"{"calories": 100, "carbs": 12.5}"#).unwrap();
        assert_eq!(n.calories, 100.0);
        assert_eq!(n.carbohydrates, 12.5);
        assert_eq!(n.sodium, 0.0);
    }

    #[test]
    fn nutrition_sums_and_divides() {
        let a = Nutrition { calories: 300.0, protein: 10.0, ..Default::default() };
        let b = Nutrition { calories: 500.0, protein: 20.0, ..Default::default() };
        let avg = (a + b).divided_by(2.0);
        assert_eq!(avg.calories, 400.0);
        assert_eq!(avg.protein, 15.0);
        assert_eq!(a.divided_by(0.0), a);
    }

    #[test]
    fn unknown_ingredient_category_is_others() {
        assert_eq!(IngredientCategory::parse("meat"), IngredientCategory::Meat);
        assert_eq!(IngredientCategory::parse("spices"), IngredientCategory::Others);
        assert!(IngredientCategory::Vegetables.sort_order() < IngredientCategory::Others.sort_order());
    }
}
