use serde::Serialize;
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::dates::iso_date;
use crate::recipes::model::IngredientCategory;

/// Aggregated line before it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShoppingItem {
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub category: IngredientCategory,
    pub quantity: f64,
    pub unit: String,
    /// Distinct names of the recipes that need this line, in first-use order.
    pub recipe_names: Vec<String>,
}

impl NewShoppingItem {
    pub fn notes(&self) -> String {
        format!("使用レシピ: {}", self.recipe_names.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewShoppingList {
    pub user_id: Uuid,
    pub name: String,
    pub week_start_date: Date,
    pub items: Vec<NewShoppingItem>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ShoppingListRow {
    pub id: Uuid,
    pub created_at: OffsetDateTime,
}

/// A stored list without its items.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingListHeader {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub week_start_date: Date,
    pub is_completed: bool,
    pub created_at: OffsetDateTime,
}

/// A stored item joined with its ingredient.
#[derive(Debug, Clone, FromRow)]
pub struct ShoppingItemRow {
    pub id: Uuid,
    pub shopping_list_id: Uuid,
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub ingredient_category: String,
    pub quantity: f64,
    pub unit: String,
    pub recipe_names: Vec<String>,
    pub is_purchased: bool,
    pub actual_price: Option<f64>,
    pub notes: Option<String>,
}

impl From<ShoppingItemRow> for ShoppingItem {
    fn from(row: ShoppingItemRow) -> Self {
        Self {
            id: row.id,
            ingredient_id: row.ingredient_id,
            ingredient_name: row.ingredient_name,
            category: IngredientCategory::parse(&row.ingredient_category),
            quantity: row.quantity,
            unit: row.unit,
            recipes: row.recipe_names,
            is_purchased: row.is_purchased,
            actual_price: row.actual_price,
            notes: row.notes,
        }
    }
}

/// Fields a shopper can change on one item. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoppingItemUpdate {
    pub is_purchased: Option<bool>,
    pub actual_price: Option<f64>,
    pub notes: Option<String>,
}

impl ShoppingItemUpdate {
    pub fn apply(&self, item: &mut ShoppingItem) {
        if let Some(purchased) = self.is_purchased {
            item.is_purchased = purchased;
        }
        if let Some(price) = self.actual_price {
            item.actual_price = Some(price);
        }
        if let Some(notes) = &self.notes {
            item.notes = Some(notes.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: Uuid,
    pub ingredient_id: String,
    pub ingredient_name: String,
    pub category: IngredientCategory,
    pub quantity: f64,
    pub unit: String,
    pub recipes: Vec<String>,
    pub is_purchased: bool,
    pub actual_price: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(with = "iso_date")]
    pub week_start_date: Date,
    pub is_completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub items: Vec<ShoppingItem>,
}

impl ShoppingList {
    pub fn from_header(header: ShoppingListHeader, items: Vec<ShoppingItem>) -> Self {
        Self {
            id: header.id,
            user_id: header.user_id,
            name: header.name,
            week_start_date: header.week_start_date,
            is_completed: header.is_completed,
            created_at: header.created_at,
            items,
        }
    }

    /// Assemble the stored list from what was written and the ids handed out.
    pub fn from_saved(list: &NewShoppingList, row: ShoppingListRow, item_ids: Vec<Uuid>) -> Self {
        let items = list
            .items
            .iter()
            .zip(item_ids)
            .map(|(item, id)| ShoppingItem {
                id,
                ingredient_id: item.ingredient_id.clone(),
                ingredient_name: item.ingredient_name.clone(),
                category: item.category,
                quantity: item.quantity,
                unit: item.unit.clone(),
                recipes: item.recipe_names.clone(),
                is_purchased: false,
                actual_price: None,
                notes: Some(item.notes()),
            })
            .collect();
        Self {
            id: row.id,
            user_id: list.user_id,
            name: list.name.clone(),
            week_start_date: list.week_start_date,
            is_completed: false,
            created_at: row.created_at,
            items,
        }
    }
}
