use std::collections::HashMap;

use time::Date;
use tracing::debug;
use uuid::Uuid;

use super::dto::{
    GenerateShoppingListRequest, ShoppingListQuery, ShoppingListsResponse,
    ShoppingUpdateResponse, UpdateShoppingListRequest,
};
use super::repo_types::{NewShoppingItem, NewShoppingList, ShoppingItemUpdate, ShoppingList};
use crate::dates::parse_week_start;
use crate::error::PlanError;
use crate::planner::model::DayPlan;
use crate::planner::resolve;
use crate::storage::{MealPlanStore, RecipeCatalog, ShoppingListStore};

/// Sum ingredient quantities over every recipe-backed slot. Lines are keyed
/// by ingredient and unit, so mixed units stay on separate lines.
pub fn build_items(days: &[DayPlan]) -> Vec<NewShoppingItem> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut items: Vec<NewShoppingItem> = Vec::new();

    for recipe in days.iter().flat_map(|d| d.entries()).filter_map(|(_, e)| e.recipe()) {
        for ri in &recipe.ingredients {
            let key = (ri.ingredient.id.clone(), ri.unit.clone());
            let pos = *index.entry(key).or_insert_with(|| {
                items.push(NewShoppingItem {
                    ingredient_id: ri.ingredient.id.clone(),
                    ingredient_name: ri.ingredient.name.clone(),
                    category: ri.ingredient.category,
                    quantity: 0.0,
                    unit: ri.unit.clone(),
                    recipe_names: Vec::new(),
                });
                items.len() - 1
            });
            let item = &mut items[pos];
            item.quantity += ri.quantity;
            if !item.recipe_names.contains(&recipe.name) {
                item.recipe_names.push(recipe.name.clone());
            }
        }
    }

    items.sort_by(|a, b| {
        a.category
            .sort_order()
            .cmp(&b.category.sort_order())
            .then_with(|| a.ingredient_name.cmp(&b.ingredient_name))
            .then_with(|| a.unit.cmp(&b.unit))
    });
    items
}

pub fn default_name(week_start: Date) -> String {
    format!(
        "{}月{}日週の買い物リスト",
        u8::from(week_start.month()),
        week_start.day()
    )
}

pub async fn generate<S>(store: &S, req: GenerateShoppingListRequest) -> Result<ShoppingList, PlanError>
where
    S: MealPlanStore + RecipeCatalog + ShoppingListStore + ?Sized,
{
    let user_id = req
        .user_id
        .ok_or_else(|| PlanError::invalid("userId is required"))?;
    let week_start = parse_week_start(req.week_start_date.as_deref())?;

    let week = resolve::load_week(store, user_id, week_start).await?;
    if week.records.is_empty() {
        return Err(PlanError::NotFound(format!(
            "no meal plan stored for the week of {week_start}"
        )));
    }
    let items = build_items(&week.days);
    debug!(%user_id, %week_start, items = items.len(), "shopping items aggregated");

    let name = req
        .list_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_name(week_start));
    let list = NewShoppingList {
        user_id,
        name,
        week_start_date: week_start,
        items,
    };
    Ok(store.insert_shopping_list(&list).await?)
}

fn list_not_found(id: Uuid) -> PlanError {
    PlanError::NotFound(format!("shopping list {id} not found"))
}

/// One list when `listId` is given, otherwise the user's lists newest first.
pub async fn fetch<S>(store: &S, q: ShoppingListQuery) -> Result<ShoppingListsResponse, PlanError>
where
    S: ShoppingListStore + ?Sized,
{
    if let Some(list_id) = q.list_id {
        let list = store
            .find_shopping_list(list_id)
            .await?
            .ok_or_else(|| list_not_found(list_id))?;
        return Ok(ShoppingListsResponse::One(list));
    }
    let user_id = q
        .user_id
        .ok_or_else(|| PlanError::invalid("userId or listId is required"))?;
    let lists = store.shopping_lists_for_user(user_id).await?;
    debug!(%user_id, lists = lists.len(), "shopping lists loaded");
    Ok(ShoppingListsResponse::Many(lists))
}

/// Check off an item or complete a whole list. An item id wins over a list id.
pub async fn update<S>(store: &S, req: UpdateShoppingListRequest) -> Result<ShoppingUpdateResponse, PlanError>
where
    S: ShoppingListStore + ?Sized,
{
    if let Some(price) = req.actual_price {
        if !price.is_finite() || price < 0.0 {
            return Err(PlanError::invalid("actualPrice must be a non-negative number"));
        }
    }

    if let Some(item_id) = req.item_id {
        let change = ShoppingItemUpdate {
            is_purchased: req.is_purchased,
            actual_price: req.actual_price,
            notes: req.notes,
        };
        let item = store
            .update_shopping_item(item_id, &change)
            .await?
            .ok_or_else(|| PlanError::NotFound(format!("shopping item {item_id} not found")))?;
        return Ok(ShoppingUpdateResponse::Item(item));
    }

    let list_id = req
        .list_id
        .ok_or_else(|| PlanError::invalid("listId or itemId is required"))?;
    if let Some(done) = req.is_completed {
        if !store.set_shopping_list_completed(list_id, done).await? {
            return Err(list_not_found(list_id));
        }
    }
    let list = store
        .find_shopping_list(list_id)
        .await?
        .ok_or_else(|| list_not_found(list_id))?;
    Ok(ShoppingUpdateResponse::List(list))
}

pub async fn delete<S>(store: &S, list_id: Option<Uuid>) -> Result<(), PlanError>
where
    S: ShoppingListStore + ?Sized,
{
    let list_id = list_id.ok_or_else(|| PlanError::invalid("listId is required"))?;
    if !store.delete_shopping_list(list_id).await? {
        return Err(list_not_found(list_id));
    }
    Ok(())
}
