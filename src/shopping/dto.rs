use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::repo_types::{ShoppingItem, ShoppingList};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateShoppingListRequest {
    pub user_id: Option<Uuid>,
    pub week_start_date: Option<String>,
    pub list_name: Option<String>,
}

/// `listId` picks one list; otherwise every list of `userId`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListQuery {
    pub user_id: Option<Uuid>,
    pub list_id: Option<Uuid>,
}

/// With `itemId` the item fields apply; otherwise `listId` and `isCompleted`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateShoppingListRequest {
    pub list_id: Option<Uuid>,
    pub item_id: Option<Uuid>,
    pub is_purchased: Option<bool>,
    pub actual_price: Option<f64>,
    pub notes: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteShoppingListQuery {
    pub list_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShoppingListsResponse {
    One(ShoppingList),
    Many(Vec<ShoppingList>),
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShoppingUpdateResponse {
    Item(ShoppingItem),
    List(ShoppingList),
}
