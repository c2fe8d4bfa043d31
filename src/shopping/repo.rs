use std::collections::HashMap;

use anyhow::Context;
use sqlx::PgPool;
use uuid::Uuid;

use super::repo_types::{
    NewShoppingList, ShoppingItem, ShoppingItemRow, ShoppingItemUpdate, ShoppingList,
    ShoppingListHeader, ShoppingListRow,
};

const LIST_COLUMNS: &str = "id, user_id, name, week_start_date, is_completed, created_at";

const ITEM_SELECT: &str = r#"
    SELECT si.id, si.shopping_list_id, si.ingredient_id,
           i.name AS ingredient_name, i.category AS ingredient_category,
           si.quantity, si.unit, si.recipe_names, si.is_purchased,
           si.actual_price, si.notes
    FROM shopping_items si
    JOIN ingredients i ON i.id = si.ingredient_id
"#;

/// Store a list and its items in one transaction.
pub async fn insert(db: &PgPool, list: &NewShoppingList) -> anyhow::Result<ShoppingList> {
    let mut tx = db.begin().await.context("begin tx")?;

    let row = sqlx::query_as::<_, ShoppingListRow>(
        r#"
        INSERT INTO shopping_lists (id, user_id, name, week_start_date)
        VALUES ($1, $2, $3, $4)
        RETURNING id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(list.user_id)
    .bind(&list.name)
    .bind(list.week_start_date)
    .fetch_one(&mut *tx)
    .await
    .context("insert shopping list")?;

    let mut item_ids = Vec::with_capacity(list.items.len());
    for (position, item) in list.items.iter().enumerate() {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO shopping_items
                (id, shopping_list_id, ingredient_id, position, quantity, unit,
                 recipe_names, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(id)
        .bind(row.id)
        .bind(&item.ingredient_id)
        .bind(position as i32)
        .bind(item.quantity)
        .bind(&item.unit)
        .bind(&item.recipe_names)
        .bind(item.notes())
        .execute(&mut *tx)
        .await
        .with_context(|| format!("insert shopping item {}", item.ingredient_id))?;
        item_ids.push(id);
    }

    tx.commit().await.context("commit tx")?;
    Ok(ShoppingList::from_saved(list, row, item_ids))
}

async fn items_of(db: &PgPool, list_ids: &[Uuid]) -> anyhow::Result<Vec<ShoppingItemRow>> {
    sqlx::query_as::<_, ShoppingItemRow>(&format!(
        "{ITEM_SELECT} WHERE si.shopping_list_id = ANY($1) ORDER BY si.shopping_list_id, si.position"
    ))
    .bind(list_ids)
    .fetch_all(db)
    .await
    .context("load shopping items")
}

/// Attach items to their headers, keeping header order.
fn assemble(headers: Vec<ShoppingListHeader>, rows: Vec<ShoppingItemRow>) -> Vec<ShoppingList> {
    let mut by_list: HashMap<Uuid, Vec<ShoppingItem>> = HashMap::new();
    for row in rows {
        by_list.entry(row.shopping_list_id).or_default().push(row.into());
    }
    headers
        .into_iter()
        .map(|h| {
            let items = by_list.remove(&h.id).unwrap_or_default();
            ShoppingList::from_header(h, items)
        })
        .collect()
}

/// Every list of a user, newest first.
pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<ShoppingList>> {
    let headers = sqlx::query_as::<_, ShoppingListHeader>(&format!(
        "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list shopping lists")?;

    let ids: Vec<Uuid> = headers.iter().map(|h| h.id).collect();
    let rows = items_of(db, &ids).await?;
    Ok(assemble(headers, rows))
}

pub async fn find(db: &PgPool, id: Uuid) -> anyhow::Result<Option<ShoppingList>> {
    let header = sqlx::query_as::<_, ShoppingListHeader>(&format!(
        "SELECT {LIST_COLUMNS} FROM shopping_lists WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(db)
    .await
    .context("find shopping list")?;

    let Some(header) = header else {
        return Ok(None);
    };
    let rows = items_of(db, &[header.id]).await?;
    Ok(assemble(vec![header], rows).pop())
}

pub async fn update_item(
    db: &PgPool,
    item_id: Uuid,
    update: &ShoppingItemUpdate,
) -> anyhow::Result<Option<ShoppingItem>> {
    let updated = sqlx::query(
        r#"
        UPDATE shopping_items
        SET is_purchased = COALESCE($2, is_purchased),
            actual_price = COALESCE($3, actual_price),
            notes = COALESCE($4, notes)
        WHERE id = $1
        "#,
    )
    .bind(item_id)
    .bind(update.is_purchased)
    .bind(update.actual_price)
    .bind(update.notes.as_deref())
    .execute(db)
    .await
    .context("update shopping item")?;
    if updated.rows_affected() == 0 {
        return Ok(None);
    }

    let row = sqlx::query_as::<_, ShoppingItemRow>(&format!("{ITEM_SELECT} WHERE si.id = $1"))
        .bind(item_id)
        .fetch_optional(db)
        .await
        .context("reload shopping item")?;
    Ok(row.map(ShoppingItem::from))
}

pub async fn set_completed(db: &PgPool, id: Uuid, is_completed: bool) -> anyhow::Result<bool> {
    let updated = sqlx::query("UPDATE shopping_lists SET is_completed = $2 WHERE id = $1")
        .bind(id)
        .bind(is_completed)
        .execute(db)
        .await
        .context("complete shopping list")?;
    Ok(updated.rows_affected() > 0)
}

/// Items go with the list through `ON DELETE CASCADE`.
pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let deleted = sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
        .bind(id)
        .execute(db)
        .await
        .context("delete shopping list")?;
    Ok(deleted.rows_affected() > 0)
}
