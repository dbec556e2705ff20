//! Catalog item repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::info;

use crate::catalog::MenuFilter;
use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::{Item, NewItem, UpdateItem};

/// Catalog item repository
#[derive(Clone)]
pub struct ItemRepository {
    pool: PgPool,
}

impl ItemRepository {
    /// Create a new item repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List catalog items matching the given filter state
    pub async fn list(&self, filter: &MenuFilter) -> AppResult<Vec<Item>> {
        let mut query = filter.build_query();
        let rows = query.build().fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(map_item).collect())
    }

    /// Find an item by its name
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<Item>> {
        let row = sqlx::query(
            r#"
            SELECT name, ingredients, item_type, price, description
            FROM items
            WHERE name = $1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_item))
    }

    /// Add a new item to the catalog (manager only)
    pub async fn create(&self, new_item: &NewItem) -> AppResult<Item> {
        info!("Adding catalog item: {}", new_item.name);

        let result = sqlx::query(
            r#"
            INSERT INTO items (name, ingredients, item_type, price, description)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&new_item.name)
        .bind(&new_item.ingredients)
        .bind(&new_item.item_type)
        .bind(new_item.price)
        .bind(&new_item.description)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(Item {
                name: new_item.name.clone(),
                ingredients: new_item.ingredients.clone(),
                item_type: new_item.item_type.clone(),
                price: new_item.price,
                description: new_item.description.clone(),
            }),
            Err(e) if is_unique_violation(&e) => Err(AppError::Validation(format!(
                "Item {} already exists.",
                new_item.name
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply an update to an item, one field per statement (manager only)
    pub async fn update(&self, name: &str, update: &UpdateItem) -> AppResult<()> {
        info!("Updating catalog item: {}", name);

        if let Some(ingredients) = &update.ingredients {
            self.set_text_field(name, "ingredients", ingredients).await?;
        }

        if let Some(item_type) = &update.item_type {
            self.set_text_field(name, "item_type", item_type).await?;
        }

        if let Some(price) = update.price {
            let result = sqlx::query(r#"UPDATE items SET price = $2 WHERE name = $1"#)
                .bind(name)
                .bind(price)
                .execute(&self.pool)
                .await?;
            if result.rows_affected() == 0 {
                return Err(AppError::NotFound("Item"));
            }
        }

        if let Some(description) = &update.description {
            self.set_text_field(name, "description", description).await?;
        }

        Ok(())
    }

    async fn set_text_field(&self, name: &str, column: &'static str, value: &str) -> AppResult<()> {
        // column names come from a fixed set above, values are bound
        let sql = format!("UPDATE items SET {} = $2 WHERE name = $1", column);
        let result = sqlx::query(&sql)
            .bind(name)
            .bind(value)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item"));
        }
        Ok(())
    }
}

fn map_item(row: PgRow) -> Item {
    Item {
        name: row.get("name"),
        ingredients: row.get("ingredients"),
        item_type: row.get("item_type"),
        price: row.get("price"),
        description: row.get("description"),
    }
}
