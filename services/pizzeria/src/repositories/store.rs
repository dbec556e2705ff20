//! Store repository for database operations

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::error::AppResult;
use crate::models::Store;

/// Store repository; stores are read-only in this service
#[derive(Clone)]
pub struct StoreRepository {
    pool: PgPool,
}

impl StoreRepository {
    /// Create a new store repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every store
    pub async fn list(&self) -> AppResult<Vec<Store>> {
        let rows = sqlx::query(
            r#"
            SELECT store_id, address, city, state, is_open
            FROM stores
            ORDER BY store_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(map_store).collect())
    }

    /// Find a store by its identifier
    pub async fn find_by_id(&self, store_id: &str) -> AppResult<Option<Store>> {
        let row = sqlx::query(
            r#"
            SELECT store_id, address, city, state, is_open
            FROM stores
            WHERE store_id = $1
            "#,
        )
        .bind(store_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_store))
    }
}

fn map_store(row: PgRow) -> Store {
    Store {
        store_id: row.get("store_id"),
        address: row.get("address"),
        city: row.get("city"),
        state: row.get("state"),
        is_open: row.get("is_open"),
    }
}
