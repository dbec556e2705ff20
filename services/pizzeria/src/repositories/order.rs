//! Order repository: identity generation and lifecycle
//!
//! Order identifiers are drawn from a large random space and inserted
//! under the table's primary key; a collision rolls the whole creation
//! back and retries with a fresh candidate. The order row and its lines
//! are written in one transaction, so a partially persisted order can
//! never be observed.

use rand::Rng;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tracing::{info, warn};

use crate::error::{AppError, AppResult, is_unique_violation};
use crate::models::{NewOrder, Order, OrderDetail, OrderLine, OrderScope, OrderStatus, Role};

/// Attempts before identifier allocation gives up
const MAX_ID_ATTEMPTS: u32 = 5;

/// Order repository
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    /// Create a new order repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a submitted cart as an order with a fresh unique id.
    ///
    /// Returns the allocated order id. Collisions are retried
    /// internally and never surfaced to the caller.
    pub async fn create(&self, new_order: &NewOrder) -> AppResult<i64> {
        if new_order.lines.is_empty() {
            return Err(AppError::Validation(
                "An order needs at least one item".to_string(),
            ));
        }

        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate: i64 = rand::thread_rng().gen_range(1..=i64::MAX);

            match self.try_insert(candidate, new_order).await {
                Ok(()) => {
                    info!(
                        "Created order {} for {} at store {}",
                        candidate, new_order.login, new_order.store_id
                    );
                    return Ok(candidate);
                }
                Err(AppError::Conflict) => {
                    warn!("Order id collision on {}, retrying", candidate);
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Conflict)
    }

    /// Insert the order row and all of its lines in one transaction
    async fn try_insert(&self, order_id: i64, new_order: &NewOrder) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO orders (order_id, login, store_id, total_price, created_at, status)
            VALUES ($1, $2, $3, $4, now(), 'incomplete')
            "#,
        )
        .bind(order_id)
        .bind(&new_order.login)
        .bind(&new_order.store_id)
        .bind(new_order.total_price)
        .execute(&mut *tx)
        .await;

        if let Err(e) = inserted {
            // dropping the transaction rolls it back
            if is_unique_violation(&e) {
                return Err(AppError::Conflict);
            }
            return Err(e.into());
        }

        for line in &new_order.lines {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, item_name, quantity)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(order_id)
            .bind(&line.item_name)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Set an order's status. Idempotent: re-applying the current status
    /// succeeds. Fails with NotFound when the order does not exist.
    pub async fn update_status(&self, order_id: i64, status: OrderStatus) -> AppResult<()> {
        let result = sqlx::query(r#"UPDATE orders SET status = $2 WHERE order_id = $1"#)
            .bind(order_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Order"));
        }

        info!("Order {} status set to {}", order_id, status);
        Ok(())
    }

    /// List orders for a requester, most recent first.
    ///
    /// Customers are confined to their own orders no matter which scope
    /// they ask for.
    pub async fn list(
        &self,
        requester: &str,
        role: Role,
        scope: OrderScope,
    ) -> AppResult<Vec<Order>> {
        let scope = if role == Role::Customer {
            match scope {
                OrderScope::All | OrderScope::Own => OrderScope::Own,
                OrderScope::Recent(n) | OrderScope::OwnRecent(n) => OrderScope::OwnRecent(n),
            }
        } else {
            scope
        };

        let rows = match scope {
            OrderScope::All => {
                sqlx::query(
                    r#"
                    SELECT order_id, login, store_id, total_price, created_at, status
                    FROM orders
                    ORDER BY created_at DESC
                    "#,
                )
                .fetch_all(&self.pool)
                .await?
            }
            OrderScope::Recent(n) => {
                sqlx::query(
                    r#"
                    SELECT order_id, login, store_id, total_price, created_at, status
                    FROM orders
                    ORDER BY created_at DESC
                    LIMIT $1
                    "#,
                )
                .bind(n)
                .fetch_all(&self.pool)
                .await?
            }
            OrderScope::Own => {
                sqlx::query(
                    r#"
                    SELECT order_id, login, store_id, total_price, created_at, status
                    FROM orders
                    WHERE login = $1
                    ORDER BY created_at DESC
                    "#,
                )
                .bind(requester)
                .fetch_all(&self.pool)
                .await?
            }
            OrderScope::OwnRecent(n) => {
                sqlx::query(
                    r#"
                    SELECT order_id, login, store_id, total_price, created_at, status
                    FROM orders
                    WHERE login = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#,
                )
                .bind(requester)
                .bind(n)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(map_order).collect()
    }

    /// Fetch one order with its lines.
    ///
    /// A customer asking for another customer's order gets NotFound,
    /// indistinguishable from a nonexistent order.
    pub async fn detail(
        &self,
        order_id: i64,
        requester: &str,
        role: Role,
    ) -> AppResult<OrderDetail> {
        let row = sqlx::query(
            r#"
            SELECT order_id, login, store_id, total_price, created_at, status
            FROM orders
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

        let order = map_order(row)?;

        if role == Role::Customer && order.login != requester {
            return Err(AppError::NotFound("Order"));
        }

        let lines = sqlx::query(
            r#"
            SELECT item_name, quantity
            FROM order_lines
            WHERE order_id = $1
            ORDER BY item_name
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| OrderLine {
            item_name: row.get("item_name"),
            quantity: row.get("quantity"),
        })
        .collect();

        Ok(OrderDetail { order, lines })
    }
}

fn map_order(row: PgRow) -> AppResult<Order> {
    let status: String = row.get("status");
    Ok(Order {
        order_id: row.get("order_id"),
        login: row.get("login"),
        store_id: row.get("store_id"),
        total_price: row.get("total_price"),
        created_at: row.get("created_at"),
        status: status
            .parse()
            .map_err(|e: String| AppError::Store(sqlx::Error::Decode(e.into())))?,
    })
}
