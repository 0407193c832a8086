//! Order Repository
//!
//! Kitchen orders. The `items` column holds the cart as raw JSON text;
//! it round-trips as an opaque value and is never interpreted here.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::models::{Order, OrderCreate};
use crate::utils::{now_millis, snowflake_id};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    customer_name: String,
    total_amount: f64,
    status: String,
    items: Option<String>,
    order_type: Option<String>,
    payment_method: Option<String>,
    created_at: i64,
}

impl OrderRow {
    fn into_order(self) -> Order {
        Order {
            id: self.id,
            customer_name: self.customer_name,
            total_amount: self.total_amount,
            status: self.status,
            items: self.items.and_then(|s| serde_json::from_str(&s).ok()),
            order_type: self.order_type,
            payment_method: self.payment_method,
            created_at: self.created_at,
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(
        "SELECT id, customer_name, total_amount, status, items, order_type, payment_method, created_at FROM orders ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(OrderRow::into_order).collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(
        "SELECT id, customer_name, total_amount, status, items, order_type, payment_method, created_at FROM orders WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(OrderRow::into_order))
}

pub async fn create(pool: &SqlitePool, data: OrderCreate) -> RepoResult<Order> {
    let id = snowflake_id();
    let now = now_millis();
    let status = data.status.unwrap_or_else(|| "pending".to_string());
    let items = data.items.map(|v| v.to_string());

    sqlx::query(
        "INSERT INTO orders (id, customer_name, total_amount, status, items, order_type, payment_method, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    )
    .bind(id)
    .bind(&data.customer_name)
    .bind(data.total_amount)
    .bind(&status)
    .bind(&items)
    .bind(&data.order_type)
    .bind(&data.payment_method)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create order".into()))
}

pub async fn update_status(pool: &SqlitePool, id: i64, status: &str) -> RepoResult<Order> {
    let rows = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
}
