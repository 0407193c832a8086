//! Transaction Repository
//!
//! Settled POS payments. Income stats are derived from the live list the
//! same way the financial dashboard consumes them.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::models::{Transaction, TransactionCreate, TransactionStats};
use crate::utils::{now_millis, snowflake_id};

#[derive(Debug, sqlx::FromRow)]
struct TransactionRow {
    id: i64,
    amount: f64,
    payment_method: String,
    order_type: String,
    items: String,
    subtotal: f64,
    tax: f64,
    cashier_name: Option<String>,
    created_at: i64,
}

impl TransactionRow {
    fn into_transaction(self) -> Transaction {
        Transaction {
            id: self.id,
            amount: self.amount,
            payment_method: self.payment_method,
            order_type: self.order_type,
            items: serde_json::from_str(&self.items)
                .unwrap_or_else(|_| serde_json::Value::Array(Vec::new())),
            subtotal: self.subtotal,
            tax: self.tax,
            cashier_name: self.cashier_name,
            created_at: self.created_at,
        }
    }
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Transaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, amount, payment_method, order_type, items, subtotal, tax, cashier_name, created_at FROM transactions ORDER BY created_at DESC",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(TransactionRow::into_transaction)
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Transaction>> {
    let row = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, amount, payment_method, order_type, items, subtotal, tax, cashier_name, created_at FROM transactions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(TransactionRow::into_transaction))
}

pub async fn find_recent(pool: &SqlitePool, limit: i64) -> RepoResult<Vec<Transaction>> {
    let rows = sqlx::query_as::<_, TransactionRow>(
        "SELECT id, amount, payment_method, order_type, items, subtotal, tax, cashier_name, created_at FROM transactions ORDER BY created_at DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(TransactionRow::into_transaction)
        .collect())
}

pub async fn create(pool: &SqlitePool, data: TransactionCreate) -> RepoResult<Transaction> {
    let id = snowflake_id();
    let now = now_millis();

    sqlx::query(
        "INSERT INTO transactions (id, amount, payment_method, order_type, items, subtotal, tax, cashier_name, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(id)
    .bind(data.amount)
    .bind(&data.payment_method)
    .bind(&data.order_type)
    .bind(data.items.to_string())
    .bind(data.subtotal)
    .bind(data.tax)
    .bind(&data.cashier_name)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create transaction".into()))
}

/// Income summary over all transactions. Only 'Cash' and 'QRIS' have their
/// own buckets; other payment methods count toward the totals alone.
pub async fn stats(pool: &SqlitePool) -> RepoResult<TransactionStats> {
    let transactions = find_all(pool).await?;

    let cash: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.payment_method == "Cash")
        .collect();
    let qris: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| t.payment_method == "QRIS")
        .collect();

    Ok(TransactionStats {
        total_income: transactions.iter().map(|t| t.amount).sum(),
        total_count: transactions.len() as i64,
        cash_income: cash.iter().map(|t| t.amount).sum(),
        qris_income: qris.iter().map(|t| t.amount).sum(),
        cash_count: cash.len() as i64,
        qris_count: qris.len() as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE transactions (
                id INTEGER PRIMARY KEY,
                amount REAL NOT NULL,
                payment_method TEXT NOT NULL,
                order_type TEXT NOT NULL,
                items TEXT NOT NULL DEFAULT '[]',
                subtotal REAL NOT NULL DEFAULT 0,
                tax REAL NOT NULL DEFAULT 0,
                cashier_name TEXT,
                created_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        pool
    }

    fn sample(amount: f64, method: &str) -> TransactionCreate {
        TransactionCreate {
            amount,
            payment_method: method.to_string(),
            order_type: "Here".to_string(),
            items: serde_json::json!([{"name": "Nasi Goreng", "qty": 1}]),
            subtotal: amount,
            tax: 0.0,
            cashier_name: Some("Sari".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_round_trips_items() {
        let pool = test_pool().await;
        let t = create(&pool, sample(25_000.0, "Cash")).await.unwrap();
        assert_eq!(t.amount, 25_000.0);
        assert_eq!(t.items[0]["name"], "Nasi Goreng");
        assert_eq!(t.cashier_name.as_deref(), Some("Sari"));
    }

    #[tokio::test]
    async fn test_stats_buckets_by_payment_method() {
        let pool = test_pool().await;
        create(&pool, sample(10_000.0, "Cash")).await.unwrap();
        create(&pool, sample(15_000.0, "Cash")).await.unwrap();
        create(&pool, sample(20_000.0, "QRIS")).await.unwrap();
        // A method outside the two buckets still counts toward the totals
        create(&pool, sample(5_000.0, "Card")).await.unwrap();

        let stats = stats(&pool).await.unwrap();
        assert_eq!(stats.total_income, 50_000.0);
        assert_eq!(stats.total_count, 4);
        assert_eq!(stats.cash_income, 25_000.0);
        assert_eq!(stats.cash_count, 2);
        assert_eq!(stats.qris_income, 20_000.0);
        assert_eq!(stats.qris_count, 1);
    }

    #[tokio::test]
    async fn test_stats_empty() {
        let pool = test_pool().await;
        let stats = stats(&pool).await.unwrap();
        assert_eq!(stats.total_income, 0.0);
        assert_eq!(stats.total_count, 0);
    }

    #[tokio::test]
    async fn test_recent_limits_and_orders_newest_first() {
        let pool = test_pool().await;
        for i in 1..=12 {
            sqlx::query(
                "INSERT INTO transactions (id, amount, payment_method, order_type, created_at) VALUES (?1, ?2, 'Cash', 'Here', ?3)",
            )
            .bind(i)
            .bind(i as f64 * 1000.0)
            .bind(i * 100)
            .execute(&pool)
            .await
            .unwrap();
        }

        let recent = find_recent(&pool, 10).await.unwrap();
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].id, 12);
        assert_eq!(recent[9].id, 3);
    }

    #[tokio::test]
    async fn test_malformed_items_fall_back_to_empty_array() {
        let pool = test_pool().await;
        sqlx::query(
            "INSERT INTO transactions (id, amount, payment_method, order_type, items, created_at) VALUES (1, 100, 'Cash', 'Here', '{oops', 1000)",
        )
        .execute(&pool)
        .await
        .unwrap();

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all[0].items, serde_json::json!([]));
    }
}
