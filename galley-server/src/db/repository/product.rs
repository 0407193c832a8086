//! Product Repository
//!
//! The ingredient ledger. Products are raw stock-tracked inputs; recipes
//! and menus reference them by id.

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::models::{LowStockItem, Product, ProductCreate, ProductStats, ProductUpdate, StatCard};
use crate::utils::{now_millis, snowflake_id};

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, category, price, stock, min_stock, unit, image, created_at, updated_at FROM products ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, category, price, stock, min_stock, unit, image, created_at, updated_at FROM products WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, category, price, stock, min_stock, unit, image, created_at, updated_at FROM products WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(product)
}

pub async fn create(pool: &SqlitePool, data: ProductCreate) -> RepoResult<Product> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Ingredient \"{}\" already exists",
            data.name
        )));
    }

    let now = now_millis();
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO products (id, name, category, price, stock, min_stock, unit, image, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.min_stock)
    .bind(&data.unit)
    .bind(&data.image)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create product".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: ProductUpdate) -> RepoResult<Product> {
    let rows = sqlx::query(
        "UPDATE products SET name = COALESCE(?1, name), category = COALESCE(?2, category), price = COALESCE(?3, price), stock = COALESCE(?4, stock), min_stock = COALESCE(?5, min_stock), unit = COALESCE(?6, unit), image = COALESCE(?7, image), updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(data.stock)
    .bind(data.min_stock)
    .bind(&data.unit)
    .bind(&data.image)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Apply a stock delta inside the caller's transaction.
///
/// With `allow_negative` the update is unconditional and stock can go
/// below zero. Without it, a debit that would overdraw the ledger affects
/// no rows and fails with Validation, rolling the caller back.
pub async fn adjust_stock(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
    delta: f64,
    allow_negative: bool,
) -> RepoResult<()> {
    let sql = if allow_negative {
        "UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3"
    } else {
        "UPDATE products SET stock = stock + ?1, updated_at = ?2 WHERE id = ?3 AND stock + ?1 >= 0"
    };
    let rows = sqlx::query(sql)
        .bind(delta)
        .bind(now_millis())
        .bind(id)
        .execute(&mut **tx)
        .await?;
    if rows.rows_affected() == 0 {
        if !allow_negative && find_by_id_tx(tx, id).await?.is_some() {
            return Err(RepoError::Validation(format!(
                "Insufficient stock for product {id}"
            )));
        }
        return Err(RepoError::NotFound(format!("Product {id} not found")));
    }
    Ok(())
}

async fn find_by_id_tx(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    id: i64,
) -> RepoResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(
        "SELECT id, name, category, price, stock, min_stock, unit, image, created_at, updated_at FROM products WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut **tx)
    .await?;
    Ok(product)
}

/// Derive the dashboard stats from the live product list.
///
/// Items at or below their minimum are listed in `low_stock_items`. For
/// the summary cards, stock <= 0 counts as out; the three buckets
/// partition the ledger, so Total == Available + Low + Out always holds.
pub async fn stats(pool: &SqlitePool) -> RepoResult<ProductStats> {
    let products = find_all(pool).await?;

    let total_items = products.len() as i64;
    let low_stock: Vec<&Product> = products.iter().filter(|p| p.stock <= p.min_stock).collect();
    let low_count = low_stock.iter().filter(|p| p.stock > 0.0).count() as i64;
    let out_count = low_stock.iter().filter(|p| p.stock <= 0.0).count() as i64;
    let available_count = total_items - low_stock.len() as i64;

    Ok(ProductStats {
        summary: vec![
            StatCard {
                label: "Total Items".into(),
                value: total_items,
                icon: "list".into(),
                color: "blue".into(),
            },
            StatCard {
                label: "Available Stock".into(),
                value: available_count,
                icon: "check".into(),
                color: "green".into(),
            },
            StatCard {
                label: "Low Stock".into(),
                value: low_count,
                icon: "alert".into(),
                color: "orange".into(),
            },
            StatCard {
                label: "Out of Stock".into(),
                value: out_count,
                icon: "error".into(),
                color: "red".into(),
            },
        ],
        low_stock_items: low_stock
            .iter()
            .map(|p| LowStockItem {
                id: p.id,
                name: p.name.clone(),
                stock: p.stock,
                min_stock: p.min_stock,
                unit: p.unit.clone(),
                image: p.image.clone(),
            })
            .collect(),
    })
}
