//! Recipe Repository
//!
//! Recipes are templates: ingredient lines in, `yield_portions` finished
//! portions out per batch. Every referenced product must exist before any
//! row is written; parent row and lines are written in one transaction.

use std::collections::HashMap;

use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use crate::models::{
    IngredientLine, IngredientLineInput, Product, Recipe, RecipeCreate, RecipeDetail, RecipeUpdate,
};
use crate::utils::{now_millis, snowflake_id};

#[derive(Debug, sqlx::FromRow)]
struct RecipeLineRow {
    id: i64,
    recipe_id: i64,
    quantity: f64,
    product_id: i64,
    product_name: String,
    product_category: String,
    product_price: f64,
    product_stock: f64,
    product_min_stock: f64,
    product_unit: String,
    product_image: Option<String>,
    product_created_at: i64,
    product_updated_at: i64,
}

impl RecipeLineRow {
    fn into_line(self) -> IngredientLine {
        IngredientLine {
            id: self.id,
            quantity: self.quantity,
            product: Product {
                id: self.product_id,
                name: self.product_name,
                category: self.product_category,
                price: self.product_price,
                stock: self.product_stock,
                min_stock: self.product_min_stock,
                unit: self.product_unit,
                image: self.product_image,
                created_at: self.product_created_at,
                updated_at: self.product_updated_at,
            },
        }
    }
}

const LINE_SELECT: &str = "SELECT ri.id, ri.recipe_id, ri.quantity,
        p.id AS product_id, p.name AS product_name, p.category AS product_category,
        p.price AS product_price, p.stock AS product_stock, p.min_stock AS product_min_stock,
        p.unit AS product_unit, p.image AS product_image,
        p.created_at AS product_created_at, p.updated_at AS product_updated_at
 FROM recipe_ingredients ri
 JOIN products p ON p.id = ri.product_id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<RecipeDetail>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        "SELECT id, name, category, image, yield_portions, created_at, updated_at FROM recipes ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let sql = format!("{} ORDER BY ri.recipe_id, ri.id", LINE_SELECT);
    let rows = sqlx::query_as::<_, RecipeLineRow>(&sql)
        .fetch_all(pool)
        .await?;

    let mut line_map: HashMap<i64, Vec<IngredientLine>> = HashMap::new();
    for row in rows {
        line_map
            .entry(row.recipe_id)
            .or_default()
            .push(row.into_line());
    }

    Ok(recipes
        .into_iter()
        .map(|recipe| {
            let ingredients = line_map.remove(&recipe.id).unwrap_or_default();
            RecipeDetail {
                recipe,
                ingredients,
            }
        })
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<RecipeDetail>> {
    let Some(recipe) = sqlx::query_as::<_, Recipe>(
        "SELECT id, name, category, image, yield_portions, created_at, updated_at FROM recipes WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let sql = format!("{} WHERE ri.recipe_id = ? ORDER BY ri.id", LINE_SELECT);
    let rows = sqlx::query_as::<_, RecipeLineRow>(&sql)
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(Some(RecipeDetail {
        recipe,
        ingredients: rows.into_iter().map(RecipeLineRow::into_line).collect(),
    }))
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "SELECT id, name, category, image, yield_portions, created_at, updated_at FROM recipes WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(recipe)
}

pub async fn create(pool: &SqlitePool, data: RecipeCreate) -> RepoResult<RecipeDetail> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Recipe \"{}\" already exists",
            data.name
        )));
    }

    validate_lines(pool, &data.ingredients).await?;

    let now = now_millis();
    let id = snowflake_id();

    let mut tx = pool.begin().await?;
    sqlx::query(
        "INSERT INTO recipes (id, name, category, image, yield_portions, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(&data.image)
    .bind(data.yield_portions)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for line in &data.ingredients {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, product_id, quantity) VALUES (?1, ?2, ?3)",
        )
        .bind(id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create recipe".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: RecipeUpdate) -> RepoResult<RecipeDetail> {
    if let Some(ref lines) = data.ingredients {
        validate_lines(pool, lines).await?;
    }

    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE recipes SET name = COALESCE(?1, name), category = COALESCE(?2, category), image = COALESCE(?3, image), yield_portions = COALESCE(?4, yield_portions), updated_at = ?5 WHERE id = ?6",
    )
    .bind(&data.name)
    .bind(&data.category)
    .bind(&data.image)
    .bind(data.yield_portions)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Recipe {id} not found")));
    }

    if let Some(ref lines) = data.ingredients {
        replace_lines(&mut tx, id, lines).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Recipe {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

// ── Line helpers ──

/// Every referenced product must exist before any row is written
pub(super) async fn validate_lines(
    pool: &SqlitePool,
    lines: &[IngredientLineInput],
) -> RepoResult<()> {
    for line in lines {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE id = ?")
            .bind(line.product_id)
            .fetch_one(pool)
            .await?;
        if count == 0 {
            return Err(RepoError::Validation(format!(
                "Product with ID {} not found",
                line.product_id
            )));
        }
    }
    Ok(())
}

async fn replace_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    recipe_id: i64,
    lines: &[IngredientLineInput],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;
    for line in lines {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, product_id, quantity) VALUES (?1, ?2, ?3)",
        )
        .bind(recipe_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
