//! Menu Repository
//!
//! Menus are sellable catalog entries with their own producible-portion
//! stock counter. Creating from a recipe snapshots the recipe's yield and
//! lines at that moment; later recipe edits never propagate. Production
//! (debit ingredients, credit menu stock) runs in the same transaction as
//! the menu row so a mid-sequence failure rolls everything back.

use std::collections::HashMap;

use sqlx::SqlitePool;

use super::{RepoError, RepoResult, product, recipe};
use crate::models::{
    IngredientLine, IngredientLineInput, Menu, MenuCreate, MenuDetail, MenuListItem, MenuUpdate,
    Product,
};
use crate::utils::{now_millis, snowflake_id};

#[derive(Debug, sqlx::FromRow)]
struct MenuLineRow {
    id: i64,
    menu_id: i64,
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

impl MenuLineRow {
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

const LINE_SELECT: &str = "SELECT mi.id, mi.menu_id, mi.quantity,
        p.id AS product_id, p.name AS product_name, p.category AS product_category,
        p.price AS product_price, p.stock AS product_stock, p.min_stock AS product_min_stock,
        p.unit AS product_unit, p.image AS product_image,
        p.created_at AS product_created_at, p.updated_at AS product_updated_at
 FROM menu_ingredients mi
 JOIN products p ON p.id = mi.product_id";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<MenuListItem>> {
    let menus = sqlx::query_as::<_, Menu>(
        "SELECT id, name, category, price, image, yield_portions, recipe_id, stock, created_at, updated_at FROM menus ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    let sql = format!("{} ORDER BY mi.menu_id, mi.id", LINE_SELECT);
    let rows = sqlx::query_as::<_, MenuLineRow>(&sql)
        .fetch_all(pool)
        .await?;

    let mut line_map: HashMap<i64, Vec<IngredientLine>> = HashMap::new();
    for row in rows {
        line_map
            .entry(row.menu_id)
            .or_default()
            .push(row.into_line());
    }

    Ok(menus
        .into_iter()
        .map(|menu| {
            let ingredients = line_map.remove(&menu.id).unwrap_or_default();
            let is_available = menu.stock > 0.0;
            let available_quantity = menu.stock;
            MenuListItem {
                detail: MenuDetail { menu, ingredients },
                is_available,
                available_quantity,
            }
        })
        .collect())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<MenuDetail>> {
    let Some(menu) = sqlx::query_as::<_, Menu>(
        "SELECT id, name, category, price, image, yield_portions, recipe_id, stock, created_at, updated_at FROM menus WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    else {
        return Ok(None);
    };

    let sql = format!("{} WHERE mi.menu_id = ? ORDER BY mi.id", LINE_SELECT);
    let rows = sqlx::query_as::<_, MenuLineRow>(&sql)
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(Some(MenuDetail {
        menu,
        ingredients: rows.into_iter().map(MenuLineRow::into_line).collect(),
    }))
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Menu>> {
    let menu = sqlx::query_as::<_, Menu>(
        "SELECT id, name, category, price, image, yield_portions, recipe_id, stock, created_at, updated_at FROM menus WHERE name = ? LIMIT 1",
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(menu)
}

pub async fn create(
    pool: &SqlitePool,
    data: MenuCreate,
    allow_negative_stock: bool,
) -> RepoResult<MenuDetail> {
    if find_by_name(pool, &data.name).await?.is_some() {
        return Err(RepoError::Duplicate(format!(
            "Menu \"{}\" already exists",
            data.name
        )));
    }

    // Snapshot the line set. A resolvable recipe contributes its yield and
    // lines and any raw `ingredients` are ignored; an unresolvable recipeId
    // leaves the menu line-less rather than falling back to them.
    let mut yield_portions = 1.0;
    let mut lines: Vec<IngredientLineInput> = Vec::new();
    if let Some(recipe_id) = data.recipe_id {
        if let Some(detail) = recipe::find_by_id(pool, recipe_id).await? {
            yield_portions = detail.recipe.yield_portions;
            lines = detail
                .ingredients
                .iter()
                .map(|l| IngredientLineInput {
                    product_id: l.product.id,
                    quantity: l.quantity,
                })
                .collect();
        }
    } else {
        lines = data.ingredients;
    }

    let now = now_millis();
    let id = snowflake_id();
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO menus (id, name, category, price, image, yield_portions, recipe_id, stock, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8, ?8)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(&data.image)
    .bind(yield_portions)
    .bind(data.recipe_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for line in &lines {
        sqlx::query(
            "INSERT INTO menu_ingredients (menu_id, product_id, quantity) VALUES (?1, ?2, ?3)",
        )
        .bind(id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut *tx)
        .await?;
    }

    // Production: debit the ledger per line, then credit finished portions
    let production = data.production_quantity.unwrap_or(0.0);
    if !lines.is_empty() && production > 0.0 {
        for line in &lines {
            product::adjust_stock(
                &mut tx,
                line.product_id,
                -(line.quantity * production),
                allow_negative_stock,
            )
            .await?;
        }
        sqlx::query("UPDATE menus SET stock = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(production * yield_portions)
            .bind(now)
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create menu".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: MenuUpdate) -> RepoResult<MenuDetail> {
    let mut tx = pool.begin().await?;
    let rows = sqlx::query(
        "UPDATE menus SET name = COALESCE(?1, name), category = COALESCE(?2, category), price = COALESCE(?3, price), image = COALESCE(?4, image), recipe_id = COALESCE(?5, recipe_id), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.name)
    .bind(&data.category)
    .bind(data.price)
    .bind(&data.image)
    .bind(data.recipe_id)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Menu {id} not found")));
    }

    if let Some(ref lines) = data.ingredients {
        replace_lines(&mut tx, id, lines).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Menu {id} not found")))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM menu_ingredients WHERE menu_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let rows = sqlx::query("DELETE FROM menus WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(rows.rows_affected() > 0)
}

async fn replace_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    menu_id: i64,
    lines: &[IngredientLineInput],
) -> RepoResult<()> {
    sqlx::query("DELETE FROM menu_ingredients WHERE menu_id = ?")
        .bind(menu_id)
        .execute(&mut **tx)
        .await?;
    for line in lines {
        sqlx::query(
            "INSERT INTO menu_ingredients (menu_id, product_id, quantity) VALUES (?1, ?2, ?3)",
        )
        .bind(menu_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RecipeCreate, RecipeUpdate};
    use sqlx::sqlite::SqlitePoolOptions;

    /// In-memory pool with the full catalog schema, seeded with three
    /// ingredients.
    async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();

        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();

        sqlx::query(
            "CREATE TABLE products (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL DEFAULT '',
                price REAL NOT NULL DEFAULT 0,
                stock REAL NOT NULL DEFAULT 0,
                min_stock REAL NOT NULL DEFAULT 0,
                unit TEXT NOT NULL DEFAULT '',
                image TEXT,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE recipes (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                category TEXT,
                image TEXT,
                yield_portions REAL NOT NULL DEFAULT 1,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE recipe_ingredients (
                id INTEGER PRIMARY KEY,
                recipe_id INTEGER NOT NULL REFERENCES recipes(id),
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                quantity REAL NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE menus (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                category TEXT NOT NULL DEFAULT '',
                price REAL NOT NULL DEFAULT 0,
                image TEXT,
                yield_portions REAL NOT NULL DEFAULT 1,
                recipe_id INTEGER,
                stock REAL NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL DEFAULT 0,
                updated_at INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query(
            "CREATE TABLE menu_ingredients (
                id INTEGER PRIMARY KEY,
                menu_id INTEGER NOT NULL REFERENCES menus(id),
                product_id INTEGER NOT NULL REFERENCES products(id) ON DELETE CASCADE,
                quantity REAL NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        // Seed: three ingredients
        sqlx::query("INSERT INTO products (id, name, stock, unit) VALUES (1, 'Rice', 10, 'kg')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO products (id, name, stock, unit) VALUES (2, 'Egg', 30, 'pcs')")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO products (id, name, stock, unit) VALUES (3, 'Oil', 5, 'l')")
            .execute(&pool)
            .await
            .unwrap();

        pool
    }

    fn line(product_id: i64, quantity: f64) -> IngredientLineInput {
        IngredientLineInput {
            product_id,
            quantity,
        }
    }

    fn base_menu(name: &str) -> MenuCreate {
        MenuCreate {
            name: name.to_string(),
            category: "Main".to_string(),
            price: 25_000.0,
            image: None,
            recipe_id: None,
            production_quantity: None,
            ingredients: vec![],
        }
    }

    async fn seed_recipe(pool: &SqlitePool, yield_portions: f64) -> i64 {
        let detail = recipe::create(
            pool,
            RecipeCreate {
                name: format!("Recipe y{yield_portions}"),
                category: None,
                image: None,
                yield_portions,
                ingredients: vec![line(1, 0.5), line(2, 2.0)],
            },
        )
        .await
        .unwrap();
        detail.recipe.id
    }

    async fn product_stock(pool: &SqlitePool, id: i64) -> f64 {
        product::find_by_id(pool, id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_create_from_recipe_snapshots_yield_and_lines() {
        let pool = test_pool().await;
        let recipe_id = seed_recipe(&pool, 2.0).await;

        let mut data = base_menu("Nasi Goreng");
        data.recipe_id = Some(recipe_id);
        // Raw lines are ignored when the recipe resolves
        data.ingredients = vec![line(3, 9.0)];

        let detail = create(&pool, data, true).await.unwrap();
        assert_eq!(detail.menu.yield_portions, 2.0);
        assert_eq!(detail.menu.recipe_id, Some(recipe_id));
        assert_eq!(detail.menu.stock, 0.0);
        assert_eq!(detail.ingredients.len(), 2);
        assert_eq!(detail.ingredients[0].product.name, "Rice");
        assert_eq!(detail.ingredients[0].quantity, 0.5);
    }

    #[tokio::test]
    async fn test_production_stock_math() {
        // yield 4, batch 3: menu stock 12, each ingredient debited qty * 3
        let pool = test_pool().await;
        let recipe_id = seed_recipe(&pool, 4.0).await;

        let mut data = base_menu("Nasi Goreng");
        data.recipe_id = Some(recipe_id);
        data.production_quantity = Some(3.0);

        let detail = create(&pool, data, true).await.unwrap();
        assert_eq!(detail.menu.stock, 12.0);
        assert_eq!(product_stock(&pool, 1).await, 10.0 - 0.5 * 3.0);
        assert_eq!(product_stock(&pool, 2).await, 30.0 - 2.0 * 3.0);
    }

    #[tokio::test]
    async fn test_production_fractional_debit() {
        // yield 2, one 0.2 kg line, 5 batches: stock 10, rice down exactly 1.0
        let pool = test_pool().await;
        let detail = recipe::create(
            &pool,
            RecipeCreate {
                name: "Fried Rice".to_string(),
                category: None,
                image: None,
                yield_portions: 2.0,
                ingredients: vec![line(1, 0.2)],
            },
        )
        .await
        .unwrap();

        let mut data = base_menu("Fried Rice Menu");
        data.recipe_id = Some(detail.recipe.id);
        data.production_quantity = Some(5.0);

        let menu = create(&pool, data, true).await.unwrap();
        assert_eq!(menu.menu.stock, 10.0);
        assert_eq!(product_stock(&pool, 1).await, 9.0);
    }

    #[tokio::test]
    async fn test_production_can_drive_stock_negative() {
        // Oil has 5 in stock but production needs 6. With the permissive
        // policy the run succeeds and the ledger goes to -1. Documents the
        // behavior the default configuration runs with.
        let pool = test_pool().await;
        let mut data = base_menu("Deep Fry Special");
        data.ingredients = vec![line(3, 2.0)];
        data.production_quantity = Some(3.0);

        let detail = create(&pool, data, true).await.unwrap();
        assert_eq!(detail.menu.stock, 3.0);
        assert_eq!(product_stock(&pool, 3).await, -1.0);
    }

    #[tokio::test]
    async fn test_guarded_production_rolls_back_whole_create() {
        // Rice line succeeds, Oil line overdraws. The strict policy must
        // roll back the menu row, its lines and the Rice debit together.
        let pool = test_pool().await;
        let mut data = base_menu("Doomed Menu");
        data.ingredients = vec![line(1, 1.0), line(3, 2.0)];
        data.production_quantity = Some(3.0);

        let err = create(&pool, data, false).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        assert!(find_by_name(&pool, "Doomed Menu").await.unwrap().is_none());
        assert_eq!(product_stock(&pool, 1).await, 10.0);
        assert_eq!(product_stock(&pool, 3).await, 5.0);
        let orphans = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_ingredients")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_create_with_raw_lines_uses_yield_one() {
        let pool = test_pool().await;
        let mut data = base_menu("Scrambled Eggs");
        data.ingredients = vec![line(2, 3.0)];
        data.production_quantity = Some(4.0);

        let detail = create(&pool, data, true).await.unwrap();
        assert_eq!(detail.menu.yield_portions, 1.0);
        assert_eq!(detail.menu.stock, 4.0);
        assert_eq!(product_stock(&pool, 2).await, 30.0 - 12.0);
    }

    #[tokio::test]
    async fn test_unresolvable_recipe_leaves_menu_lineless() {
        let pool = test_pool().await;
        let mut data = base_menu("Ghost Recipe Menu");
        data.recipe_id = Some(9999);
        data.ingredients = vec![line(1, 1.0)];
        data.production_quantity = Some(2.0);

        let detail = create(&pool, data, true).await.unwrap();
        assert!(detail.ingredients.is_empty());
        assert_eq!(detail.menu.yield_portions, 1.0);
        assert_eq!(detail.menu.stock, 0.0);
        assert_eq!(product_stock(&pool, 1).await, 10.0);
    }

    #[tokio::test]
    async fn test_production_without_lines_is_a_noop() {
        let pool = test_pool().await;
        let mut data = base_menu("Water");
        data.production_quantity = Some(5.0);

        let detail = create(&pool, data, true).await.unwrap();
        assert_eq!(detail.menu.stock, 0.0);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_rejected() {
        let pool = test_pool().await;
        create(&pool, base_menu("Nasi Goreng"), true).await.unwrap();
        let err = create(&pool, base_menu("Nasi Goreng"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
        assert_eq!(find_all(&pool).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_ad_hoc_line_fails_and_rolls_back() {
        // Ad-hoc lines are not pre-validated; the foreign key rejects them
        // and the transaction discards the half-written menu.
        let pool = test_pool().await;
        let mut data = base_menu("Bad Lines");
        data.ingredients = vec![line(9999, 1.0)];

        let err = create(&pool, data, true).await.unwrap_err();
        assert!(matches!(err, RepoError::Database(_)));
        assert!(find_by_name(&pool, "Bad Lines").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_never_reproduces() {
        let pool = test_pool().await;
        let recipe_id = seed_recipe(&pool, 2.0).await;
        let mut data = base_menu("Nasi Goreng");
        data.recipe_id = Some(recipe_id);
        data.production_quantity = Some(2.0);
        let detail = create(&pool, data, true).await.unwrap();
        assert_eq!(detail.menu.stock, 4.0);

        let updated = update(
            &pool,
            detail.menu.id,
            MenuUpdate {
                price: Some(30_000.0),
                ingredients: Some(vec![line(3, 1.0)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // Price and lines changed; stock, yield and the ledger did not
        assert_eq!(updated.menu.price, 30_000.0);
        assert_eq!(updated.ingredients.len(), 1);
        assert_eq!(updated.menu.stock, 4.0);
        assert_eq!(updated.menu.yield_portions, 2.0);
        assert_eq!(product_stock(&pool, 3).await, 5.0);
    }

    #[tokio::test]
    async fn test_update_empty_lines_wipes_absent_keeps() {
        let pool = test_pool().await;
        let mut data = base_menu("Nasi Goreng");
        data.ingredients = vec![line(1, 1.0), line(2, 2.0)];
        let detail = create(&pool, data, true).await.unwrap();

        let updated = update(
            &pool,
            detail.menu.id,
            MenuUpdate {
                name: Some("Nasi Goreng Spesial".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.ingredients.len(), 2);

        let updated = update(
            &pool,
            detail.menu.id,
            MenuUpdate {
                ingredients: Some(vec![]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(updated.ingredients.is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_id() {
        let pool = test_pool().await;
        let err = update(&pool, 9999, MenuUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_later_recipe_edits_do_not_propagate() {
        let pool = test_pool().await;
        let recipe_id = seed_recipe(&pool, 2.0).await;
        let mut data = base_menu("Nasi Goreng");
        data.recipe_id = Some(recipe_id);
        let detail = create(&pool, data, true).await.unwrap();

        recipe::update(
            &pool,
            recipe_id,
            RecipeUpdate {
                yield_portions: Some(9.0),
                ingredients: Some(vec![line(3, 7.0)]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let after = find_by_id(&pool, detail.menu.id).await.unwrap().unwrap();
        assert_eq!(after.menu.yield_portions, 2.0);
        assert_eq!(after.ingredients.len(), 2);
        assert_eq!(after.ingredients[0].product.name, "Rice");
    }

    #[tokio::test]
    async fn test_delete_leaves_no_orphan_lines() {
        let pool = test_pool().await;
        let mut data = base_menu("Nasi Goreng");
        data.ingredients = vec![line(1, 1.0)];
        let detail = create(&pool, data, true).await.unwrap();

        assert!(delete(&pool, detail.menu.id).await.unwrap());
        assert!(find_by_id(&pool, detail.menu.id).await.unwrap().is_none());
        let orphans =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menu_ingredients WHERE menu_id = ?")
                .bind(detail.menu.id)
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test]
    async fn test_find_all_availability_tracks_stock() {
        let pool = test_pool().await;
        let mut produced = base_menu("Produced");
        produced.ingredients = vec![line(1, 1.0)];
        produced.production_quantity = Some(3.0);
        create(&pool, produced, true).await.unwrap();
        create(&pool, base_menu("Unproduced"), true).await.unwrap();

        let all = find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 2);

        let produced = all.iter().find(|m| m.detail.menu.name == "Produced").unwrap();
        assert!(produced.is_available);
        assert_eq!(produced.available_quantity, 3.0);
        assert_eq!(produced.available_quantity, produced.detail.menu.stock);

        let unproduced = all.iter().find(|m| m.detail.menu.name == "Unproduced").unwrap();
        assert!(!unproduced.is_available);
        assert_eq!(unproduced.available_quantity, 0.0);
    }
}
