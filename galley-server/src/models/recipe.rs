//! Recipe Model
//!
//! A recipe is a named template: ingredient lines in, `yield` finished
//! portions out per batch. The `yield` JSON key maps to `yield_portions`
//! internally (keyword clash).

use serde::{Deserialize, Serialize};

use super::product::Product;

/// Recipe entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "yield")]
    pub yield_portions: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Ingredient line with the referenced product embedded (detail views)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientLine {
    pub id: i64,
    pub quantity: f64,
    pub product: Product,
}

/// Ingredient line payload: `{productId, quantity}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IngredientLineInput {
    pub product_id: i64,
    pub quantity: f64,
}

/// Create recipe payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCreate {
    pub name: String,
    pub category: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "yield")]
    pub yield_portions: f64,
    #[serde(default)]
    pub ingredients: Vec<IngredientLineInput>,
}

/// Update recipe payload. `ingredients: Some(vec![])` wipes all lines;
/// `None` leaves existing lines untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    #[serde(rename = "yield")]
    pub yield_portions: Option<f64>,
    pub ingredients: Option<Vec<IngredientLineInput>>,
}

/// Recipe with its ingredient lines hydrated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: Recipe,
    pub ingredients: Vec<IngredientLine>,
}
