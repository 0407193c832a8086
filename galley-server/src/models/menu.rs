//! Menu Model
//!
//! A menu is a sellable catalog entry carrying its own producible-portion
//! stock counter. Menus created from a recipe snapshot the recipe's yield
//! and ingredient lines at creation time; later recipe edits do not
//! propagate.

use serde::{Deserialize, Serialize};

use super::recipe::{IngredientLine, IngredientLineInput};

/// Menu entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub image: Option<String>,
    #[serde(rename = "yield")]
    pub yield_portions: f64,
    pub recipe_id: Option<i64>,
    pub stock: f64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create menu payload. `recipeId` wins over raw `ingredients` when both
/// are present; `productionQuantity > 0` triggers an immediate production
/// run after the lines are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MenuCreate {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub price: f64,
    pub image: Option<String>,
    pub recipe_id: Option<i64>,
    pub production_quantity: Option<f64>,
    #[serde(default)]
    pub ingredients: Vec<IngredientLineInput>,
}

/// Update menu payload. Never re-produces: yield and stock are not
/// settable here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MenuUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub recipe_id: Option<i64>,
    pub ingredients: Option<Vec<IngredientLineInput>>,
}

/// Menu with its ingredient lines hydrated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuDetail {
    #[serde(flatten)]
    pub menu: Menu,
    pub ingredients: Vec<IngredientLine>,
}

/// Menu list entry with sell-side availability derived from stock
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuListItem {
    #[serde(flatten)]
    pub detail: MenuDetail,
    pub is_available: bool,
    pub available_quantity: f64,
}
