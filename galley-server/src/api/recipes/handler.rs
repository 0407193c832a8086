//! Recipe API Handlers
//!
//! Multipart forms like products; the `ingredients` form field carries a
//! JSON array string (`[{"productId": 1, "quantity": 0.2}, ...]`). An
//! `ingredients` field that is present but `[]` wipes all lines on update,
//! while an absent field leaves lines untouched.

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::api::images;
use crate::core::ServerState;
use crate::db::repository::recipe;
use crate::models::{IngredientLineInput, RecipeCreate, RecipeDetail, RecipeUpdate};
use crate::utils::{AppError, AppResult};

/// Scalar fields collected from the multipart form
#[derive(Default)]
struct RecipeForm {
    name: Option<String>,
    category: Option<String>,
    image: Option<String>,
    yield_portions: Option<f64>,
    ingredients: Option<Vec<IngredientLineInput>>,
}

fn parse_number(field: &str, raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Field '{field}' must be a number, got '{raw}'")))
}

fn parse_lines(raw: &str) -> AppResult<Vec<IngredientLineInput>> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::validation(format!("Field 'ingredients' must be a JSON array: {e}")))
}

async fn parse_form(multipart: &mut Multipart, upload_dir: &str) -> AppResult<RecipeForm> {
    let mut form = RecipeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "category" => form.category = Some(field.text().await?),
            "yield" => form.yield_portions = Some(parse_number("yield", &field.text().await?)?),
            "ingredients" => form.ingredients = Some(parse_lines(&field.text().await?)?),
            "image" => {
                let original_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await?;
                if data.is_empty() {
                    continue;
                }
                let original_name = original_name
                    .ok_or_else(|| AppError::validation("No filename provided in image field"))?;
                form.image = Some(images::save_upload(upload_dir, &original_name, &data)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// GET /recipes - All recipes with hydrated ingredient lines
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<RecipeDetail>>> {
    let recipes = recipe::find_all(&state.pool).await?;
    Ok(Json(recipes))
}

/// GET /recipes/:id - One hydrated recipe
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RecipeDetail>> {
    let detail = recipe::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Recipe {id} not found")))?;
    Ok(Json(detail))
}

/// POST /recipes - Create a recipe with its ingredient lines
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<RecipeDetail>> {
    let form = parse_form(&mut multipart, &state.config.upload_dir).await?;
    let name = form
        .name
        .ok_or_else(|| AppError::validation("Field 'name' is required"))?;

    let payload = RecipeCreate {
        name,
        category: form.category,
        image: form.image,
        yield_portions: form.yield_portions.unwrap_or(1.0),
        ingredients: form.ingredients.unwrap_or_default(),
    };

    let detail = recipe::create(&state.pool, payload).await?;
    Ok(Json(detail))
}

/// PUT /recipes/:id - Update scalars and optionally replace all lines
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<RecipeDetail>> {
    let form = parse_form(&mut multipart, &state.config.upload_dir).await?;

    let payload = RecipeUpdate {
        name: form.name,
        category: form.category,
        image: form.image,
        yield_portions: form.yield_portions,
        ingredients: form.ingredients,
    };

    let detail = recipe::update(&state.pool, id, payload).await?;
    Ok(Json(detail))
}

/// DELETE /recipes/:id - Remove a recipe and its lines
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = recipe::delete(&state.pool, id).await?;
    Ok(Json(result))
}
