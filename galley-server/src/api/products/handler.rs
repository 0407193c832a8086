//! Product API Handlers
//!
//! Create and update arrive as multipart forms (the inventory UI submits
//! FormData so an image file can ride along with the scalar fields).

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::api::images;
use crate::core::ServerState;
use crate::db::repository::product;
use crate::models::{Product, ProductCreate, ProductStats, ProductUpdate};
use crate::utils::{AppError, AppResult};

/// Scalar fields collected from the multipart form
#[derive(Default)]
struct ProductForm {
    name: Option<String>,
    category: Option<String>,
    price: Option<f64>,
    stock: Option<f64>,
    min_stock: Option<f64>,
    unit: Option<String>,
    image: Option<String>,
}

fn parse_number(field: &str, raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::validation(format!("Field '{field}' must be a number, got '{raw}'")))
}

/// Walk the multipart fields. The image file is stored as a side effect and
/// its public path lands in `form.image`. Unknown fields are skipped;
/// malformed numbers are a validation error.
async fn parse_form(multipart: &mut Multipart, upload_dir: &str) -> AppResult<ProductForm> {
    let mut form = ProductForm::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        match name.as_str() {
            "name" => form.name = Some(field.text().await?),
            "category" => form.category = Some(field.text().await?),
            "price" => form.price = Some(parse_number("price", &field.text().await?)?),
            "stock" => form.stock = Some(parse_number("stock", &field.text().await?)?),
            "minStock" => form.min_stock = Some(parse_number("minStock", &field.text().await?)?),
            "unit" => form.unit = Some(field.text().await?),
            "image" => {
                let original_name = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await?;
                // An empty file part means no image was chosen
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

/// GET /products - List all ingredients
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let products = product::find_all(&state.pool).await?;
    Ok(Json(products))
}

/// GET /products/stats - Stock level summary for the dashboard
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<ProductStats>> {
    let stats = product::stats(&state.pool).await?;
    Ok(Json(stats))
}

/// POST /products - Create an ingredient
pub async fn create(
    State(state): State<ServerState>,
    mut multipart: Multipart,
) -> AppResult<Json<Product>> {
    let form = parse_form(&mut multipart, &state.config.upload_dir).await?;
    let name = form
        .name
        .ok_or_else(|| AppError::validation("Field 'name' is required"))?;

    let payload = ProductCreate {
        name,
        category: form.category.unwrap_or_default(),
        price: form.price.unwrap_or(0.0),
        stock: form.stock.unwrap_or(0.0),
        min_stock: form.min_stock.unwrap_or(0.0),
        unit: form.unit.unwrap_or_default(),
        image: form.image,
    };

    let product = product::create(&state.pool, payload).await?;
    Ok(Json(product))
}

/// PATCH /products/:id - Partial update
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<Product>> {
    let form = parse_form(&mut multipart, &state.config.upload_dir).await?;

    let payload = ProductUpdate {
        name: form.name,
        category: form.category,
        price: form.price,
        stock: form.stock,
        min_stock: form.min_stock,
        unit: form.unit,
        image: form.image,
    };

    let product = product::update(&state.pool, id, payload).await?;
    Ok(Json(product))
}

/// DELETE /products/:id - Remove an ingredient (dependent lines cascade)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = product::delete(&state.pool, id).await?;
    Ok(Json(result))
}
