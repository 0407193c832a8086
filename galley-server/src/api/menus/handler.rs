//! Menu API Handlers
//!
//! JSON bodies. A `productionQuantity > 0` on create runs the production
//! step (ingredient debit, menu stock credit) inside the create
//! transaction; update never re-produces.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::core::ServerState;
use crate::db::repository::menu;
use crate::models::{MenuCreate, MenuDetail, MenuListItem, MenuUpdate};
use crate::utils::{AppError, AppResult};

/// GET /menus - Every menu annotated with availability
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<MenuListItem>>> {
    let menus = menu::find_all(&state.pool).await?;
    Ok(Json(menus))
}

/// GET /menus/:id - One hydrated menu
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuDetail>> {
    let detail = menu::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Menu {id} not found")))?;
    Ok(Json(detail))
}

/// POST /menus - Create from a recipe snapshot or ad-hoc lines
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<Json<MenuDetail>> {
    let detail = menu::create(&state.pool, payload, state.config.allow_negative_stock).await?;
    Ok(Json(detail))
}

/// PATCH /menus/:id - Update scalars and optionally replace all lines
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<Json<MenuDetail>> {
    let detail = menu::update(&state.pool, id, payload).await?;
    Ok(Json(detail))
}

/// DELETE /menus/:id - Remove a menu and its lines
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let result = menu::delete(&state.pool, id).await?;
    Ok(Json(result))
}
