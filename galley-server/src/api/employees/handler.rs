//! Employee API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::employee;
use crate::models::{Employee, EmployeeCreate};
use crate::utils::AppResult;

/// GET /employees - Staff roster
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Employee>>> {
    let employees = employee::find_all(&state.pool).await?;
    Ok(Json(employees))
}

/// POST /employees - Register a staff member
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    let employee = employee::create(&state.pool, payload).await?;
    Ok(Json(employee))
}
