//! Transaction API Handlers

use axum::{Json, extract::State};

use crate::core::ServerState;
use crate::db::repository::transaction;
use crate::models::{Transaction, TransactionCreate, TransactionStats};
use crate::utils::AppResult;

/// How many transactions the POS sidebar shows
const RECENT_LIMIT: i64 = 10;

/// GET /transactions - All settled payments, newest first
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Transaction>>> {
    let transactions = transaction::find_all(&state.pool).await?;
    Ok(Json(transactions))
}

/// GET /transactions/stats - Income summary split by payment method
pub async fn stats(State(state): State<ServerState>) -> AppResult<Json<TransactionStats>> {
    let stats = transaction::stats(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /transactions/recent - The newest transactions
pub async fn recent(State(state): State<ServerState>) -> AppResult<Json<Vec<Transaction>>> {
    let transactions = transaction::find_recent(&state.pool, RECENT_LIMIT).await?;
    Ok(Json(transactions))
}

/// POST /transactions - Record a settled payment (never touches stock)
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionCreate>,
) -> AppResult<Json<Transaction>> {
    let transaction = transaction::create(&state.pool, payload).await?;
    Ok(Json(transaction))
}
