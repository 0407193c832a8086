//! API Route Modules
//!
//! # Structure
//!
//! - [`health`] - liveness probes
//! - [`products`] - ingredient ledger (stock, stats)
//! - [`recipes`] - recipe catalog with ingredient lines
//! - [`menus`] - sellable menu catalog and production
//! - [`orders`] - kitchen order queue
//! - [`transactions`] - settled POS payments
//! - [`employees`] - staff roster
//! - [`images`] - multipart image storage helpers

pub mod health;
pub mod images;

// Data models API
pub mod products;
pub mod recipes;
pub mod menus;
pub mod orders;
pub mod transactions;
pub mod employees;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::core::ServerState;

/// Build the application router with every resource mounted
pub fn create_router(state: ServerState) -> Router {
    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .merge(health::router())
        .merge(products::router())
        .merge(recipes::router())
        .merge(menus::router())
        .merge(orders::router())
        .merge(transactions::router())
        .merge(employees::router())
        .with_state(state)
        .nest_service("/uploads", uploads)
        // Image uploads run to 5MB; leave headroom for the rest of the form
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
