//! Expense API Module

mod handler;

use axum::{Router, routing::get, routing::put};

use crate::core::ServerState;

/// Expense router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/expenses", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/today", get(handler::list_today))
        .route("/week", get(handler::list_week))
        .route("/month", get(handler::list_month))
        .route("/summary/{date}", get(handler::summary))
        .route("/{id}", put(handler::update).delete(handler::delete))
}
