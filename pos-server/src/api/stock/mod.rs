//! Stock API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Stock router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stock", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/alerts/low", get(handler::low_stock))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/adjust", post(handler::adjust))
        .route("/{id}/movements", get(handler::movements))
}
