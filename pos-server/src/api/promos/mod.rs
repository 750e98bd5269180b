//! Promo Slide API Module

mod handler;

use axum::{Router, middleware, routing::get, routing::put};

use crate::auth::require_admin;
use crate::core::ServerState;

/// Promo router - 管理员专用 (顾客端只读接口见 client 模块)
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/promos", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_admin))
}
