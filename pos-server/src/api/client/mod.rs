//! Client API Module
//!
//! 顾客自助点餐 - 公共路由 (require_auth 放行 /api/client/*)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Client router
pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/client/order", post(handler::create_order))
        .route("/api/client/promos", get(handler::list_promos))
}
