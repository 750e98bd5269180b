//! Order API Module
//!
//! 订单、桌台查询、日销售汇总和 CSV 导出

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

/// Order router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/today", get(handler::list_today))
        .route("/date/{date}", get(handler::list_by_date))
        .route("/tables", get(handler::list_tables))
        .route("/table/{table_id}", get(handler::get_table_order))
        .route("/summary/{date}", get(handler::summary))
        .route("/export", post(handler::export))
        .route("/{id}", get(handler::get_by_id).delete(handler::delete))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/items", put(handler::update_items))
}
