//! Credit API Module
//!
//! 赊账客户、赊账订单和还款

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Credit router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/credits", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/customers",
            get(handler::list_customers).post(handler::create_customer),
        )
        .route("/customers/{id}/summary", get(handler::customer_summary))
        .route("/orders", get(handler::list_orders).post(handler::create_order))
        .route("/orders/{id}", get(handler::get_order))
        .route("/orders/{id}/payments", post(handler::create_payment))
}
