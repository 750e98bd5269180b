//! Client API Handlers

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Order, OrderItemInput, PromoSlide};
use crate::db::repository::PromoRepository;
use crate::orders::OrderService;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

/// Self-order request body
#[derive(Debug, Deserialize)]
pub struct ClientOrderRequest {
    #[serde(default, alias = "tableNumber")]
    pub table_number: Option<u32>,
    #[serde(default)]
    pub items: Option<Vec<OrderItemInput>>,
}

/// POST /api/client/order - 顾客下单 (pending, 价格取自商品目录)
pub async fn create_order(
    State(state): State<ServerState>,
    Json(req): Json<ClientOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    let (Some(table_number), Some(items)) = (req.table_number, req.items) else {
        return Err(AppError::validation(
            "Please provide a table number and items for the order",
        ));
    };
    if table_number == 0 || items.is_empty() {
        return Err(AppError::validation(
            "Please provide a table number and items for the order",
        ));
    }

    let order = OrderService::new(&state)
        .create_client_order(table_number, items)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/client/promos - 当前有效的促销轮播
pub async fn list_promos(State(state): State<ServerState>) -> AppResult<Json<Vec<PromoSlide>>> {
    let slides = PromoRepository::new(state.get_db())
        .find_visible(now_millis())
        .await?;
    Ok(Json(slides))
}
