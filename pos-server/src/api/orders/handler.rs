//! Order API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Deserialize;
use shared::client::MessageResponse;

use crate::core::ServerState;
use crate::db::models::{DiningTable, Order, OrderCreate, OrderItemsUpdate, OrderStatusUpdate};
use crate::db::repository::OrderRepository;
use crate::orders::OrderService;
use crate::orders::service::table_number_of;
use crate::reports::{SalesSummary, export_filename, sales_summary, write_sales_csv};
use crate::utils::time::{DateInput, day_end_millis, parse_date, today};
use crate::utils::{AppError, AppResult};

/// POST /api/orders - 创建订单
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(&state).create(payload).await?;
    Ok(Json(order))
}

/// GET /api/orders/today - 今日订单 (最新在前)
pub async fn list_today(State(state): State<ServerState>) -> AppResult<Json<Vec<Order>>> {
    let date = today(state.config.timezone);
    let orders = OrderService::new(&state).list_by_date(date).await?;
    Ok(Json(orders))
}

/// GET /api/orders/date/{date} - 指定日期的订单
pub async fn list_by_date(
    State(state): State<ServerState>,
    Path(date): Path<String>,
) -> AppResult<Json<Vec<Order>>> {
    let date = parse_date(&date)?;
    let orders = OrderService::new(&state).list_by_date(date).await?;
    Ok(Json(orders))
}

/// GET /api/orders/tables - 所有桌台 (按桌号)
pub async fn list_tables(State(state): State<ServerState>) -> AppResult<Json<Vec<DiningTable>>> {
    let tables = OrderService::new(&state).list_tables().await?;
    Ok(Json(tables))
}

/// GET /api/orders/table/{table_id} - 桌台当前未结订单, 无则 null
pub async fn get_table_order(
    State(state): State<ServerState>,
    Path(table_id): Path<String>,
) -> AppResult<Json<Option<Order>>> {
    let number = table_number_of(&table_id).ok_or_else(|| {
        AppError::validation(format!("Invalid table id: {}", table_id))
            .with_detail("field", "table_id")
    })?;
    let order = OrderService::new(&state).open_order_for_table(number).await?;
    Ok(Json(order))
}

/// GET /api/orders/{id} - 获取订单
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(&state).get(&id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/status - 更新订单状态
pub async fn update_status(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(&state)
        .update_status(&id, payload.status)
        .await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/items - 替换订单商品
pub async fn update_items(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<OrderItemsUpdate>,
) -> AppResult<Json<Order>> {
    let order = OrderService::new(&state)
        .update_items(&id, payload.items)
        .await?;
    Ok(Json(order))
}

/// DELETE /api/orders/{id} - 删除订单 (回补库存, 释放桌台)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    OrderService::new(&state).delete(&id).await?;
    Ok(Json(MessageResponse::new("Order deleted successfully")))
}

/// GET /api/orders/summary/{date} - 日销售汇总
pub async fn summary(
    State(state): State<ServerState>,
    Path(date): Path<String>,
) -> AppResult<Json<SalesSummary>> {
    let date = parse_date(&date)?;
    let orders = OrderService::new(&state).list_by_date(date).await?;
    Ok(Json(sales_summary(date, &orders)))
}

/// Export request body
#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    #[serde(alias = "startDate")]
    pub start_date: DateInput,
    #[serde(alias = "endDate")]
    pub end_date: DateInput,
}

fn date_label(input: &DateInput) -> String {
    match input {
        DateInput::Millis(ms) => ms.to_string(),
        DateInput::Text(text) => text.trim().to_string(),
    }
}

/// Exclusive upper bound: a plain date covers its whole business day
fn range_end_millis(input: &DateInput, tz: Tz) -> AppResult<i64> {
    if let DateInput::Text(text) = input
        && let Ok(date) = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
    {
        return Ok(day_end_millis(date, tz));
    }
    Ok(input.to_millis(tz)? + 1)
}

/// POST /api/orders/export - 导出销售明细 CSV
pub async fn export(
    State(state): State<ServerState>,
    Json(req): Json<ExportRequest>,
) -> AppResult<Response> {
    let tz = state.config.timezone;
    let start = req.start_date.to_millis(tz)?;
    let end = range_end_millis(&req.end_date, tz)?;
    if end <= start {
        return Err(AppError::validation("endDate must not be before startDate"));
    }

    let mut orders = OrderRepository::new(state.get_db())
        .find_in_range(start, end)
        .await?;
    // 导出按时间正序
    orders.reverse();

    let csv = write_sales_csv(&orders, tz)
        .map_err(|e| AppError::internal(format!("Failed to write CSV: {}", e)))?;
    let filename = export_filename(&date_label(&req.start_date), &date_label(&req.end_date));

    tracing::info!(orders = orders.len(), filename = %filename, "Sales exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response())
}
