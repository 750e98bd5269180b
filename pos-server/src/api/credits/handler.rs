//! Credit API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use crate::core::ServerState;
use crate::credits::CreditService;
use crate::credits::service::PaymentReceipt;
use crate::db::models::{
    CreditCustomer, CreditCustomerCreate, CreditCustomerSummary, CreditOrder, CreditOrderCreate,
    CreditOrderDetail, CreditOrderQuery, CreditOrderWithCustomer, CreditPaymentCreate,
};
use crate::utils::AppResult;

/// GET /api/credits/customers - 赊账客户列表
pub async fn list_customers(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<CreditCustomer>>> {
    let customers = CreditService::new(&state).list_customers().await?;
    Ok(Json(customers))
}

/// POST /api/credits/customers - 新建赊账客户 (名称唯一)
pub async fn create_customer(
    State(state): State<ServerState>,
    Json(payload): Json<CreditCustomerCreate>,
) -> AppResult<Json<CreditCustomer>> {
    let customer = CreditService::new(&state).create_customer(payload).await?;
    Ok(Json(customer))
}

/// GET /api/credits/customers/{id}/summary - 客户赊账汇总
pub async fn customer_summary(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CreditCustomerSummary>> {
    let summary = CreditService::new(&state).customer_summary(&id).await?;
    Ok(Json(summary))
}

/// GET /api/credits/orders - 赊账订单 (可按客户/状态过滤)
pub async fn list_orders(
    State(state): State<ServerState>,
    Query(query): Query<CreditOrderQuery>,
) -> AppResult<Json<Vec<CreditOrderWithCustomer>>> {
    let orders = CreditService::new(&state).list_orders(query).await?;
    Ok(Json(orders))
}

/// POST /api/credits/orders - 新建赊账订单
pub async fn create_order(
    State(state): State<ServerState>,
    Json(payload): Json<CreditOrderCreate>,
) -> AppResult<Json<CreditOrder>> {
    let order = CreditService::new(&state).create_order(payload).await?;
    Ok(Json(order))
}

/// GET /api/credits/orders/{id} - 赊账订单及还款记录
pub async fn get_order(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<CreditOrderDetail>> {
    let detail = CreditService::new(&state).order_detail(&id).await?;
    Ok(Json(detail))
}

/// POST /api/credits/orders/{id}/payments - 还款
pub async fn create_payment(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<CreditPaymentCreate>,
) -> AppResult<Json<PaymentReceipt>> {
    let receipt = CreditService::new(&state).record_payment(&id, payload).await?;
    Ok(Json(receipt))
}
