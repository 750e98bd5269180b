//! Stock API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use shared::client::MessageResponse;
use shared::error::ErrorCode;
use shared::models::{MovementType, ReferenceType};

use crate::core::ServerState;
use crate::db::models::{Stock, StockAdjust, StockCreate, StockMovement, StockUpdate, StockUsage};
use crate::db::repository::{
    ProductRepository, RepoError, StockMovementRepository, StockRepository,
};
use crate::inventory::StockLedger;
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_non_negative, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Movements returned by the history endpoint
const MOVEMENT_HISTORY_LIMIT: usize = 50;

fn stock_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::StockNotFound, format!("Stock {} not found", id))
}

async fn find_stock(repo: &StockRepository, id: &str) -> AppResult<Stock> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| stock_not_found(id))
}

/// GET /api/stock - 获取所有库存
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Stock>>> {
    let items = StockRepository::new(state.get_db()).find_all().await?;
    Ok(Json(items))
}

/// GET /api/stock/alerts/low - 低库存预警 (current <= minimum)
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<Stock>>> {
    let items = StockRepository::new(state.get_db()).find_low().await?;
    Ok(Json(items))
}

/// GET /api/stock/{id} - 获取单个库存
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Stock>> {
    let stock = find_stock(&StockRepository::new(state.get_db()), &id).await?;
    Ok(Json(stock))
}

/// POST /api/stock - 创建库存
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StockCreate>,
) -> AppResult<Json<Stock>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.unit, "unit", MAX_SHORT_TEXT_LEN)?;
    validate_non_negative(payload.current_quantity, "current_quantity")?;
    validate_non_negative(payload.minimum_quantity, "minimum_quantity")?;
    validate_non_negative(payload.cost_per_unit, "cost_per_unit")?;

    let stock = StockRepository::new(state.get_db())
        .create(Stock {
            id: None,
            name: payload.name.trim().to_string(),
            category: payload.category.trim().to_string(),
            unit: payload.unit.trim().to_string(),
            current_quantity: payload.current_quantity,
            minimum_quantity: payload.minimum_quantity,
            cost_per_unit: payload.cost_per_unit,
            last_updated: now_millis(),
        })
        .await?;

    tracing::info!(stock_id = %stock.id_string(), name = %stock.name, "Stock item created");
    Ok(Json(stock))
}

/// PUT /api/stock/{id} - 更新库存 (部分字段)
///
/// 数量变化记为 `adjustment` 流水
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(mut payload): Json<StockUpdate>,
) -> AppResult<Json<Stock>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    if let Some(category) = &payload.category {
        validate_required_text(category, "category", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(unit) = &payload.unit {
        validate_required_text(unit, "unit", MAX_SHORT_TEXT_LEN)?;
    }
    for (value, field) in [
        (payload.current_quantity, "current_quantity"),
        (payload.minimum_quantity, "minimum_quantity"),
        (payload.cost_per_unit, "cost_per_unit"),
    ] {
        if let Some(v) = value {
            validate_non_negative(v, field)?;
        }
    }

    let repo = StockRepository::new(state.get_db());
    let _guard = state.ledger_lock.lock().await;

    let existing = find_stock(&repo, &id).await?;
    let stock_id = existing.id_string();

    if let Some(target) = payload.current_quantity.take() {
        let delta = target - existing.current_quantity;
        if delta != 0.0 {
            let ledger = StockLedger::new(state.get_db(), true);
            ledger
                .record(
                    &stock_id,
                    delta,
                    MovementType::Adjustment,
                    Some((ReferenceType::Manual, stock_id.as_str())),
                )
                .await?;
        }
    }

    let stock = repo.update(&stock_id, payload).await.map_err(|e| match e {
        RepoError::NotFound(_) => stock_not_found(&id),
        other => other.into(),
    })?;

    tracing::info!(stock_id = %stock_id, "Stock item updated");
    Ok(Json(stock))
}

/// DELETE /api/stock/{id} - 删除库存 (被商品配方引用时拒绝)
///
/// 与商品配方写入共用 ledger_lock, 引用检查和删除之间不会插入新配方
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let repo = StockRepository::new(state.get_db());
    let _guard = state.ledger_lock.lock().await;
    let stock = find_stock(&repo, &id).await?;
    let stock_id = stock.id_string();

    let users = ProductRepository::new(state.get_db())
        .find_using_stock(&stock_id)
        .await?;
    if !users.is_empty() {
        let names: Vec<String> = users.into_iter().map(|p| p.name).collect();
        return Err(AppError::with_message(
            ErrorCode::StockInUse,
            format!("Stock {} is used by {} product(s)", stock.name, names.len()),
        )
        .with_detail("products", names));
    }

    if !repo.delete(&stock_id).await? {
        return Err(stock_not_found(&id));
    }

    tracing::info!(stock_id = %stock_id, name = %stock.name, "Stock item deleted");
    Ok(Json(MessageResponse::new("Stock item deleted successfully")))
}

/// Adjustment result
#[derive(Debug, Serialize)]
pub struct AdjustResponse {
    pub stock: Stock,
    pub movement: StockMovement,
}

/// POST /api/stock/{id}/adjust - 手动调整库存
pub async fn adjust(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<StockAdjust>,
) -> AppResult<Json<AdjustResponse>> {
    if !payload.quantity.is_finite() || payload.quantity == 0.0 {
        return Err(AppError::validation("quantity must be a non-zero number")
            .with_detail("field", "quantity"));
    }
    let reference = match (payload.reference_type, payload.reference_id.as_deref()) {
        (Some(t), Some(rid)) => Some((t, rid)),
        (None, Some(rid)) => Some((ReferenceType::Manual, rid)),
        (Some(_), None) => {
            return Err(AppError::validation("reference_id is required with reference_type")
                .with_detail("field", "reference_id"));
        }
        (None, None) => None,
    };

    let repo = StockRepository::new(state.get_db());
    let ledger = StockLedger::new(state.get_db(), state.config.allow_negative_stock);
    let _guard = state.ledger_lock.lock().await;

    let stock_id = find_stock(&repo, &id).await?.id_string();
    if payload.quantity < 0.0 {
        ledger
            .check_available(&[StockUsage {
                stock_id: stock_id.clone(),
                quantity: -payload.quantity,
            }])
            .await?;
    }

    let movement_type = payload.movement_type.unwrap_or(MovementType::Adjustment);
    let (stock, movement) = ledger
        .record(&stock_id, payload.quantity, movement_type, reference)
        .await?;

    tracing::info!(
        stock_id = %stock_id,
        quantity = payload.quantity,
        movement_type = ?movement_type,
        current_quantity = stock.current_quantity,
        "Stock adjusted"
    );
    Ok(Json(AdjustResponse { stock, movement }))
}

/// GET /api/stock/{id}/movements - 最近 50 条库存流水
pub async fn movements(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<StockMovement>>> {
    let stock = find_stock(&StockRepository::new(state.get_db()), &id).await?;
    let movements = StockMovementRepository::new(state.get_db())
        .find_by_stock(&stock.id_string(), MOVEMENT_HISTORY_LIMIT)
        .await?;
    Ok(Json(movements))
}
