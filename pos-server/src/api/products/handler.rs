//! Product API Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{Path, State},
};
use shared::client::MessageResponse;
use shared::error::ErrorCode;

use crate::core::ServerState;
use crate::db::models::{
    Product, ProductCreate, ProductDetail, ProductUpdate, Stock, StockItemDetail, StockItemRef,
};
use crate::db::repository::{ProductRepository, RepoError, StockRepository};
use crate::orders::money::{MAX_PRICE, round_money};
use crate::utils::time::now_millis;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_URL_LEN, validate_non_negative, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

fn product_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {} not found", id))
}

fn validate_price(value: f64, field: &str) -> AppResult<f64> {
    if !value.is_finite() || !(0.0..=MAX_PRICE).contains(&value) {
        return Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("{field} must be between 0 and {MAX_PRICE}, got {value}"),
        )
        .with_detail("field", field));
    }
    Ok(round_money(value))
}

/// 校验配方行并将 stock_id 规范为 "stock:xxx"
async fn resolve_stock_items(
    stocks: &StockRepository,
    items: Vec<StockItemRef>,
) -> AppResult<Vec<StockItemRef>> {
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        validate_non_negative(item.quantity_per_unit, "quantity_per_unit")?;
        let stock = stocks.find_by_id(&item.stock_id).await?.ok_or_else(|| {
            AppError::with_message(
                ErrorCode::StockNotFound,
                format!("Stock {} not found", item.stock_id),
            )
            .with_detail("stock_id", item.stock_id.clone())
        })?;
        resolved.push(StockItemRef {
            stock_id: stock.id_string(),
            quantity_per_unit: item.quantity_per_unit,
        });
    }
    Ok(resolved)
}

fn to_detail(product: Product, stocks: &HashMap<String, Stock>) -> ProductDetail {
    let id = product.id_string();
    ProductDetail {
        id,
        name: product.name,
        price: product.price,
        base_price: product.base_price,
        category: product.category,
        image: product.image,
        stock_items: product
            .stock_items
            .into_iter()
            .map(|item| StockItemDetail {
                stock: stocks.get(&item.stock_id).cloned(),
                stock_id: item.stock_id,
                quantity_per_unit: item.quantity_per_unit,
            })
            .collect(),
        created_at: product.created_at,
    }
}

async fn stock_index(state: &ServerState) -> AppResult<HashMap<String, Stock>> {
    let stocks = StockRepository::new(state.get_db()).find_all().await?;
    Ok(stocks.into_iter().map(|s| (s.id_string(), s)).collect())
}

/// GET /api/products - 获取所有商品 (含库存详情)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ProductDetail>>> {
    let products = ProductRepository::new(state.get_db()).find_all().await?;
    let stocks = stock_index(&state).await?;
    Ok(Json(
        products.into_iter().map(|p| to_detail(p, &stocks)).collect(),
    ))
}

/// GET /api/products/{id} - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductDetail>> {
    let product = ProductRepository::new(state.get_db())
        .find_by_id(&id)
        .await?
        .ok_or_else(|| product_not_found(&id))?;
    let stocks = stock_index(&state).await?;
    Ok(Json(to_detail(product, &stocks)))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ProductDetail>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    let price = payload
        .price
        .ok_or_else(|| AppError::validation("price is required").with_detail("field", "price"))?;
    let price = validate_price(price, "price")?;
    let base_price = validate_price(payload.base_price, "base_price")?;

    // 配方校验到写入期间持锁, 防止引用的库存被同时删除
    let guard = state.ledger_lock.lock().await;
    let stocks = StockRepository::new(state.get_db());
    let stock_items = resolve_stock_items(&stocks, payload.stock_items).await?;

    let product = ProductRepository::new(state.get_db())
        .create(Product {
            id: None,
            name: payload.name.trim().to_string(),
            price,
            base_price,
            category: payload.category,
            image: payload.image,
            stock_items,
            created_at: now_millis(),
        })
        .await?;
    drop(guard);

    tracing::info!(product_id = %product.id_string(), name = %product.name, "Product created");
    let index = stock_index(&state).await?;
    Ok(Json(to_detail(product, &index)))
}

/// PUT /api/products/{id} - 更新商品 (部分字段)
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(mut payload): Json<ProductUpdate>,
) -> AppResult<Json<ProductDetail>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
        payload.name = Some(name.trim().to_string());
    }
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        payload.price = Some(validate_price(price, "price")?);
    }
    if let Some(base_price) = payload.base_price {
        payload.base_price = Some(validate_price(base_price, "base_price")?);
    }

    let guard = state.ledger_lock.lock().await;
    if let Some(items) = payload.stock_items.take() {
        let stocks = StockRepository::new(state.get_db());
        payload.stock_items = Some(resolve_stock_items(&stocks, items).await?);
    }

    let product = ProductRepository::new(state.get_db())
        .update(&id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => product_not_found(&id),
            other => other.into(),
        })?;
    drop(guard);

    tracing::info!(product_id = %product.id_string(), "Product updated");
    let index = stock_index(&state).await?;
    Ok(Json(to_detail(product, &index)))
}

/// DELETE /api/products/{id} - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let deleted = ProductRepository::new(state.get_db()).delete(&id).await?;
    if !deleted {
        return Err(product_not_found(&id));
    }
    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(MessageResponse::new("Product deleted successfully")))
}
