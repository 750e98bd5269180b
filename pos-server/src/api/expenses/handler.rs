//! Expense API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Deserialize;
use shared::client::MessageResponse;
use shared::error::ErrorCode;
use shared::models::{MovementType, ReferenceType};

use crate::core::ServerState;
use crate::db::models::{Expense, ExpenseCreate, ExpensePatch, ExpenseUpdate};
use crate::db::repository::{ExpenseRepository, RepoError, StockRepository};
use crate::inventory::StockLedger;
use crate::orders::OrderService;
use crate::orders::money::round_money;
use crate::reports::{DailyProfit, ExpensePeriod, daily_profit, expense_period};
use crate::utils::time::{
    day_end_millis, day_start_millis, month_start, now_millis, parse_date, today, week_start,
};
use crate::utils::validation::{MAX_NOTE_LEN, validate_non_negative, validate_required_text};
use crate::utils::{AppError, AppResult};

fn expense_not_found(id: &str) -> AppError {
    AppError::with_message(ErrorCode::ExpenseNotFound, format!("Expense {} not found", id))
}

/// Query of `GET /api/expenses`
#[derive(Debug, Default, Deserialize)]
pub struct ExpenseQuery {
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "endDate")]
    pub end_date: Option<String>,
}

/// GET /api/expenses - 支出列表 (可按日期区间, 含首尾两天)
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ExpenseQuery>,
) -> AppResult<Json<Vec<Expense>>> {
    let tz = state.config.timezone;
    let repo = ExpenseRepository::new(state.get_db());

    let start = query.start_date.as_deref().map(parse_date).transpose()?;
    let end = query.end_date.as_deref().map(parse_date).transpose()?;

    let expenses = match (start, end) {
        (None, None) => repo.find_all().await?,
        (start, end) => {
            let from = start.map_or(i64::MIN, |d| day_start_millis(d, tz));
            let to = end.map_or(i64::MAX, |d| day_end_millis(d, tz));
            repo.find_in_range(from, to).await?
        }
    };
    Ok(Json(expenses))
}

async fn period(state: &ServerState, first: NaiveDate, last: NaiveDate) -> AppResult<ExpensePeriod> {
    let tz = state.config.timezone;
    let expenses = ExpenseRepository::new(state.get_db())
        .find_in_range(day_start_millis(first, tz), day_end_millis(last, tz))
        .await?;
    Ok(expense_period(first, last, expenses))
}

/// GET /api/expenses/today - 今日支出汇总
pub async fn list_today(State(state): State<ServerState>) -> AppResult<Json<ExpensePeriod>> {
    let day = today(state.config.timezone);
    Ok(Json(period(&state, day, day).await?))
}

/// GET /api/expenses/week - 本周支出汇总 (周日开始)
pub async fn list_week(State(state): State<ServerState>) -> AppResult<Json<ExpensePeriod>> {
    let first = week_start(today(state.config.timezone));
    let last = first + Duration::days(6);
    Ok(Json(period(&state, first, last).await?))
}

/// GET /api/expenses/month - 本月支出汇总
pub async fn list_month(State(state): State<ServerState>) -> AppResult<Json<ExpensePeriod>> {
    let first = month_start(today(state.config.timezone));
    let next = if first.month() == 12 {
        NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)
    };
    let last = next.and_then(|d| d.pred_opt()).unwrap_or(first);
    Ok(Json(period(&state, first, last).await?))
}

fn validate_amount(amount: f64) -> AppResult<f64> {
    validate_non_negative(amount, "amount")?;
    Ok(round_money(amount))
}

/// POST /api/expenses - 新增支出
///
/// 库存类支出 (stock_id + quantity > 0) 同时入库, 记 `purchase` 流水
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseCreate>,
) -> AppResult<Json<Expense>> {
    validate_required_text(&payload.description, "description", MAX_NOTE_LEN)?;
    let amount = validate_amount(payload.amount)?;
    if let Some(quantity) = payload.quantity {
        validate_non_negative(quantity, "quantity")?;
    }
    let date = match &payload.date {
        Some(d) => d.to_millis(state.config.timezone)?,
        None => now_millis(),
    };

    let repo = ExpenseRepository::new(state.get_db());
    let ledger = StockLedger::new(state.get_db(), state.config.allow_negative_stock);
    let _guard = state.ledger_lock.lock().await;

    // 引用的库存必须存在, 统一为 "stock:xxx"
    let stock_id = match payload.stock_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let stock = StockRepository::new(state.get_db())
                .find_by_id(raw)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(ErrorCode::StockNotFound, format!("Stock {} not found", raw))
                        .with_detail("stock_id", raw.to_string())
                })?;
            Some(stock.id_string())
        }
        None => None,
    };

    let mut expense = Expense {
        id: None,
        description: payload.description.trim().to_string(),
        amount,
        category: payload.category,
        stock_id,
        quantity: payload.quantity,
        purchased_quantity: None,
        date,
    };
    expense.purchased_quantity = expense.requested_purchase().map(|(_, quantity)| quantity);

    let expense = repo.create(expense).await?;
    let expense_id = expense.id_string();

    if let Some((stock_id, quantity)) = expense.applied_purchase() {
        ledger
            .record(
                stock_id,
                quantity,
                MovementType::Purchase,
                Some((ReferenceType::Expense, expense_id.as_str())),
            )
            .await?;
        tracing::info!(expense_id = %expense_id, stock_id = %stock_id, quantity, "Stock purchased");
    }

    tracing::info!(
        expense_id = %expense_id,
        amount = expense.amount,
        category = %expense.category.as_str(),
        "Expense created"
    );
    Ok(Json(expense))
}

/// PUT /api/expenses/{id} - 更新支出 (描述、金额、类别、日期)
///
/// 改类别不影响库存; 删除时只冲回创建时实际入库的数量
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> AppResult<Json<Expense>> {
    if let Some(description) = &payload.description {
        validate_required_text(description, "description", MAX_NOTE_LEN)?;
    }
    let patch = ExpensePatch {
        description: payload.description.map(|d| d.trim().to_string()),
        amount: payload.amount.map(validate_amount).transpose()?,
        category: payload.category,
        date: payload
            .date
            .map(|d| d.to_millis(state.config.timezone))
            .transpose()?,
    };

    let expense = ExpenseRepository::new(state.get_db())
        .update(&id, patch)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => expense_not_found(&id),
            other => other.into(),
        })?;

    tracing::info!(expense_id = %expense.id_string(), "Expense updated");
    Ok(Json(expense))
}

/// DELETE /api/expenses/{id} - 删除支出 (冲回库存采购)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    let repo = ExpenseRepository::new(state.get_db());
    let ledger = StockLedger::new(state.get_db(), true);
    let _guard = state.ledger_lock.lock().await;

    let expense = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| expense_not_found(&id))?;
    let expense_id = expense.id_string();

    if let Some((stock_id, quantity)) = expense.applied_purchase() {
        match ledger
            .record(
                stock_id,
                -quantity,
                MovementType::Adjustment,
                Some((ReferenceType::Expense, expense_id.as_str())),
            )
            .await
        {
            Ok(_) => {}
            Err(e) if e.code == ErrorCode::StockNotFound => {
                tracing::warn!(expense_id = %expense_id, stock_id = %stock_id, "Purchased stock no longer exists, nothing to reverse");
            }
            Err(e) => return Err(e),
        }
    }

    if !repo.delete(&expense_id).await? {
        return Err(expense_not_found(&id));
    }

    tracing::info!(expense_id = %expense_id, "Expense deleted");
    Ok(Json(MessageResponse::new("Expense deleted successfully")))
}

/// GET /api/expenses/summary/{date} - 日损益 (仅已付款订单)
pub async fn summary(
    State(state): State<ServerState>,
    Path(date): Path<String>,
) -> AppResult<Json<DailyProfit>> {
    let date = parse_date(&date)?;
    let tz = state.config.timezone;

    let orders = OrderService::new(&state).list_by_date(date).await?;
    let expenses = ExpenseRepository::new(state.get_db())
        .find_in_range(day_start_millis(date, tz), day_end_millis(date, tz))
        .await?;

    Ok(Json(daily_profit(date, &orders, expenses)))
}
