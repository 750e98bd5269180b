//! Stock ledger
//!
//! Usage is computed from product recipes, snapshotted on the order, and applied
//! to stock as signed deltas. Each delta is one atomic increment plus one movement.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::prelude::*;
use shared::error::ErrorCode;
use shared::models::{MovementType, ReferenceType};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{OrderItem, Product, Stock, StockMovement, StockUsage};
use crate::db::repository::{RepoError, StockMovementRepository, StockRepository};
use crate::orders::money::to_decimal;
use crate::utils::time::now_millis;
use crate::utils::{AppError, AppResult};

/// Quantity precision kept for stock amounts
const QUANTITY_DP: u32 = 6;

fn to_quantity(value: Decimal) -> f64 {
    value.round_dp(QUANTITY_DP).to_f64().unwrap_or_default()
}

/// Aggregate recipe consumption of `items` per stock id
///
/// Lines with `quantity_per_unit <= 0` and products missing from `products` are ignored.
pub fn compute_usage(items: &[OrderItem], products: &HashMap<String, Product>) -> Vec<StockUsage> {
    let mut usage: BTreeMap<String, Decimal> = BTreeMap::new();
    for item in items {
        let Some(product) = products.get(&item.product_id) else {
            continue;
        };
        for line in &product.stock_items {
            if !line.quantity_per_unit.is_finite() || line.quantity_per_unit <= 0.0 {
                continue;
            }
            *usage.entry(line.stock_id.clone()).or_default() +=
                to_decimal(line.quantity_per_unit) * Decimal::from(item.quantity);
        }
    }
    usage
        .into_iter()
        .map(|(stock_id, quantity)| StockUsage {
            stock_id,
            quantity: to_quantity(quantity),
        })
        .collect()
}

/// Per-stock `new - old`; positive means extra consumption, negative means stock to return
pub fn diff_usage(old: &[StockUsage], new: &[StockUsage]) -> Vec<StockUsage> {
    let mut delta: BTreeMap<&str, Decimal> = BTreeMap::new();
    for u in new {
        *delta.entry(&u.stock_id).or_default() += to_decimal(u.quantity);
    }
    for u in old {
        *delta.entry(&u.stock_id).or_default() -= to_decimal(u.quantity);
    }
    delta
        .into_iter()
        .filter(|(_, q)| !q.is_zero())
        .map(|(stock_id, q)| StockUsage {
            stock_id: stock_id.to_string(),
            quantity: to_quantity(q),
        })
        .filter(|u| u.quantity != 0.0)
        .collect()
}

/// Stock ledger
///
/// Callers hold the server's ledger lock while a multi-document change is in flight.
#[derive(Clone)]
pub struct StockLedger {
    stocks: StockRepository,
    movements: StockMovementRepository,
    allow_negative: bool,
}

impl StockLedger {
    pub fn new(db: Surreal<Db>, allow_negative: bool) -> Self {
        Self {
            stocks: StockRepository::new(db.clone()),
            movements: StockMovementRepository::new(db),
            allow_negative,
        }
    }

    /// Reject consumption that would drive a stock below zero (when configured)
    ///
    /// Runs before anything is written.
    pub async fn check_available(&self, consumption: &[StockUsage]) -> AppResult<()> {
        if self.allow_negative {
            return Ok(());
        }
        for usage in consumption.iter().filter(|u| u.quantity > 0.0) {
            let Some(stock) = self.stocks.find_by_id(&usage.stock_id).await? else {
                continue;
            };
            let remaining = to_decimal(stock.current_quantity) - to_decimal(usage.quantity);
            if remaining < Decimal::ZERO {
                return Err(AppError::with_message(
                    ErrorCode::StockInsufficient,
                    format!("Insufficient stock for {}", stock.name),
                )
                .with_detail("stock_id", usage.stock_id.clone())
                .with_detail("available", stock.current_quantity)
                .with_detail("required", usage.quantity));
            }
        }
        Ok(())
    }

    /// Apply one signed delta and append its movement
    pub async fn record(
        &self,
        stock_id: &str,
        delta: f64,
        movement_type: MovementType,
        reference: Option<(ReferenceType, &str)>,
    ) -> AppResult<(Stock, StockMovement)> {
        let at = now_millis();
        let stock = self.stocks.add_quantity(stock_id, delta, at).await.map_err(|e| match e {
            RepoError::NotFound(_) => AppError::with_message(
                ErrorCode::StockNotFound,
                format!("Stock {} not found", stock_id),
            ),
            other => other.into(),
        })?;

        if stock.current_quantity < 0.0 {
            tracing::warn!(
                stock_id = %stock_id,
                name = %stock.name,
                quantity = stock.current_quantity,
                "Stock went negative"
            );
        }

        let movement = self
            .movements
            .create(StockMovement {
                id: None,
                stock_id: stock.id_string(),
                movement_type,
                quantity: delta,
                reference_type: reference.map(|(t, _)| t),
                reference_id: reference.map(|(_, id)| id.to_string()),
                timestamp: at,
            })
            .await?;

        Ok((stock, movement))
    }

    /// Like [`record`](Self::record) but a deleted stock item is skipped with a warning
    async fn record_lenient(
        &self,
        stock_id: &str,
        delta: f64,
        movement_type: MovementType,
        reference: (ReferenceType, &str),
    ) -> AppResult<()> {
        match self.record(stock_id, delta, movement_type, Some(reference)).await {
            Ok(_) => Ok(()),
            Err(e) if e.code == ErrorCode::StockNotFound => {
                tracing::warn!(stock_id = %stock_id, reference_id = %reference.1, "Skipping movement for missing stock");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Deduct usage as `sale` movements
    pub async fn consume(
        &self,
        usage: &[StockUsage],
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> AppResult<()> {
        self.check_available(usage).await?;
        for u in usage.iter().filter(|u| u.quantity > 0.0) {
            self.record_lenient(
                &u.stock_id,
                -u.quantity,
                MovementType::Sale,
                (reference_type, reference_id),
            )
            .await?;
        }
        Ok(())
    }

    /// Return usage to stock as `adjustment` movements
    pub async fn restore(
        &self,
        usage: &[StockUsage],
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> AppResult<()> {
        for u in usage.iter().filter(|u| u.quantity > 0.0) {
            self.record_lenient(
                &u.stock_id,
                u.quantity,
                MovementType::Adjustment,
                (reference_type, reference_id),
            )
            .await?;
        }
        Ok(())
    }

    /// Move stock from the `old` usage snapshot to the `new` one
    pub async fn apply_difference(
        &self,
        old: &[StockUsage],
        new: &[StockUsage],
        reference_type: ReferenceType,
        reference_id: &str,
    ) -> AppResult<()> {
        let delta = diff_usage(old, new);
        let (extra, returned): (Vec<StockUsage>, Vec<StockUsage>) =
            delta.into_iter().partition(|u| u.quantity > 0.0);
        let returned: Vec<StockUsage> = returned
            .into_iter()
            .map(|u| StockUsage {
                stock_id: u.stock_id,
                quantity: -u.quantity,
            })
            .collect();

        self.consume(&extra, reference_type, reference_id).await?;
        self.restore(&returned, reference_type, reference_id).await
    }
}
