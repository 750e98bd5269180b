//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;
use shared::error::ErrorCode;
use shared::models::OrderType;

use crate::db::models::OrderItem;
use crate::utils::{AppError, AppResult};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed price per item
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per item
pub const MAX_QUANTITY: u32 = 9999;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Round a monetary f64 to 2 decimal places
#[inline]
pub fn round_money(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

fn item_error(message: String) -> AppError {
    AppError::with_message(ErrorCode::OrderItemInvalid, message)
}

/// Validate that a f64 price is finite, non-negative and below the cap
fn validate_price(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(item_error(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    if value < 0.0 {
        return Err(item_error(format!(
            "{} must be non-negative, got {}",
            field_name, value
        )));
    }
    if value > MAX_PRICE {
        return Err(item_error(format!(
            "{} exceeds maximum allowed ({}), got {}",
            field_name, MAX_PRICE, value
        )));
    }
    Ok(())
}

/// Validate one priced order line
pub fn validate_item(item: &OrderItem) -> AppResult<()> {
    validate_price(item.price, "price")?;
    validate_price(item.base_price, "base_price")?;

    if item.quantity == 0 {
        return Err(item_error(format!(
            "quantity must be positive, got {}",
            item.quantity
        )));
    }
    if item.quantity > MAX_QUANTITY {
        return Err(item_error(format!(
            "quantity exceeds maximum allowed ({}), got {}",
            MAX_QUANTITY, item.quantity
        )));
    }
    Ok(())
}

/// Validate a full item list (must not be empty)
pub fn validate_items(items: &[OrderItem]) -> AppResult<()> {
    if items.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }
    items.iter().try_for_each(validate_item)
}

/// Order totals
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub total: f64,
    pub base_total: f64,
}

/// Σ price·quantity and Σ base_price·quantity
///
/// Employee orders are staff meals: `total` is 0, `base_total` still records the cost.
pub fn compute_totals(items: &[OrderItem], order_type: OrderType) -> Totals {
    let (total, base_total) = items.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(total, base), item| {
            let qty = Decimal::from(item.quantity);
            (
                total + to_decimal(item.price) * qty,
                base + to_decimal(item.base_price) * qty,
            )
        },
    );

    Totals {
        total: if order_type == OrderType::Employee {
            0.0
        } else {
            to_f64(total)
        },
        base_total: to_f64(base_total),
    }
}
