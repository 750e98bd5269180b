//! Expense Model

use super::serde_helpers;
use crate::utils::time::DateInput;
use serde::{Deserialize, Serialize};
use shared::models::ExpenseCategory;
use surrealdb::RecordId;

/// Back-office expense
///
/// A `stock` expense with `stock_id` and `quantity` doubles as a stock purchase.
/// The quantity actually posted is kept in `purchased_quantity`, so later
/// category edits do not change what deletion reverses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default)]
    pub stock_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    /// 创建时已入库的数量
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased_quantity: Option<f64>,
    /// Unix millis
    #[serde(default)]
    pub date: i64,
}

impl Expense {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }

    /// Purchase the submitted fields describe; only consulted at creation
    pub fn requested_purchase(&self) -> Option<(&str, f64)> {
        match (self.category, self.stock_id.as_deref(), self.quantity) {
            (ExpenseCategory::Stock, Some(stock_id), Some(quantity)) if quantity > 0.0 => {
                Some((stock_id, quantity))
            }
            _ => None,
        }
    }

    /// Purchase posted to stock at creation, i.e. what deletion reverses
    pub fn applied_purchase(&self) -> Option<(&str, f64)> {
        match (self.stock_id.as_deref(), self.purchased_quantity) {
            (Some(stock_id), Some(quantity)) if quantity > 0.0 => Some((stock_id, quantity)),
            _ => None,
        }
    }
}

/// Create expense payload
#[derive(Debug, Clone, Deserialize)]
pub struct ExpenseCreate {
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: ExpenseCategory,
    #[serde(default, alias = "stockId")]
    pub stock_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<f64>,
    #[serde(default)]
    pub date: Option<DateInput>,
}

/// Update expense payload (stock linkage is fixed at creation)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<ExpenseCategory>,
    pub date: Option<DateInput>,
}

/// Resolved expense patch written with MERGE
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExpensePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<i64>,
}
