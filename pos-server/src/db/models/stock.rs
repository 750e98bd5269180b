//! Stock Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{MovementType, ReferenceType};
use surrealdb::RecordId;

/// Inventory item (原料库存)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stock {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub category: String,
    /// Free-text unit, e.g. "kg", "l", "pcs"
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub current_quantity: f64,
    #[serde(default)]
    pub minimum_quantity: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub last_updated: i64,
}

impl Stock {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }

    /// Quantity at or below the alert threshold
    pub fn is_low(&self) -> bool {
        self.current_quantity <= self.minimum_quantity
    }
}

/// Create stock payload
#[derive(Debug, Clone, Deserialize)]
pub struct StockCreate {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub current_quantity: f64,
    #[serde(default)]
    pub minimum_quantity: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
}

/// Update stock payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cost_per_unit: Option<f64>,
}

/// Manual adjustment payload
#[derive(Debug, Clone, Deserialize)]
pub struct StockAdjust {
    /// Signed delta; positive adds stock
    pub quantity: f64,
    #[serde(default, rename = "type")]
    pub movement_type: Option<MovementType>,
    #[serde(default, alias = "referenceType")]
    pub reference_type: Option<ReferenceType>,
    #[serde(default, alias = "referenceId")]
    pub reference_id: Option<String>,
}

/// Append-only stock movement record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub stock_id: String,
    #[serde(rename = "type")]
    pub movement_type: MovementType,
    /// Signed quantity actually applied
    pub quantity: f64,
    #[serde(default)]
    pub reference_type: Option<ReferenceType>,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}
