//! Order Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{OrderSource, OrderStatus, OrderType};
use surrealdb::RecordId;

/// Order line, priced at the moment of sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub price: f64,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

fn default_quantity() -> u32 {
    1
}

/// Order line as sent by a client
///
/// Only the product reference is required; the rest is filled from the catalogue.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemInput {
    #[serde(alias = "id", alias = "productId")]
    pub product_id: String,
    #[serde(default, alias = "name", alias = "productName")]
    pub product_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, alias = "basePrice")]
    pub base_price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Stock consumed by an order, snapshotted when the order is written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockUsage {
    pub stock_id: String,
    pub quantity: f64,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub order_number: String,
    /// "dining_table:N" for dine-in orders
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub base_total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub source: OrderSource,
    #[serde(default)]
    pub stock_usage: Vec<StockUsage>,
    /// Whether `stock_usage` is currently deducted from inventory
    #[serde(default)]
    pub stock_applied: bool,
    #[serde(default)]
    pub timestamp: i64,
}

impl Order {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }
}

/// Create order payload (POS and client)
#[derive(Debug, Clone, Deserialize)]
pub struct OrderCreate {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default, alias = "orderType")]
    pub order_type: OrderType,
    /// Table number or "dining_table:N"
    #[serde(default, alias = "tableId", alias = "table_number", alias = "tableNumber")]
    pub table_id: Option<TableRef>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Table reference accepted from clients
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TableRef {
    Number(u32),
    Text(String),
}

impl TableRef {
    /// Resolve to a table number
    pub fn table_number(&self) -> Option<u32> {
        match self {
            TableRef::Number(n) => Some(*n),
            TableRef::Text(text) => {
                let text = text.trim();
                let key = text.strip_prefix("dining_table:").unwrap_or(text);
                key.parse().ok()
            }
        }
    }
}

/// Status change payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Item replacement payload
#[derive(Debug, Clone, Deserialize)]
pub struct OrderItemsUpdate {
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
}
