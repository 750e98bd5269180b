//! Product Model

use super::serde_helpers;
use super::stock::Stock;
use serde::{Deserialize, Serialize};
use shared::models::ProductCategory;
use surrealdb::RecordId;

/// One recipe line: how much of a stock item one unit of the product consumes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItemRef {
    /// "stock:xxx"
    pub stock_id: String,
    #[serde(default)]
    pub quantity_per_unit: f64,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    /// Selling price
    pub price: f64,
    /// Cost price
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub category: ProductCategory,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub stock_items: Vec<StockItemRef>,
    #[serde(default)]
    pub created_at: i64,
}

impl Product {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }
}

/// Create product payload
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    #[serde(default)]
    pub name: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub category: ProductCategory,
    pub image: Option<String>,
    #[serde(default)]
    pub stock_items: Vec<StockItemRef>,
}

/// Update product payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<ProductCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_items: Option<Vec<StockItemRef>>,
}

/// Recipe line with the referenced stock document joined in
#[derive(Debug, Clone, Serialize)]
pub struct StockItemDetail {
    pub stock_id: String,
    pub quantity_per_unit: f64,
    /// `None` when the stock item was deleted
    pub stock: Option<Stock>,
}

/// Product with its stock references resolved
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub base_price: f64,
    pub category: ProductCategory,
    pub image: Option<String>,
    pub stock_items: Vec<StockItemDetail>,
    pub created_at: i64,
}
