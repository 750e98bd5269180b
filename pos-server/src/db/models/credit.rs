//! Credit (赊账) Models

use super::order::{OrderItem, OrderItemInput, StockUsage, TableRef};
use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::{CreditOrderStatus, OrderType, PaymentMethod};
use surrealdb::RecordId;

/// Customer allowed to buy on credit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCustomer {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Outstanding balance across all credit orders
    #[serde(default)]
    pub total_credit: f64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub last_transaction: Option<i64>,
}

impl CreditCustomer {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }
}

/// Create customer payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreditCustomerCreate {
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Order sold on credit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditOrder {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub order_number: String,
    pub customer_id: String,
    pub customer_name: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub base_total: f64,
    #[serde(default)]
    pub amount_paid: f64,
    #[serde(default)]
    pub remaining_balance: f64,
    #[serde(default)]
    pub status: CreditOrderStatus,
    #[serde(default)]
    pub table_id: Option<String>,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub stock_usage: Vec<StockUsage>,
    #[serde(default)]
    pub timestamp: i64,
}

impl CreditOrder {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }
}

/// Create credit order payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreditOrderCreate {
    #[serde(alias = "customerId")]
    pub customer_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemInput>,
    #[serde(default, alias = "orderType")]
    pub order_type: OrderType,
    #[serde(default, alias = "tableId")]
    pub table_id: Option<TableRef>,
}

/// Payment against a credit order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPayment {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub credit_order_id: String,
    pub customer_id: String,
    pub amount: f64,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub timestamp: i64,
}

/// Record payment payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreditPaymentCreate {
    pub amount: f64,
    #[serde(default, alias = "paymentMethod")]
    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
}

/// Credit order with its payments
#[derive(Debug, Clone, Serialize)]
pub struct CreditOrderDetail {
    pub order: CreditOrder,
    pub payments: Vec<CreditPayment>,
}

/// Credit order with its customer joined in (list view)
#[derive(Debug, Clone, Serialize)]
pub struct CreditOrderWithCustomer {
    #[serde(flatten)]
    pub order: CreditOrder,
    /// `None` when the customer was deleted
    pub customer: Option<CreditCustomer>,
}

/// Per-customer credit summary
#[derive(Debug, Clone, Serialize)]
pub struct CreditCustomerSummary {
    pub customer: CreditCustomer,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub partial_orders: usize,
    pub paid_orders: usize,
    /// 5 newest orders
    pub recent_orders: Vec<CreditOrder>,
}

/// Credit order list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreditOrderQuery {
    #[serde(alias = "customerId")]
    pub customer_id: Option<String>,
    pub status: Option<CreditOrderStatus>,
}
