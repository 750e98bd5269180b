//! Order enums

use serde::{Deserialize, Serialize};

/// Order status
///
/// `pending`, `confirmed` and `unpaid` orders are open; `paid` and
/// `cancelled` orders are closed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Paid,
    Unpaid,
    Cancelled,
}

impl OrderStatus {
    /// Open orders still expect payment
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed | Self::Unpaid)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Paid => "paid",
            Self::Unpaid => "unpaid",
            Self::Cancelled => "cancelled",
        }
    }
}

/// How the order is served
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    #[default]
    DineIn,
    ToGo,
    /// Staff meal: consumes stock, produces no revenue
    Employee,
}

/// Where the order was entered
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderSource {
    /// Cashier terminal
    #[default]
    Pos,
    /// Customer self-ordering from the table
    Client,
}
