//! Stock ledger enums

use serde::{Deserialize, Serialize};

/// Kind of inventory change recorded in a stock movement
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    Purchase,
    Sale,
    #[default]
    Adjustment,
    Loss,
}

/// What caused a stock movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    Order,
    CreditOrder,
    Expense,
    Manual,
}
