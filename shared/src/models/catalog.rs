//! Product and expense categories

use serde::{Deserialize, Serialize};

/// Product category shown as a tab on the POS screen
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Coffee,
    Drinks,
    #[default]
    Other,
}

/// Expense category
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseCategory {
    /// Stock purchase; may carry a stock id and quantity
    Stock,
    Rent,
    Salary,
    Utilities,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Rent => "rent",
            Self::Salary => "salary",
            Self::Utilities => "utilities",
            Self::Other => "other",
        }
    }
}
