//! Credit (customer tab) enums

use serde::{Deserialize, Serialize};

/// Settlement state of a credit order
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CreditOrderStatus {
    /// Nothing paid yet
    #[default]
    Pending,
    /// Some payments recorded, balance remaining
    Partial,
    /// Balance fully paid
    Paid,
}

/// How a credit payment was made
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Transfer,
}
