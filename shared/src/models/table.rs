//! Dining table enums

use serde::{Deserialize, Serialize};

/// Table occupancy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TableStatus {
    #[default]
    Free,
    Occupied,
}
