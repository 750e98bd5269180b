//! Dining Table Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::models::TableStatus;
use surrealdb::RecordId;

/// Dining table entity (桌台)
///
/// Record key is the table number, e.g. `dining_table:4`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTable {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub table_number: u32,
    #[serde(default)]
    pub status: TableStatus,
    /// Order holding the table ("orders:xxx")
    #[serde(default)]
    pub current_order: Option<String>,
}

impl DiningTable {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }
}
