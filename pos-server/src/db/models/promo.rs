//! Promo Slide Model

use super::serde_helpers;
use crate::utils::time::DateInput;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Slide shown on the customer-facing screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoSlide {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub image: String,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub active: bool,
    /// Unix millis; no expiry when absent
    #[serde(default)]
    pub expiry_date: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl PromoSlide {
    /// Active and not yet expired at `now`
    pub fn is_visible_at(&self, now: i64) -> bool {
        self.active && self.expiry_date.is_none_or(|expiry| expiry > now)
    }
}

/// Create promo payload
#[derive(Debug, Clone, Deserialize)]
pub struct PromoCreate {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub image: String,
    pub active: Option<bool>,
    #[serde(alias = "expiryDate")]
    pub expiry_date: Option<DateInput>,
}

/// Update promo payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub active: Option<bool>,
    #[serde(alias = "expiryDate")]
    pub expiry_date: Option<DateInput>,
}

/// Resolved promo patch written with MERGE
#[derive(Debug, Clone, Default, Serialize)]
pub struct PromoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<i64>,
}
