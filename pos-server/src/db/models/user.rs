//! User Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::client::UserInfo;
use shared::models::UserRole;
use surrealdb::RecordId;

/// Back-office user (admin or cashier)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_helpers::option_record_id"
    )]
    pub id: Option<RecordId>,
    /// Login email, stored lowercase
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(
        default = "default_true",
        deserialize_with = "serde_helpers::bool_true"
    )]
    pub is_active: bool,
    #[serde(default)]
    pub last_login: Option<i64>,
    #[serde(default)]
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn id_string(&self) -> String {
        serde_helpers::id_string(&self.id)
    }
}

/// Create user payload
#[derive(Debug, Clone, Deserialize)]
pub struct UserCreate {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub name: String,
    pub role: Option<UserRole>,
}

/// Update user payload (password changes go through the auth API)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(alias = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// User as returned by the API (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub is_active: bool,
    pub last_login: Option<i64>,
    pub created_at: i64,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id_string(),
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
        }
    }
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}
