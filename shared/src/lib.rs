//! Shared types for SimplePOS
//!
//! Types used by the server and by any Rust client talking to it:
//! error codes, the uniform error body, domain enums and auth DTOs.

pub mod client;
pub mod error;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
