//! Unified error system for SimplePOS
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ApiResponse`]: Uniform JSON error body
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Credit errors
//! - 4xxx: Order errors
//! - 5xxx: Payment / expense errors
//! - 6xxx: Product / stock errors
//! - 7xxx: Table errors
//! - 8xxx: User errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode, ApiResponse};
//!
//! let err = AppError::with_message(ErrorCode::TableOccupied, "Table 4 is occupied")
//!     .with_detail("table_number", 4);
//!
//! let body = ApiResponse::from(&err);
//! assert_eq!(body.code, 7002);
//! assert_eq!(body.details.unwrap()["table_number"], 4);
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{ApiResponse, AppError, AppResult};
