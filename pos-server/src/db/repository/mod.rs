//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

// Auth
pub mod user;

// Catalog
pub mod product;
pub mod promo;

// Inventory
pub mod stock;
pub mod stock_movement;

// Floor
pub mod dining_table;

// Sales
pub mod credit;
pub mod order;

// Back office
pub mod expense;

// Re-exports
pub use credit::{CreditCustomerRepository, CreditOrderRepository, CreditPaymentRepository};
pub use dining_table::DiningTableRepository;
pub use expense::ExpenseRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use promo::PromoRepository;
pub use stock::StockRepository;
pub use stock_movement::StockMovementRepository;
pub use user::UserRepository;

use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        let message = err.to_string();
        // unique index violation
        if message.contains("already contains") {
            return RepoError::Duplicate(message);
        }
        RepoError::Database(message)
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: parse_record_id("product", "product:abc") 或 parse_record_id("product", "abc")
//   - 获取表名: id.table()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId
//
// 外键字段 (stock_id, customer_id, ...) 以 "table:id" 字符串存储

/// Parse a path/body id into a record of `table`
///
/// Accepts the full `table:key` form or the bare key.
pub fn parse_record_id(table: &str, raw: &str) -> RepoResult<RecordId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(RepoError::Validation(format!("Invalid {table} ID: empty")));
    }
    if raw.contains(':') {
        let id: RecordId = raw
            .parse()
            .map_err(|_| RepoError::Validation(format!("Invalid {table} ID: {raw}")))?;
        if id.table() != table {
            return Err(RepoError::Validation(format!("Invalid {table} ID: {raw}")));
        }
        return Ok(id);
    }
    Ok(RecordId::from_table_key(table, raw))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}
