//! Database Module
//!
//! Embedded SurrealDB (RocksDB) connection, schema and seed data

pub mod models;
pub mod repository;
pub mod seed;

use repository::{RepoError, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, RocksDb};

/// Tables and indexes, applied on every start (idempotent)
const SCHEMA: &str = include_str!("schema.surql");

/// Open the database at `path` and select namespace / database
pub async fn connect(path: &str, namespace: &str, database: &str) -> RepoResult<Surreal<Db>> {
    let db: Surreal<Db> = Surreal::new::<RocksDb>(path)
        .await
        .map_err(|e| RepoError::Database(format!("Failed to open database: {e}")))?;
    db.use_ns(namespace).use_db(database).await?;
    tracing::info!(path = %path, "Database connection established (SurrealDB RocksDB)");

    apply_schema(&db).await?;
    Ok(db)
}

/// Apply `schema.surql`
pub async fn apply_schema(db: &Surreal<Db>) -> RepoResult<()> {
    db.query(SCHEMA)
        .await?
        .check()
        .map_err(|e| RepoError::Database(format!("Failed to apply schema: {e}")))?;
    tracing::info!("Database schema applied");
    Ok(())
}
