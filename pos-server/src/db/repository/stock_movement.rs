//! Stock Movement Repository (append-only)

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::StockMovement;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "stock_movement";

#[derive(Clone)]
pub struct StockMovementRepository {
    base: BaseRepository,
}

impl StockMovementRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Append a movement
    pub async fn create(&self, movement: StockMovement) -> RepoResult<StockMovement> {
        let created: Option<StockMovement> =
            self.base.db().create(TABLE).content(movement).await?;
        created.ok_or_else(|| RepoError::Database("Failed to record stock movement".to_string()))
    }

    /// Newest movements of one stock item
    ///
    /// WHERE + ORDER BY + LIMIT drops rows on the embedded engine, so the limit is applied here.
    pub async fn find_by_stock(&self, stock_id: &str, limit: usize) -> RepoResult<Vec<StockMovement>> {
        let stock_owned = stock_id.to_string();
        let mut movements: Vec<StockMovement> = self
            .base
            .db()
            .query("SELECT * FROM stock_movement WHERE stock_id = $stock ORDER BY timestamp DESC")
            .bind(("stock", stock_owned))
            .await?
            .take(0)?;
        movements.truncate(limit);
        Ok(movements)
    }

    /// Movements caused by one document (order, expense, ...)
    pub async fn find_by_reference(&self, reference_id: &str) -> RepoResult<Vec<StockMovement>> {
        let reference_owned = reference_id.to_string();
        let movements: Vec<StockMovement> = self
            .base
            .db()
            .query("SELECT * FROM stock_movement WHERE reference_id = $reference ORDER BY timestamp")
            .bind(("reference", reference_owned))
            .await?
            .take(0)?;
        Ok(movements)
    }
}
