//! Stock Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Stock, StockUpdate};
use crate::utils::time::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "stock";

/// 库存数量保留 6 位小数
const QUANTITY_SCALE: f64 = 1_000_000.0;

#[derive(Clone)]
pub struct StockRepository {
    base: BaseRepository,
}

impl StockRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all stock items
    pub async fn find_all(&self) -> RepoResult<Vec<Stock>> {
        let items: Vec<Stock> = self
            .base
            .db()
            .query("SELECT * FROM stock ORDER BY name")
            .await?
            .take(0)?;
        Ok(items)
    }

    /// Items at or below their minimum quantity
    pub async fn find_low(&self) -> RepoResult<Vec<Stock>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(Stock::is_low)
            .collect())
    }

    /// Find stock item by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Stock>> {
        let thing = parse_record_id(TABLE, id)?;
        let item: Option<Stock> = self.base.db().select(thing).await?;
        Ok(item)
    }

    /// Create a new stock item
    pub async fn create(&self, stock: Stock) -> RepoResult<Stock> {
        let created: Option<Stock> = self.base.db().create(TABLE).content(stock).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create stock item".to_string()))
    }

    /// Update descriptive fields
    ///
    /// `current_quantity` is ignored here; quantity changes go through the stock ledger.
    pub async fn update(&self, id: &str, mut data: StockUpdate) -> RepoResult<Stock> {
        let thing = parse_record_id(TABLE, id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Stock {} not found", id)));
        }
        data.current_quantity = None;

        self.base
            .db()
            .query("UPDATE $thing MERGE $data; UPDATE $thing SET last_updated = $now")
            .bind(("thing", thing))
            .bind(("data", data))
            .bind(("now", now_millis()))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Stock {} not found", id)))
    }

    /// Atomically add `delta` (may be negative) to the current quantity
    ///
    /// The sum is rounded to 6 decimals in the same statement, so repeated
    /// float deltas leave no residue (0.3 - 3 x 0.1 is exactly 0).
    pub async fn add_quantity(&self, id: &str, delta: f64, at: i64) -> RepoResult<Stock> {
        let thing = parse_record_id(TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET current_quantity = math::round((current_quantity + $delta) * $scale) / $scale, last_updated = $at RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("delta", delta))
            .bind(("scale", QUANTITY_SCALE))
            .bind(("at", at))
            .await?;
        let updated: Option<Stock> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Stock {} not found", id)))
    }

    /// Hard delete a stock item; `false` when it did not exist
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<Stock> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
