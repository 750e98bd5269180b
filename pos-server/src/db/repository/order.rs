//! Order Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::Order;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const TABLE: &str = "orders";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find order by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let thing = parse_record_id(TABLE, id)?;
        let order: Option<Order> = self.base.db().select(thing).await?;
        Ok(order)
    }

    /// Orders with `start <= timestamp < end`, newest first
    pub async fn find_in_range(&self, start: i64, end: i64) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query(
                "SELECT * FROM orders WHERE timestamp >= $start AND timestamp < $end ORDER BY timestamp DESC",
            )
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Create a new order
    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Overwrite the stored order with `order` (id taken from `id`)
    pub async fn save(&self, id: &str, order: &Order) -> RepoResult<Order> {
        let thing = parse_record_id(TABLE, id)?;
        let mut data = order.clone();
        data.id = None;

        let mut result = self
            .base
            .db()
            .query("UPDATE $thing MERGE $data RETURN AFTER")
            .bind(("thing", thing))
            .bind(("data", data))
            .await?;
        let updated: Option<Order> = result.take(0)?;
        updated.ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }

    /// Hard delete an order; `false` when it did not exist
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<Order> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
