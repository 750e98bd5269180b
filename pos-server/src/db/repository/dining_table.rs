//! Dining Table Repository
//!
//! Table records are keyed by their number (`dining_table:4`).

use super::{BaseRepository, RepoResult};
use crate::db::models::DiningTable;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};

const TABLE: &str = "dining_table";

/// Record id of table `number`
pub fn table_record_id(number: u32) -> RecordId {
    RecordId::from_table_key(TABLE, i64::from(number))
}

#[derive(Clone)]
pub struct DiningTableRepository {
    base: BaseRepository,
}

impl DiningTableRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All tables ordered by number
    pub async fn find_all(&self) -> RepoResult<Vec<DiningTable>> {
        let tables: Vec<DiningTable> = self
            .base
            .db()
            .query("SELECT * FROM dining_table ORDER BY table_number")
            .await?
            .take(0)?;
        Ok(tables)
    }

    /// Find table by number
    pub async fn find_by_number(&self, number: u32) -> RepoResult<Option<DiningTable>> {
        let table: Option<DiningTable> = self.base.db().select(table_record_id(number)).await?;
        Ok(table)
    }

    /// Create table `number` as free unless it already exists; returns whether it was created
    pub async fn ensure(&self, number: u32) -> RepoResult<bool> {
        if self.find_by_number(number).await?.is_some() {
            return Ok(false);
        }
        self.reset(number).await?;
        Ok(true)
    }

    /// Upsert table `number` as free
    pub async fn reset(&self, number: u32) -> RepoResult<()> {
        self.base
            .db()
            .query("UPSERT $thing SET table_number = $number, status = 'free', current_order = NONE")
            .bind(("thing", table_record_id(number)))
            .bind(("number", number))
            .await?
            .check()?;
        Ok(())
    }

    /// Mark the table occupied by `order_id`
    pub async fn occupy(&self, number: u32, order_id: &str) -> RepoResult<()> {
        let order_owned = order_id.to_string();
        self.base
            .db()
            .query("UPDATE $thing SET status = 'occupied', current_order = $order")
            .bind(("thing", table_record_id(number)))
            .bind(("order", order_owned))
            .await?
            .check()?;
        Ok(())
    }

    /// Free the table if `order_id` is the order holding it
    pub async fn release(&self, number: u32, order_id: &str) -> RepoResult<()> {
        let order_owned = order_id.to_string();
        self.base
            .db()
            .query(
                "UPDATE $thing SET status = 'free', current_order = NONE WHERE current_order = $order",
            )
            .bind(("thing", table_record_id(number)))
            .bind(("order", order_owned))
            .await?
            .check()?;
        Ok(())
    }
}
