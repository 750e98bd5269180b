//! Expense Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Expense, ExpensePatch};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

pub const TABLE: &str = "expense";

#[derive(Clone)]
pub struct ExpenseRepository {
    base: BaseRepository,
}

impl ExpenseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All expenses, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<Expense>> {
        let expenses: Vec<Expense> = self
            .base
            .db()
            .query("SELECT * FROM expense ORDER BY date DESC")
            .await?
            .take(0)?;
        Ok(expenses)
    }

    /// Expenses with `start <= date < end`, newest first
    pub async fn find_in_range(&self, start: i64, end: i64) -> RepoResult<Vec<Expense>> {
        let expenses: Vec<Expense> = self
            .base
            .db()
            .query("SELECT * FROM expense WHERE date >= $start AND date < $end ORDER BY date DESC")
            .bind(("start", start))
            .bind(("end", end))
            .await?
            .take(0)?;
        Ok(expenses)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Expense>> {
        let thing = parse_record_id(TABLE, id)?;
        let expense: Option<Expense> = self.base.db().select(thing).await?;
        Ok(expense)
    }

    pub async fn create(&self, expense: Expense) -> RepoResult<Expense> {
        let created: Option<Expense> = self.base.db().create(TABLE).content(expense).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create expense".to_string()))
    }

    /// Update an expense (only provided fields)
    pub async fn update(&self, id: &str, data: ExpensePatch) -> RepoResult<Expense> {
        let thing = parse_record_id(TABLE, id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Expense {} not found", id)));
        }

        self.base
            .db()
            .query("UPDATE $thing MERGE $data")
            .bind(("thing", thing))
            .bind(("data", data))
            .await?
            .check()?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Expense {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<Expense> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
