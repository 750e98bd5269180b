//! Promo Slide Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{PromoPatch, PromoSlide};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "promo_slide";

#[derive(Clone)]
pub struct PromoRepository {
    base: BaseRepository,
}

impl PromoRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All slides, newest first
    pub async fn find_all(&self) -> RepoResult<Vec<PromoSlide>> {
        let slides: Vec<PromoSlide> = self
            .base
            .db()
            .query("SELECT * FROM promo_slide ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(slides)
    }

    /// Slides visible to customers at `now`
    pub async fn find_visible(&self, now: i64) -> RepoResult<Vec<PromoSlide>> {
        Ok(self
            .find_all()
            .await?
            .into_iter()
            .filter(|s| s.is_visible_at(now))
            .collect())
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<PromoSlide>> {
        let thing = parse_record_id(TABLE, id)?;
        let slide: Option<PromoSlide> = self.base.db().select(thing).await?;
        Ok(slide)
    }

    pub async fn create(&self, slide: PromoSlide) -> RepoResult<PromoSlide> {
        let created: Option<PromoSlide> = self.base.db().create(TABLE).content(slide).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create promo".to_string()))
    }

    /// Update a slide (only provided fields)
    pub async fn update(&self, id: &str, data: PromoPatch) -> RepoResult<PromoSlide> {
        let thing = parse_record_id(TABLE, id)?;
        if self.find_by_id(id).await?.is_none() {
            return Err(RepoError::NotFound(format!("Promo {} not found", id)));
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
            .ok_or_else(|| RepoError::NotFound(format!("Promo {} not found", id)))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<PromoSlide> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
