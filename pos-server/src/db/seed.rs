//! Startup seed data: default admin and dining tables

use super::repository::{DiningTableRepository, RepoResult, UserRepository};
use crate::core::config::DefaultAdmin;
use shared::models::UserRole;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// Create the default admin when no user has its email
pub async fn ensure_default_admin(db: &Surreal<Db>, admin: &DefaultAdmin) -> RepoResult<()> {
    let repo = UserRepository::new(db.clone());
    let email = admin.email.trim().to_lowercase();
    if repo.find_by_email(&email).await?.is_some() {
        return Ok(());
    }

    repo.create(email.clone(), &admin.password, admin.name.clone(), UserRole::Admin)
        .await?;
    tracing::info!(email = %email, "Default admin user created");
    Ok(())
}

/// Create missing tables 1..=count as free; existing tables keep their state
pub async fn ensure_tables(db: &Surreal<Db>, count: u32) -> RepoResult<u32> {
    let repo = DiningTableRepository::new(db.clone());
    let mut created = 0;
    for number in 1..=count {
        if repo.ensure(number).await? {
            created += 1;
        }
    }
    if created > 0 {
        tracing::info!(created, total = count, "Dining tables initialized");
    }
    Ok(created)
}

/// Upsert tables 1..=count as free (used by `init-tables`)
pub async fn reset_tables(db: &Surreal<Db>, count: u32) -> RepoResult<u32> {
    let repo = DiningTableRepository::new(db.clone());
    for number in 1..=count {
        repo.reset(number).await?;
    }
    tracing::info!(total = count, "Dining tables reset to free");
    Ok(count)
}
