//! User Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::auth::hash_password;
use crate::db::models::{User, UserUpdate};
use crate::utils::time::now_millis;
use shared::models::UserRole;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const TABLE: &str = "user";

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find all users
    pub async fn find_all(&self) -> RepoResult<Vec<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user ORDER BY created_at")
            .await?
            .take(0)?;
        Ok(users)
    }

    /// Find user by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<User>> {
        let thing = parse_record_id(TABLE, id)?;
        let user: Option<User> = self.base.db().select(thing).await?;
        Ok(user)
    }

    /// Find user by (normalized) email
    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let email_owned = email.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email_owned))
            .await?;
        let users: Vec<User> = result.take(0)?;
        Ok(users.into_iter().next())
    }

    /// Users that have logged in, newest login first
    pub async fn find_recent_logins(&self, limit: usize) -> RepoResult<Vec<User>> {
        let mut users: Vec<User> = self
            .find_all()
            .await?
            .into_iter()
            .filter(|u| u.last_login.is_some())
            .collect();
        users.sort_by(|a, b| b.last_login.cmp(&a.last_login));
        users.truncate(limit);
        Ok(users)
    }

    /// Create a new user (email already normalized, password plain)
    pub async fn create(
        &self,
        email: String,
        password: &str,
        name: String,
        role: UserRole,
    ) -> RepoResult<User> {
        if self.find_by_email(&email).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "User '{}' already exists",
                email
            )));
        }

        let password_hash = hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;

        let user = User {
            id: None,
            email,
            password_hash,
            name,
            role,
            is_active: true,
            last_login: None,
            created_at: now_millis(),
        };

        let created: Option<User> = self.base.db().create(TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Update a user
    pub async fn update(&self, id: &str, data: UserUpdate) -> RepoResult<User> {
        let thing = parse_record_id(TABLE, id)?;
        let existing = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))?;

        // Check duplicate email if changing
        if let Some(ref new_email) = data.email
            && new_email != &existing.email
            && self.find_by_email(new_email).await?.is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "User '{}' already exists",
                new_email
            )));
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
            .ok_or_else(|| RepoError::NotFound(format!("User {} not found", id)))
    }

    /// Replace the password hash
    pub async fn update_password(&self, id: &str, password: &str) -> RepoResult<()> {
        let thing = parse_record_id(TABLE, id)?;
        let password_hash = hash_password(password)
            .map_err(|e| RepoError::Database(format!("Failed to hash password: {}", e)))?;
        self.base
            .db()
            .query("UPDATE $thing SET password_hash = $hash")
            .bind(("thing", thing))
            .bind(("hash", password_hash))
            .await?
            .check()?;
        Ok(())
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: &str, at: i64) -> RepoResult<()> {
        let thing = parse_record_id(TABLE, id)?;
        self.base
            .db()
            .query("UPDATE $thing SET last_login = $at")
            .bind(("thing", thing))
            .bind(("at", at))
            .await?
            .check()?;
        Ok(())
    }

    /// Hard delete a user; `false` when it did not exist
    pub async fn delete(&self, id: &str) -> RepoResult<bool> {
        let thing = parse_record_id(TABLE, id)?;
        let deleted: Option<User> = self.base.db().delete(thing).await?;
        Ok(deleted.is_some())
    }
}
