//! # User Repository
//!
//! Database operations for staff accounts. Accounts are deactivated, never
//! deleted, so historical sales keep a valid cashier reference.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::Visibility;
use shopfront_core::{Role, User};

const COLUMNS: &str =
    "id, username, password_hash, full_name, role, is_active, created_at, last_login_at";

/// A new account to register. The caller hashes the password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub full_name: String,
    pub role: Role,
}

/// Repository for user database operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// ## Errors
    /// * `DbError::UniqueViolation` - username already taken
    pub async fn insert(&self, new_user: NewUser) -> DbResult<User> {
        debug!(username = %new_user.username, "Inserting user");

        let user = User {
            id: Uuid::new_v4().to_string(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            full_name: new_user.full_name,
            role: new_user.role,
            is_active: true,
            created_at: Utc::now(),
            last_login_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO users (
                id, username, password_hash, full_name, role,
                is_active, created_at, last_login_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(user.role)
        .bind(user.is_active)
        .bind(user.created_at)
        .bind(user.last_login_at)
        .execute(&self.pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username, regardless of active state; the login path
    /// distinguishes "unknown" from "disabled" itself.
    pub async fn find_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Gets a user by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists users, newest first.
    pub async fn list(&self, visibility: Visibility) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE {} ORDER BY created_at DESC",
            visibility.predicate()
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Stamps a successful login.
    pub async fn touch_last_login(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query("UPDATE users SET last_login_at = ?2 WHERE id = ?1")
            .bind(id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn cashier(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "argon2-hash".to_string(),
            full_name: "Test Cashier".to_string(),
            role: Role::Cashier,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let db = test_db().await;
        let repo = db.users();

        let inserted = repo.insert(cashier("alice")).await.unwrap();

        let by_name = repo.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_name.id, inserted.id);
        assert_eq!(by_name.role, Role::Cashier);
        assert!(by_name.is_active);
        assert!(by_name.last_login_at.is_none());

        let missing = repo.find_by_username("nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let db = test_db().await;
        let repo = db.users();

        repo.insert(cashier("alice")).await.unwrap();
        let err = repo.insert(cashier("alice")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_touch_last_login() {
        let db = test_db().await;
        let repo = db.users();

        let user = repo.insert(cashier("alice")).await.unwrap();
        repo.touch_last_login(&user.id).await.unwrap();

        let reloaded = repo.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }
}
