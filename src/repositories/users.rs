// src/repositories/users.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::user::{Role, User},
    repositories::is_unique_violation,
};

const COLUMNS: &str = "id, username, password, role, created_at";

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken.
    async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, username: &str, password_hash: &str, role: Role) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (username, password, role)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        ))
        .bind(username)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Username '{}' already exists", username))
            } else {
                tracing::error!("Failed to create user: {:?}", e);
                AppError::from(e)
            }
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
