//! User directory backed by SQLite

use async_trait::async_trait;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, error};

use super::models::{User, UserAttrs};
use crate::common::{generate_user_id, safe_email_log};

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Lookup and upsert operations the auth flows depend on
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Insert-or-update by email as one atomic operation
    ///
    /// `Ok(None)` means the directory accepted the call but produced no record.
    async fn find_or_create_user(
        &self,
        email: &str,
        attrs: &UserAttrs,
    ) -> Result<Option<User>, DirectoryError>;

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DirectoryError>;
}

#[derive(Debug, Clone)]
pub struct SqliteUserDirectory {
    db: SqlitePool,
}

impl SqliteUserDirectory {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserDirectory for SqliteUserDirectory {
    async fn find_or_create_user(
        &self,
        email: &str,
        attrs: &UserAttrs,
    ) -> Result<Option<User>, DirectoryError> {
        let candidate_id = generate_user_id();

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, name)
            VALUES (?, ?, ?)
            ON CONFLICT(email) DO UPDATE SET
                name = COALESCE(excluded.name, users.name),
                updated_at = datetime('now')
            RETURNING id, email, name, created_at, updated_at
            "#,
        )
        .bind(&candidate_id)
        .bind(email)
        .bind(attrs.name.as_deref())
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                email = %safe_email_log(email),
                "Database error upserting user"
            );
            DirectoryError::Database(e)
        })?;

        if let Some(u) = &user {
            debug!(
                user_id = %u.id,
                created = (u.id == candidate_id),
                email = %safe_email_log(email),
                "User upserted"
            );
        }

        Ok(user)
    }

    async fn get_user_by_id(&self, id: &str) -> Result<Option<User>, DirectoryError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, name, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(user)
    }
}
