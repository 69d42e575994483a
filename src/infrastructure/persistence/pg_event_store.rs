//! PostgreSQL implementation of the event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::User;
use crate::domain::events::{IdentityEvent, LinkCopyEvent};
use crate::domain::repositories::EventStore;
use crate::error::AppError;

/// PostgreSQL repository for users and their events.
///
/// Events are append-only; `users.expires_at` is the only column ever updated.
pub struct PgEventStore {
    pool: Arc<PgPool>,
}

impl PgEventStore {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Lists identities that have not expired yet, newest first.
    pub async fn list_active_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, (String, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, created_at, expires_at
            FROM users
            WHERE expires_at > NOW()
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, created_at, expires_at)| User::new(id, created_at, expires_at))
            .collect())
    }

    /// Lists every identity ever minted, expired ones included, newest first.
    pub async fn list_all_users(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, (String, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT id, created_at, expires_at
            FROM users
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, created_at, expires_at)| User::new(id, created_at, expires_at))
            .collect())
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn save_user(&self, user: &User) -> Result<(), AppError> {
        debug!(user_id = %user.id, "Saving user");

        sqlx::query(
            r#"
            INSERT INTO users (id, created_at, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&user.id)
        .bind(user.created_at)
        .bind(user.expires_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn save_link_copy_event(&self, event: &LinkCopyEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO link_copy_events (happened_at, user_id, url)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event.happened_at)
        .bind(&event.user_id)
        .bind(&event.url)
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn save_identity_event(&self, event: &IdentityEvent) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO identity_events (happened_at, user_id, action)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(event.happened_at)
        .bind(&event.user_id)
        .bind(event.action.as_str())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn expire_user(&self, user_id: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET expires_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .execute(self.pool.as_ref())
        .await?;

        match result.rows_affected() {
            1 => Ok(()),
            0 => Err(AppError::not_found(
                "User not found",
                json!({ "user_id": user_id }),
            )),
            affected => Err(AppError::internal(
                "Expected exactly one user to expire",
                json!({ "user_id": user_id, "affected": affected }),
            )),
        }
    }

    async fn fetch_clicks_for_unexpired_users(&self) -> Result<Vec<LinkCopyEvent>, AppError> {
        let rows = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
            r#"
            SELECT c.user_id, c.url, c.happened_at
            FROM users u
            JOIN link_copy_events c ON c.user_id = u.id
            WHERE u.expires_at > NOW()
            ORDER BY c.happened_at ASC, c.id ASC
            "#,
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(user_id, url, happened_at)| LinkCopyEvent::at(happened_at, user_id, url))
            .collect())
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
