//! PostgreSQL engagement store
//!
//! This module contains the database-backed implementation of
//! [`EngagementStore`]. Uniqueness of `(product_id, user_id)` is enforced
//! by the schema's unique constraints; `add` uses `ON CONFLICT DO NOTHING`
//! and reports whether a row was actually inserted, closing the
//! concurrent-duplicate race without relying on client-side gating.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::store::{AddOutcome, EngagementStore, StoreError};
use crate::shared::{Favorite, Like};

/// Engagement store backed by a PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PgEngagementStore {
    pool: PgPool,
}

impl PgEngagementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn favorite_from_row(row: &sqlx::postgres::PgRow) -> Favorite {
    Favorite {
        id: row.get("id"),
        product_id: row.get("product_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

fn like_from_row(row: &sqlx::postgres::PgRow) -> Like {
    Like {
        id: row.get("id"),
        product_id: row.get("product_id"),
        user_id: row.get("user_id"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl EngagementStore for PgEngagementStore {
    async fn add_favorite(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<AddOutcome<Favorite>, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO favorites (id, product_id, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, user_id) DO NOTHING
            RETURNING id, product_id, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(product_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(AddOutcome {
                fact: favorite_from_row(&row),
                newly_created: true,
            });
        }

        // Lost the insert to an existing row; return it unchanged.
        let existing = sqlx::query(
            r#"
            SELECT id, product_id, user_id, created_at
            FROM favorites
            WHERE product_id = $1 AND user_id = $2
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AddOutcome {
            fact: favorite_from_row(&existing),
            newly_created: false,
        })
    }

    async fn remove_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM favorites
            WHERE product_id = $1 AND user_id = $2
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS present
            FROM favorites
            WHERE product_id = $1 AND user_id = $2
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, product_id, user_id, created_at
            FROM favorites
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(favorite_from_row).collect())
    }

    async fn add_like(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<AddOutcome<Like>, StoreError> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO likes (id, product_id, user_id, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (product_id, user_id) DO NOTHING
            RETURNING id, product_id, user_id, created_at
            "#,
        )
        .bind(id)
        .bind(product_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(AddOutcome {
                fact: like_from_row(&row),
                newly_created: true,
            });
        }

        let existing = sqlx::query(
            r#"
            SELECT id, product_id, user_id, created_at
            FROM likes
            WHERE product_id = $1 AND user_id = $2
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AddOutcome {
            fact: like_from_row(&existing),
            newly_created: false,
        })
    }

    async fn remove_like(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM likes
            WHERE product_id = $1 AND user_id = $2
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT 1 AS present
            FROM likes
            WHERE product_id = $1 AND user_id = $2
            "#,
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    async fn like_count(&self, product_id: &str) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM likes
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("count"))
    }
}
