//! Engagement fact types and wire bodies
//!
//! A Favorite and a Like are structurally identical facts: "this actor
//! marked this product". They are semantically distinct, stored in separate
//! tables, and kept as separate Rust types so a handler cannot hand one to
//! an endpoint expecting the other.
//!
//! All wire bodies are camelCase JSON, matching the storefront client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// A persisted favorite fact.
///
/// At most one row exists per `(product_id, user_id)` pair; presence means
/// the actor marked the product as a favorite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    /// Row identity
    pub id: Uuid,
    /// Product the fact refers to
    pub product_id: String,
    /// Actor (authenticated user id or guest id)
    pub user_id: String,
    /// When the actor toggled the favorite on
    pub created_at: DateTime<Utc>,
}

/// A persisted like fact.
///
/// Same shape and invariants as [`Favorite`], counted per product for
/// display. Favorites are only ever existence-checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    /// Row identity
    pub id: Uuid,
    /// Product the fact refers to
    pub product_id: String,
    /// Actor (authenticated user id or guest id)
    pub user_id: String,
    /// When the actor toggled the like on
    pub created_at: DateTime<Utc>,
}

/// Body of `POST`/`DELETE` on `/api/favorites` and `/api/likes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRequest {
    pub product_id: String,
    pub user_id: String,
}

impl EngagementRequest {
    pub fn new(product_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            user_id: user_id.into(),
        }
    }

    /// Reject empty identifiers before they reach the store.
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.product_id.trim().is_empty() {
            return Err(SharedError::validation("productId", "must not be empty"));
        }
        if self.user_id.trim().is_empty() {
            return Err(SharedError::validation("userId", "must not be empty"));
        }
        Ok(())
    }
}

/// Response of `GET /api/favorites/check/{productId}/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteCheckResponse {
    pub is_favorite: bool,
}

/// Response of `GET /api/likes/check/{productId}/{userId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCheckResponse {
    pub is_liked: bool,
}

/// Response of `GET /api/likes/count/{productId}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeCountResponse {
    pub count: i64,
}
