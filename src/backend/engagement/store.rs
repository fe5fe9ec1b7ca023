//! Engagement Store trait and in-memory implementation
//!
//! The store owns persistence of favorite and like facts exclusively.
//! Both operations families are idempotent at this layer:
//!
//! - `add` enforces the at-most-one-row-per-pair invariant and reports
//!   whether a row was actually created, so callers can publish exactly one
//!   change notification per logical mutation.
//! - `remove` of an absent fact returns `false`, never an error.
//!
//! Store errors surface to the caller unretried; retry policy belongs to
//! the client layer.
//!
//! The in-memory store backs local development and tests when no
//! `DATABASE_URL` is configured, the same fallback the storefront has
//! always shipped with.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::shared::{Favorite, Like};

/// Persistence-layer failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database returned an error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The datastore is unreachable
    #[error("store unavailable: {message}")]
    Unavailable { message: String },
}

/// Result of an `add`: the fact for the pair, plus whether this call
/// created it. An `add` that finds an existing row is a successful no-op.
#[derive(Debug, Clone)]
pub struct AddOutcome<T> {
    pub fact: T,
    pub newly_created: bool,
}

/// Authoritative server-side store of engagement facts.
///
/// Favorites and likes are independent fact families with identical
/// operations; the like/favorite coupling is a client-layer policy and
/// never reaches this trait.
#[async_trait]
pub trait EngagementStore: Send + Sync {
    async fn add_favorite(&self, product_id: &str, user_id: &str)
        -> Result<AddOutcome<Favorite>, StoreError>;

    /// Delete the favorite if present; `false` when there was none.
    async fn remove_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError>;

    async fn is_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError>;

    /// All favorites for one actor, most recent first.
    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, StoreError>;

    async fn add_like(&self, product_id: &str, user_id: &str)
        -> Result<AddOutcome<Like>, StoreError>;

    /// Delete the like if present; `false` when there was none.
    async fn remove_like(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError>;

    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError>;

    /// Number of distinct actors with an active like on the product.
    async fn like_count(&self, product_id: &str) -> Result<i64, StoreError>;
}

type PairKey = (String, String);

/// In-memory engagement store.
///
/// Facts are keyed by `(product_id, user_id)`, which enforces the same
/// uniqueness the Postgres schema does with its unique constraint.
#[derive(Debug, Clone, Default)]
pub struct MemEngagementStore {
    favorites: Arc<Mutex<HashMap<PairKey, Favorite>>>,
    likes: Arc<Mutex<HashMap<PairKey, Like>>>,
}

impl MemEngagementStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn key(product_id: &str, user_id: &str) -> PairKey {
    (product_id.to_string(), user_id.to_string())
}

#[async_trait]
impl EngagementStore for MemEngagementStore {
    async fn add_favorite(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<AddOutcome<Favorite>, StoreError> {
        let mut favorites = self.favorites.lock().unwrap();
        if let Some(existing) = favorites.get(&key(product_id, user_id)) {
            return Ok(AddOutcome {
                fact: existing.clone(),
                newly_created: false,
            });
        }
        let favorite = Favorite {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        favorites.insert(key(product_id, user_id), favorite.clone());
        Ok(AddOutcome {
            fact: favorite,
            newly_created: true,
        })
    }

    async fn remove_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let mut favorites = self.favorites.lock().unwrap();
        Ok(favorites.remove(&key(product_id, user_id)).is_some())
    }

    async fn is_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let favorites = self.favorites.lock().unwrap();
        Ok(favorites.contains_key(&key(product_id, user_id)))
    }

    async fn favorites_for_user(&self, user_id: &str) -> Result<Vec<Favorite>, StoreError> {
        let favorites = self.favorites.lock().unwrap();
        let mut result: Vec<Favorite> = favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn add_like(
        &self,
        product_id: &str,
        user_id: &str,
    ) -> Result<AddOutcome<Like>, StoreError> {
        let mut likes = self.likes.lock().unwrap();
        if let Some(existing) = likes.get(&key(product_id, user_id)) {
            return Ok(AddOutcome {
                fact: existing.clone(),
                newly_created: false,
            });
        }
        let like = Like {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        };
        likes.insert(key(product_id, user_id), like.clone());
        Ok(AddOutcome {
            fact: like,
            newly_created: true,
        })
    }

    async fn remove_like(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let mut likes = self.likes.lock().unwrap();
        Ok(likes.remove(&key(product_id, user_id)).is_some())
    }

    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, StoreError> {
        let likes = self.likes.lock().unwrap();
        Ok(likes.contains_key(&key(product_id, user_id)))
    }

    async fn like_count(&self, product_id: &str) -> Result<i64, StoreError> {
        let likes = self.likes.lock().unwrap();
        Ok(likes.values().filter(|l| l.product_id == product_id).count() as i64)
    }
}
