//! Shared test helpers
//!
//! An in-process `EngagementApi` with call recording and failure
//! injection, plus a fixed identity provider, so reconciliation and
//! migration tests run deterministically without a server.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use swipeshop::client::{ActorId, ApiError, EngagementApi, IdentityProvider};
use swipeshop::shared::{Favorite, Like};

/// Identity provider that always resolves to the same actor.
pub struct FixedIdentity(pub ActorId);

impl IdentityProvider for FixedIdentity {
    fn resolve(&self) -> ActorId {
        self.0.clone()
    }
}

pub fn actor(id: &str) -> FixedIdentity {
    FixedIdentity(ActorId::user(id))
}

type PairKey = (String, String);

/// In-process engagement API with the same semantics as the server store:
/// idempotent adds, `false` from removes of absent facts.
///
/// Records every call by name and can be told to fail the next N calls of
/// a given operation with a synthetic 500.
#[derive(Default)]
pub struct MockApi {
    favorites: Mutex<HashMap<PairKey, Favorite>>,
    likes: Mutex<HashMap<PairKey, Like>>,
    calls: Mutex<Vec<String>>,
    fail_add_favorite: AtomicU32,
    fail_remove_favorite: AtomicU32,
    fail_add_like: AtomicU32,
    fail_remove_like: AtomicU32,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_add_favorite(&self, n: u32) {
        self.fail_add_favorite.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_remove_favorite(&self, n: u32) {
        self.fail_remove_favorite.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_add_like(&self, n: u32) {
        self.fail_add_like.store(n, Ordering::SeqCst);
    }

    pub fn fail_next_remove_like(&self, n: u32) {
        self.fail_remove_like.store(n, Ordering::SeqCst);
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(name))
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn has_favorite(&self, product_id: &str, user_id: &str) -> bool {
        self.favorites
            .lock()
            .unwrap()
            .contains_key(&key(product_id, user_id))
    }

    pub fn has_like(&self, product_id: &str, user_id: &str) -> bool {
        self.likes
            .lock()
            .unwrap()
            .contains_key(&key(product_id, user_id))
    }

    pub fn seed_like(&self, product_id: &str, user_id: &str) {
        self.likes.lock().unwrap().insert(
            key(product_id, user_id),
            Like {
                id: Uuid::new_v4(),
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            },
        );
    }

    pub fn seed_favorite(&self, product_id: &str, user_id: &str) {
        self.favorites.lock().unwrap().insert(
            key(product_id, user_id),
            Favorite {
                id: Uuid::new_v4(),
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            },
        );
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_failure(&self, counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn synthetic_failure() -> ApiError {
        ApiError::Status {
            status: 500,
            message: "injected failure".to_string(),
        }
    }
}

fn key(product_id: &str, user_id: &str) -> PairKey {
    (product_id.to_string(), user_id.to_string())
}

#[async_trait]
impl EngagementApi for MockApi {
    async fn favorites_for(&self, user_id: &str) -> Result<Vec<Favorite>, ApiError> {
        self.record(format!("favorites_for {}", user_id));
        let favorites = self.favorites.lock().unwrap();
        let mut result: Vec<Favorite> = favorites
            .values()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn add_favorite(&self, product_id: &str, user_id: &str) -> Result<Favorite, ApiError> {
        self.record(format!("add_favorite {} {}", product_id, user_id));
        if self.take_failure(&self.fail_add_favorite) {
            return Err(Self::synthetic_failure());
        }
        let mut favorites = self.favorites.lock().unwrap();
        let favorite = favorites
            .entry(key(product_id, user_id))
            .or_insert_with(|| Favorite {
                id: Uuid::new_v4(),
                product_id: product_id.to_string(),
                user_id: user_id.to_string(),
                created_at: Utc::now(),
            });
        Ok(favorite.clone())
    }

    async fn remove_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.record(format!("remove_favorite {} {}", product_id, user_id));
        if self.take_failure(&self.fail_remove_favorite) {
            return Err(Self::synthetic_failure());
        }
        let mut favorites = self.favorites.lock().unwrap();
        Ok(favorites.remove(&key(product_id, user_id)).is_some())
    }

    async fn is_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.record(format!("is_favorite {} {}", product_id, user_id));
        Ok(self.has_favorite(product_id, user_id))
    }

    async fn like_count(&self, product_id: &str) -> Result<i64, ApiError> {
        self.record(format!("like_count {}", product_id));
        let likes = self.likes.lock().unwrap();
        Ok(likes.values().filter(|l| l.product_id == product_id).count() as i64)
    }

    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.record(format!("is_liked {} {}", product_id, user_id));
        Ok(self.has_like(product_id, user_id))
    }

    async fn add_like(&self, product_id: &str, user_id: &str) -> Result<Like, ApiError> {
        self.record(format!("add_like {} {}", product_id, user_id));
        if self.take_failure(&self.fail_add_like) {
            return Err(Self::synthetic_failure());
        }
        let mut likes = self.likes.lock().unwrap();
        let like = likes.entry(key(product_id, user_id)).or_insert_with(|| Like {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now(),
        });
        Ok(like.clone())
    }

    async fn remove_like(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        self.record(format!("remove_like {} {}", product_id, user_id));
        if self.take_failure(&self.fail_remove_like) {
            return Err(Self::synthetic_failure());
        }
        let mut likes = self.likes.lock().unwrap();
        Ok(likes.remove(&key(product_id, user_id)).is_some())
    }
}
