//! # Engagement Reconciliation
//!
//! The client-side projection of engagement state, one entry per product:
//! the like count, whether the active actor has liked it, and whether they
//! have favorited it.
//!
//! ## State machine
//!
//! Each entry moves through `Unknown -> Loaded -> PendingWrite -> Loaded`:
//!
//! - **Unknown**: nothing cached; the first read fetches the count and both
//!   existence checks and lands in `Loaded`.
//! - **Loaded**: serves reads from cache until the entry is invalidated by
//!   a completed write, a change-feed signal, or the fallback refresh.
//! - **PendingWrite**: a toggle applied its optimistic flip and the write
//!   is in flight. Reads see the optimistic projection. On success the
//!   entry settles to `Loaded` and is invalidated so the next read fetches
//!   authoritative truth; on failure the flip is reverted and the entry is
//!   invalidated as well.
//!
//! ## Like/favorite coupling
//!
//! Toggling a like on when the favorite is off also adds the favorite;
//! toggling it off when the favorite is on also removes it. The coupling is
//! one-directional: toggling a favorite never touches the like. The two
//! writes are not atomic; the coupled second write is retried a bounded
//! number of times and then surfaced as `PartiallyApplied`, leaving the
//! facts diverged until a later toggle or refresh.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

use crate::client::api::{ApiError, EngagementApi};
use crate::client::feed::ChangeSubscription;
use crate::client::identity::IdentityProvider;
use crate::client::refresh::RefreshScheduler;
use crate::shared::EngagementEvent;

/// How often the fallback task polls the scheduler.
const FALLBACK_POLL: std::time::Duration = std::time::Duration::from_millis(250);

/// Cached engagement projection for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection {
    /// Number of distinct actors with an active like
    pub like_count: i64,
    /// Whether the active actor has liked the product
    pub is_liked: bool,
    /// Whether the active actor has favorited the product
    pub is_favorite: bool,
}

/// Per-product cache state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngagementState {
    /// Nothing cached yet
    Unknown,
    /// Cached projection, served until invalidated
    Loaded(Projection),
    /// Optimistic projection while a write is in flight
    PendingWrite(Projection),
}

/// Reconciliation-layer failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The like write applied but the coupled favorite write kept failing
    #[error("like toggled but the favorite update failed for {product_id}")]
    PartiallyApplied {
        product_id: String,
        #[source]
        source: ApiError,
    },

    /// A toggle arrived while a previous write was still in flight
    #[error("a write is already pending for {product_id}")]
    WritePending { product_id: String },
}

#[derive(Debug)]
struct ViewEntry {
    state: EngagementState,
    stale: bool,
}

/// The client reconciliation layer.
///
/// Holds the per-product projections and applies optimistic toggles
/// against them. All methods are asynchronous with respect to the
/// rendering thread and never block beyond the underlying round-trip.
pub struct EngagementClient<A: EngagementApi, I: IdentityProvider> {
    api: Arc<A>,
    identity: Arc<I>,
    views: RwLock<HashMap<String, ViewEntry>>,
    coupling_retries: u32,
}

impl<A: EngagementApi, I: IdentityProvider> EngagementClient<A, I> {
    pub fn new(api: Arc<A>, identity: Arc<I>) -> Self {
        Self {
            api,
            identity,
            views: RwLock::new(HashMap::new()),
            coupling_retries: 2,
        }
    }

    /// Override the bounded retry count for the coupled favorite write.
    pub fn with_coupling_retries(mut self, retries: u32) -> Self {
        self.coupling_retries = retries;
        self
    }

    /// Current cache state for a product, for inspection.
    pub async fn state(&self, product_id: &str) -> EngagementState {
        let views = self.views.read().await;
        views
            .get(product_id)
            .map(|entry| entry.state.clone())
            .unwrap_or(EngagementState::Unknown)
    }

    /// The projection for a product.
    ///
    /// Serves the cache when it is fresh, the optimistic projection while a
    /// write is pending, and otherwise fetches authoritative truth.
    pub async fn view(&self, product_id: &str) -> Result<Projection, ClientError> {
        {
            let views = self.views.read().await;
            if let Some(entry) = views.get(product_id) {
                match &entry.state {
                    EngagementState::PendingWrite(projection) => return Ok(*projection),
                    EngagementState::Loaded(projection) if !entry.stale => {
                        return Ok(*projection)
                    }
                    _ => {}
                }
            }
        }
        self.refresh(product_id).await
    }

    /// Fetch authoritative truth for a product and cache it.
    ///
    /// The count and both existence checks are issued concurrently; the
    /// entry only reaches `Loaded` once all have returned.
    pub async fn refresh(&self, product_id: &str) -> Result<Projection, ClientError> {
        let actor = self.identity.resolve();
        let (like_count, is_liked, is_favorite) = tokio::try_join!(
            self.api.like_count(product_id),
            self.api.is_liked(product_id, actor.as_str()),
            self.api.is_favorite(product_id, actor.as_str()),
        )?;

        let projection = Projection {
            like_count,
            is_liked,
            is_favorite,
        };

        let mut views = self.views.write().await;
        match views.get(product_id) {
            // A write started while we were fetching; its settle will
            // invalidate and the next read re-fetches.
            Some(entry) if matches!(entry.state, EngagementState::PendingWrite(_)) => {}
            _ => {
                views.insert(
                    product_id.to_string(),
                    ViewEntry {
                        state: EngagementState::Loaded(projection),
                        stale: false,
                    },
                );
            }
        }

        Ok(projection)
    }

    /// Toggle the active actor's like on a product.
    ///
    /// Optimistically flips `is_liked` and adjusts the count before the
    /// write is issued. Applies the one-directional favorite coupling. On
    /// primary-write failure the flip is reverted; on coupled-write
    /// exhaustion the error reports partial application.
    pub async fn toggle_like(&self, product_id: &str) -> Result<Projection, ClientError> {
        let current = self.view(product_id).await?;

        let turning_on = !current.is_liked;
        let mut optimistic = current;
        optimistic.is_liked = turning_on;
        optimistic.like_count += if turning_on { 1 } else { -1 };

        // Mirror the favorite only when it is out of line with the new
        // like state.
        let couple_favorite = current.is_favorite != turning_on;
        if couple_favorite {
            optimistic.is_favorite = turning_on;
        }

        self.begin_write(product_id, optimistic).await?;

        let actor = self.identity.resolve();
        let primary = if turning_on {
            self.api
                .add_like(product_id, actor.as_str())
                .await
                .map(|_| ())
        } else {
            self.api
                .remove_like(product_id, actor.as_str())
                .await
                .map(|_| ())
        };

        if let Err(e) = primary {
            // Loaded(reverted): the optimistic flip is rolled back and the
            // entry left stale so the next read re-checks the server.
            self.settle(product_id, current).await;
            return Err(e.into());
        }

        if couple_favorite {
            if let Err(e) = self.write_favorite_with_retry(product_id, &actor, turning_on).await {
                let mut partial = optimistic;
                partial.is_favorite = current.is_favorite;
                self.settle(product_id, partial).await;
                return Err(ClientError::PartiallyApplied {
                    product_id: product_id.to_string(),
                    source: e,
                });
            }
        }

        self.settle(product_id, optimistic).await;
        Ok(optimistic)
    }

    /// Toggle the active actor's favorite on a product.
    ///
    /// Never touches the like; the coupling is one-directional.
    pub async fn toggle_favorite(&self, product_id: &str) -> Result<Projection, ClientError> {
        let current = self.view(product_id).await?;

        let turning_on = !current.is_favorite;
        let mut optimistic = current;
        optimistic.is_favorite = turning_on;

        self.begin_write(product_id, optimistic).await?;

        let actor = self.identity.resolve();
        let result = if turning_on {
            self.api
                .add_favorite(product_id, actor.as_str())
                .await
                .map(|_| ())
        } else {
            self.api
                .remove_favorite(product_id, actor.as_str())
                .await
                .map(|_| ())
        };

        if let Err(e) = result {
            self.settle(product_id, current).await;
            return Err(e.into());
        }

        self.settle(product_id, optimistic).await;
        Ok(optimistic)
    }

    /// All product ids the active actor has favorited, most recent first.
    pub async fn favorites(&self) -> Result<Vec<String>, ClientError> {
        let actor = self.identity.resolve();
        let favorites = self.api.favorites_for(actor.as_str()).await?;
        Ok(favorites.into_iter().map(|f| f.product_id).collect())
    }

    /// Remove every favorite of the active actor, sequentially.
    ///
    /// Returns how many were removed. Stops at the first failure; already
    /// removed favorites stay removed.
    pub async fn clear_favorites(&self) -> Result<usize, ClientError> {
        let actor = self.identity.resolve();
        let product_ids = self.favorites().await?;
        let mut removed = 0;
        for product_id in &product_ids {
            self.api.remove_favorite(product_id, actor.as_str()).await?;
            removed += 1;
            self.invalidate(product_id).await;
        }
        Ok(removed)
    }

    /// Mark a product's cached projection stale so the next read
    /// re-fetches.
    pub async fn invalidate(&self, product_id: &str) {
        let mut views = self.views.write().await;
        if let Some(entry) = views.get_mut(product_id) {
            entry.stale = true;
        }
    }

    /// React to a change-feed signal.
    pub async fn apply_signal(&self, event: &EngagementEvent) {
        self.invalidate(&event.product_id).await;
    }

    /// Re-fetch every loaded projection; the fallback convergence pass.
    ///
    /// Pending writes are skipped; their settle invalidates them anyway.
    /// Individual fetch failures are logged and do not stop the pass.
    pub async fn refresh_all(&self) -> usize {
        let product_ids: Vec<String> = {
            let views = self.views.read().await;
            views
                .iter()
                .filter(|(_, entry)| matches!(entry.state, EngagementState::Loaded(_)))
                .map(|(id, _)| id.clone())
                .collect()
        };

        let mut refreshed = 0;
        for product_id in &product_ids {
            match self.refresh(product_id).await {
                Ok(_) => refreshed += 1,
                Err(e) => tracing::warn!("Fallback refresh failed for {}: {}", product_id, e),
            }
        }
        refreshed
    }

    /// Flip the entry to `PendingWrite`, rejecting concurrent toggles.
    async fn begin_write(
        &self,
        product_id: &str,
        optimistic: Projection,
    ) -> Result<(), ClientError> {
        let mut views = self.views.write().await;
        let entry = views
            .entry(product_id.to_string())
            .or_insert_with(|| ViewEntry {
                state: EngagementState::Unknown,
                stale: false,
            });
        if matches!(entry.state, EngagementState::PendingWrite(_)) {
            return Err(ClientError::WritePending {
                product_id: product_id.to_string(),
            });
        }
        entry.state = EngagementState::PendingWrite(optimistic);
        Ok(())
    }

    /// Land the entry in `Loaded` and leave it stale: completed writes,
    /// confirmed or reverted, always trigger a re-fetch of server truth.
    async fn settle(&self, product_id: &str, projection: Projection) {
        let mut views = self.views.write().await;
        views.insert(
            product_id.to_string(),
            ViewEntry {
                state: EngagementState::Loaded(projection),
                stale: true,
            },
        );
    }

    /// The coupled favorite write, retried a bounded number of times.
    async fn write_favorite_with_retry(
        &self,
        product_id: &str,
        actor: &crate::client::identity::ActorId,
        turning_on: bool,
    ) -> Result<(), ApiError> {
        let mut attempt = 0;
        loop {
            let result = if turning_on {
                self.api
                    .add_favorite(product_id, actor.as_str())
                    .await
                    .map(|_| ())
            } else {
                self.api
                    .remove_favorite(product_id, actor.as_str())
                    .await
                    .map(|_| ())
            };

            match result {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.coupling_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Coupled favorite write failed for {} (attempt {}): {}",
                        product_id,
                        attempt,
                        e
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<A, I> EngagementClient<A, I>
where
    A: EngagementApi + 'static,
    I: IdentityProvider + 'static,
{
    /// Spawn the fallback refresh loop.
    ///
    /// Re-fetches all loaded projections whenever the scheduler says a
    /// refresh is due. The task runs until aborted.
    pub fn spawn_fallback_refresh(
        self: Arc<Self>,
        scheduler: Arc<RefreshScheduler>,
    ) -> JoinHandle<()> {
        let client = self;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(FALLBACK_POLL);
            loop {
                ticker.tick().await;
                if scheduler.should_refresh().await {
                    let refreshed = client.refresh_all().await;
                    scheduler.record_refresh().await;
                    if refreshed > 0 {
                        tracing::debug!("Fallback refresh updated {} products", refreshed);
                    }
                }
            }
        })
    }

    /// Spawn a task that invalidates projections on change-feed signals.
    ///
    /// Ends when the subscription closes; abort the handle to stop early.
    pub fn spawn_signal_listener(
        self: Arc<Self>,
        mut subscription: ChangeSubscription,
    ) -> JoinHandle<()> {
        let client = self;
        tokio::spawn(async move {
            while let Some(event) = subscription.next_signal().await {
                client.apply_signal(&event).await;
            }
            tracing::debug!("Change subscription closed");
        })
    }
}
