//! # Fallback Refresh Scheduling
//!
//! The change feed is the primary invalidation source, but it makes no
//! delivery guarantee: a dropped stream or a lagged receiver loses
//! signals. The fallback scheduler paces a periodic full re-fetch so every
//! cached projection converges regardless.

use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Default fallback interval between full re-fetches.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Refresh pacing state.
#[derive(Debug)]
pub struct RefreshScheduler {
    /// Last completed refresh
    last_refresh: RwLock<Option<Instant>>,
    /// Interval between refreshes
    interval: Duration,
    /// Whether the scheduler is active
    is_active: RwLock<bool>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_REFRESH_INTERVAL)
    }

    pub fn with_interval(interval: Duration) -> Self {
        Self {
            last_refresh: RwLock::new(None),
            interval,
            is_active: RwLock::new(false),
        }
    }

    /// Start the scheduler
    pub async fn start(&self) {
        *self.is_active.write().await = true;
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        *self.is_active.write().await = false;
    }

    /// Check if a refresh should be performed now
    pub async fn should_refresh(&self) -> bool {
        if !*self.is_active.read().await {
            return false;
        }

        match *self.last_refresh.read().await {
            Some(time) => time.elapsed() >= self.interval,
            None => true, // First refresh
        }
    }

    /// Record a completed refresh
    pub async fn record_refresh(&self) {
        *self.last_refresh.write().await = Some(Instant::now());
    }

    /// Time until the next refresh is due
    pub async fn time_until_next_refresh(&self) -> Duration {
        let last_refresh = *self.last_refresh.read().await;
        match last_refresh {
            Some(time) => self.interval.saturating_sub(time.elapsed()),
            None => Duration::ZERO,
        }
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}
