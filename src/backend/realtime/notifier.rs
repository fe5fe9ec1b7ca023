//! Change Notifier
//!
//! Publish/subscribe channels keyed by product, built on
//! `tokio::sync::broadcast`. Each product gets its own channel to prevent
//! cross-talk between viewers of different products; a separate
//! catalog-wide channel carries every event for listeners that watch the
//! whole product feed.
//!
//! Events are signals to re-fetch, not data deliveries: a subscriber that
//! re-fetches before the mutation is visible to reads will transiently see
//! stale state, which the fallback refresh timer corrects.
//!
//! Unsubscribing is dropping the receiver. A periodic cleanup task prunes
//! product channels with no remaining receivers so long-lived servers do
//! not accumulate dead senders.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use crate::shared::EngagementEvent;

/// Capacity of each broadcast channel. A lagging subscriber only misses
/// signals, and the next signal or timer tick re-fetches the same truth.
const CHANNEL_CAPACITY: usize = 100;

/// Per-product change fan-out plus a catalog-wide channel.
///
/// Cloning is cheap and shares the underlying channels.
#[derive(Clone)]
pub struct ChangeNotifier {
    product_channels: Arc<Mutex<HashMap<String, broadcast::Sender<EngagementEvent>>>>,
    catalog: broadcast::Sender<EngagementEvent>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (catalog, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            product_channels: Arc::new(Mutex::new(HashMap::new())),
            catalog,
        }
    }

    /// Get or create the broadcast sender for a product.
    fn sender_for(&self, product_id: &str) -> broadcast::Sender<EngagementEvent> {
        let mut channels = self.product_channels.lock().unwrap();
        channels
            .entry(product_id.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }

    /// Subscribe to mutations of one product's engagement facts.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe_product(&self, product_id: &str) -> broadcast::Receiver<EngagementEvent> {
        self.sender_for(product_id).subscribe()
    }

    /// Subscribe to every engagement mutation across the catalog.
    pub fn subscribe_catalog(&self) -> broadcast::Receiver<EngagementEvent> {
        self.catalog.subscribe()
    }

    /// Publish one event for one logical mutation.
    ///
    /// Fans out to the product's channel and the catalog channel. Returns
    /// the number of product-channel subscribers that received the event
    /// (0 when nobody is watching, which is not an error).
    pub fn publish(&self, event: EngagementEvent) -> usize {
        let _ = self.catalog.send(event.clone());

        let sender = {
            let channels = self.product_channels.lock().unwrap();
            channels.get(&event.product_id).cloned()
        };

        match sender {
            Some(sender) => match sender.send(event) {
                Ok(subscriber_count) => {
                    tracing::debug!(
                        "[Notifier] Event fanned out to {} subscribers",
                        subscriber_count
                    );
                    subscriber_count
                }
                Err(_) => 0,
            },
            None => 0,
        }
    }

    /// Drop product channels with no subscribers.
    pub fn cleanup_inactive_channels(&self) {
        self.product_channels
            .lock()
            .unwrap()
            .retain(|_, sender| sender.receiver_count() > 0);
    }

    /// Subscriber count for a product (for debugging)
    pub fn subscriber_count(&self, product_id: &str) -> usize {
        self.product_channels
            .lock()
            .unwrap()
            .get(product_id)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}
