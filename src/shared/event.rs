//! Change events
//!
//! An [`EngagementEvent`] is the signal fanned out by the Change Notifier
//! whenever an engagement fact is created or deleted. It deliberately does
//! not carry the changed data: receivers re-fetch from the store, so a
//! signal can never deliver a stale payload. There is no ordering guarantee
//! between receiving a signal and the mutation being visible to a fresh
//! read; the fallback refresh timer provides convergence.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which fact type changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FactKind {
    Favorite,
    Like,
}

impl FactKind {
    /// Stable name used as the SSE event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FactKind::Favorite => "favorite",
            FactKind::Like => "like",
        }
    }
}

/// Whether the fact was created or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeKind {
    Added,
    Removed,
}

/// A re-fetch signal scoped to one product.
///
/// Exactly one event is published per logical mutation: an idempotent `add`
/// that found an existing row, or a `remove` of an absent row, publishes
/// nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementEvent {
    /// Product whose engagement facts changed
    pub product_id: String,
    /// Which fact table changed
    pub fact: FactKind,
    /// Created or deleted
    pub change: ChangeKind,
    /// Server-side time of the mutation
    pub occurred_at: DateTime<Utc>,
}

impl EngagementEvent {
    pub fn new(product_id: impl Into<String>, fact: FactKind, change: ChangeKind) -> Self {
        Self {
            product_id: product_id.into(),
            fact,
            change,
            occurred_at: Utc::now(),
        }
    }
}
