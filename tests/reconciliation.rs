//! Reconciliation layer integration tests
//!
//! Exercises the client-side state machine against the in-process API:
//! optimistic toggles, the like/favorite coupling, revert on failure, and
//! invalidation-driven re-fetching.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use tokio::time::timeout;

use common::{actor, MockApi};
use swipeshop::client::{ClientError, EngagementClient, EngagementState, RefreshScheduler};
use swipeshop::shared::{ChangeKind, EngagementEvent, FactKind};

fn client(api: Arc<MockApi>) -> EngagementClient<MockApi, common::FixedIdentity> {
    EngagementClient::new(api, Arc::new(actor("u1")))
}

#[tokio::test]
async fn test_first_view_loads_projection() {
    let api = Arc::new(MockApi::new());
    api.seed_like("p1", "someone-else");
    let client = client(api.clone());

    assert_eq!(client.state("p1").await, EngagementState::Unknown);

    let projection = client.view("p1").await.unwrap();
    assert_eq!(projection.like_count, 1);
    assert!(!projection.is_liked);
    assert!(!projection.is_favorite);

    assert_matches!(client.state("p1").await, EngagementState::Loaded(_));
}

#[tokio::test]
async fn test_loaded_view_serves_from_cache() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    client.view("p1").await.unwrap();
    let fetches = api.call_count("like_count");

    client.view("p1").await.unwrap();
    assert_eq!(api.call_count("like_count"), fetches);
}

#[tokio::test]
async fn test_toggle_like_on_couples_favorite() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    let projection = client.toggle_like("p1").await.unwrap();
    assert!(projection.is_liked);
    assert!(projection.is_favorite);
    assert_eq!(projection.like_count, 1);

    assert!(api.has_like("p1", "u1"));
    assert!(api.has_favorite("p1", "u1"));
}

#[tokio::test]
async fn test_toggle_like_off_uncouples_favorite() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    client.toggle_like("p1").await.unwrap();
    let projection = client.toggle_like("p1").await.unwrap();

    assert!(!projection.is_liked);
    assert!(!projection.is_favorite);
    assert_eq!(projection.like_count, 0);
    assert!(!api.has_like("p1", "u1"));
    assert!(!api.has_favorite("p1", "u1"));
}

#[tokio::test]
async fn test_no_coupled_write_when_favorite_already_matches() {
    let api = Arc::new(MockApi::new());
    api.seed_favorite("p1", "u1");
    let client = client(api.clone());

    client.toggle_like("p1").await.unwrap();

    // Liking with the favorite already on issues no favorite write.
    assert_eq!(api.call_count("add_favorite"), 0);
}

#[tokio::test]
async fn test_toggle_favorite_never_touches_like() {
    let api = Arc::new(MockApi::new());
    api.seed_like("p1", "u1");
    let client = client(api.clone());

    let projection = client.toggle_favorite("p1").await.unwrap();
    assert!(projection.is_favorite);
    assert!(projection.is_liked);

    let projection = client.toggle_favorite("p1").await.unwrap();
    assert!(!projection.is_favorite);
    assert!(projection.is_liked);

    assert_eq!(api.call_count("add_like"), 0);
    assert_eq!(api.call_count("remove_like"), 0);
}

#[tokio::test]
async fn test_primary_write_failure_reverts_optimistic_flip() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    let before = client.view("p1").await.unwrap();

    api.fail_next_add_like(1);
    let error = client.toggle_like("p1").await.unwrap_err();
    assert_matches!(error, ClientError::Api(_));

    // Loaded(reverted): the projection is back to the pre-toggle state and
    // the next view re-fetches server truth.
    assert_eq!(client.view("p1").await.unwrap(), before);
    assert!(!api.has_like("p1", "u1"));
    assert!(!api.has_favorite("p1", "u1"));
}

#[tokio::test]
async fn test_coupled_write_retries_then_succeeds() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    api.fail_next_add_favorite(1);
    let projection = client.toggle_like("p1").await.unwrap();

    assert!(projection.is_favorite);
    assert!(api.has_favorite("p1", "u1"));
    assert_eq!(api.call_count("add_favorite"), 2);
}

#[tokio::test]
async fn test_coupled_write_exhaustion_surfaces_partial_application() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    // First attempt plus two retries, all failing.
    api.fail_next_add_favorite(3);
    let error = client.toggle_like("p1").await.unwrap_err();
    assert_matches!(error, ClientError::PartiallyApplied { .. });
    assert_eq!(api.call_count("add_favorite"), 3);

    // The like side applied; the facts have diverged until the next toggle.
    assert!(api.has_like("p1", "u1"));
    assert!(!api.has_favorite("p1", "u1"));

    let projection = client.view("p1").await.unwrap();
    assert!(projection.is_liked);
    assert!(!projection.is_favorite);
}

#[tokio::test]
async fn test_completed_write_invalidates_cache() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    client.toggle_like("p1").await.unwrap();

    // Another actor's like lands server-side; the post-write re-fetch picks
    // it up without an explicit signal.
    api.seed_like("p1", "someone-else");
    let projection = client.view("p1").await.unwrap();
    assert_eq!(projection.like_count, 2);
}

#[tokio::test]
async fn test_change_signal_invalidates() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    let projection = client.view("p1").await.unwrap();
    assert_eq!(projection.like_count, 0);

    api.seed_like("p1", "someone-else");
    // Cache still serves the stale count until a signal arrives.
    assert_eq!(client.view("p1").await.unwrap().like_count, 0);

    client
        .apply_signal(&EngagementEvent::new("p1", FactKind::Like, ChangeKind::Added))
        .await;
    assert_eq!(client.view("p1").await.unwrap().like_count, 1);
}

#[tokio::test]
async fn test_refresh_all_refetches_loaded_products() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    client.view("p1").await.unwrap();
    client.view("p2").await.unwrap();

    api.seed_like("p1", "someone-else");
    api.seed_like("p2", "someone-else");

    let refreshed = client.refresh_all().await;
    assert_eq!(refreshed, 2);
    assert_eq!(client.view("p1").await.unwrap().like_count, 1);
    assert_eq!(client.view("p2").await.unwrap().like_count, 1);
}

#[tokio::test]
async fn test_fallback_refresh_converges_without_signals() {
    let api = Arc::new(MockApi::new());
    let client = Arc::new(client(api.clone()));

    client.view("p1").await.unwrap();
    api.seed_like("p1", "someone-else");

    let scheduler = Arc::new(RefreshScheduler::with_interval(Duration::from_millis(50)));
    scheduler.start().await;
    let task = client.clone().spawn_fallback_refresh(scheduler);

    // No signal arrives; the timer alone must converge the cache.
    timeout(Duration::from_secs(5), async {
        loop {
            if client.view("p1").await.unwrap().like_count == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("fallback refresh never converged");

    task.abort();
}

#[tokio::test]
async fn test_favorites_listing_and_clear() {
    let api = Arc::new(MockApi::new());
    let client = client(api.clone());

    client.toggle_favorite("p1").await.unwrap();
    client.toggle_favorite("p2").await.unwrap();

    let mut favorites = client.favorites().await.unwrap();
    favorites.sort();
    assert_eq!(favorites, vec!["p1".to_string(), "p2".to_string()]);

    let removed = client.clear_favorites().await.unwrap();
    assert_eq!(removed, 2);
    assert!(client.favorites().await.unwrap().is_empty());
}
