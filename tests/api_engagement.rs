//! Engagement API integration tests
//!
//! Drives the full router over an in-memory store and checks the REST
//! contract: status codes, body shapes, idempotent unset, count
//! correctness, and exactly one change notification per logical mutation.

#[cfg(feature = "ssr")]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use swipeshop::backend::engagement::MemEngagementStore;
    use swipeshop::backend::realtime::ChangeNotifier;
    use swipeshop::backend::routes::create_router;
    use swipeshop::backend::server::AppState;
    use swipeshop::shared::{ChangeKind, FactKind, Favorite, Like};

    fn create_test_server() -> (TestServer, ChangeNotifier) {
        let notifier = ChangeNotifier::new();
        let state = AppState::new(Arc::new(MemEngagementStore::new()), notifier.clone());
        let server = TestServer::new(create_router(state)).unwrap();
        (server, notifier)
    }

    #[tokio::test]
    async fn test_add_favorite_returns_created_record() {
        let (server, _) = create_test_server();

        let response = server
            .post("/api/favorites")
            .json(&json!({ "productId": "p1", "userId": "u1" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::CREATED);
        let favorite: Favorite = response.json();
        assert_eq!(favorite.product_id, "p1");
        assert_eq!(favorite.user_id, "u1");
    }

    #[tokio::test]
    async fn test_list_favorites_for_actor() {
        let (server, _) = create_test_server();

        for product in ["p1", "p2"] {
            server
                .post("/api/favorites")
                .json(&json!({ "productId": product, "userId": "u1" }))
                .await;
        }
        server
            .post("/api/favorites")
            .json(&json!({ "productId": "p3", "userId": "u2" }))
            .await;

        let response = server.get("/api/favorites/u1").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let favorites: Vec<Favorite> = response.json();
        assert_eq!(favorites.len(), 2);
        assert!(favorites.iter().all(|f| f.user_id == "u1"));
    }

    #[tokio::test]
    async fn test_remove_favorite_then_idempotent_unset() {
        let (server, _) = create_test_server();

        server
            .post("/api/favorites")
            .json(&json!({ "productId": "p1", "userId": "u1" }))
            .await;

        let body = json!({ "productId": "p1", "userId": "u1" });
        let response = server.delete("/api/favorites").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        // Removing an absent fact is the routine 404, with no side effect.
        let response = server.delete("/api/favorites").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let response = server.get("/api/favorites/check/p1/u1").await;
        assert_eq!(response.json::<serde_json::Value>()["isFavorite"], false);
    }

    #[tokio::test]
    async fn test_favorite_check_endpoint() {
        let (server, _) = create_test_server();

        server
            .post("/api/favorites")
            .json(&json!({ "productId": "p1", "userId": "u1" }))
            .await;

        let response = server.get("/api/favorites/check/p1/u1").await;
        assert_eq!(response.json::<serde_json::Value>()["isFavorite"], true);

        let response = server.get("/api/favorites/check/p1/u2").await;
        assert_eq!(response.json::<serde_json::Value>()["isFavorite"], false);
    }

    #[tokio::test]
    async fn test_like_toggle_convergence() {
        let (server, _) = create_test_server();
        let body = json!({ "productId": "p1", "userId": "u1" });

        let response = server.post("/api/likes").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let like: Like = response.json();
        assert_eq!(like.product_id, "p1");

        let response = server.get("/api/likes/check/p1/u1").await;
        assert_eq!(response.json::<serde_json::Value>()["isLiked"], true);

        let response = server.delete("/api/likes").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        let response = server.get("/api/likes/check/p1/u1").await;
        assert_eq!(response.json::<serde_json::Value>()["isLiked"], false);
    }

    #[tokio::test]
    async fn test_like_count_tracks_distinct_actors() {
        let (server, _) = create_test_server();

        for user in ["u1", "u2", "u3"] {
            server
                .post("/api/likes")
                .json(&json!({ "productId": "p1", "userId": user }))
                .await;
        }

        let response = server.get("/api/likes/count/p1").await;
        assert_eq!(response.json::<serde_json::Value>()["count"], 3);

        server
            .delete("/api/likes")
            .json(&json!({ "productId": "p1", "userId": "u2" }))
            .await;

        let response = server.get("/api/likes/count/p1").await;
        assert_eq!(response.json::<serde_json::Value>()["count"], 2);
    }

    #[tokio::test]
    async fn test_duplicate_add_is_idempotent() {
        let (server, _) = create_test_server();
        let body = json!({ "productId": "p1", "userId": "u1" });

        let first: Like = server.post("/api/likes").json(&body).await.json();
        let second_response = server.post("/api/likes").json(&body).await;
        assert_eq!(second_response.status_code(), StatusCode::CREATED);
        let second: Like = second_response.json();

        // Same row both times, and the count never double-counts.
        assert_eq!(first.id, second.id);
        let response = server.get("/api/likes/count/p1").await;
        assert_eq!(response.json::<serde_json::Value>()["count"], 1);
    }

    #[tokio::test]
    async fn test_empty_identifiers_are_rejected() {
        let (server, _) = create_test_server();

        let response = server
            .post("/api/likes")
            .json(&json!({ "productId": "", "userId": "u1" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = server
            .post("/api/favorites")
            .json(&json!({ "productId": "p1", "userId": "   " }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_exactly_one_notification_per_logical_mutation() {
        let (server, notifier) = create_test_server();
        let mut rx = notifier.subscribe_product("p1");
        let body = json!({ "productId": "p1", "userId": "u1" });

        // Creating the like publishes one Added event.
        server.post("/api/likes").json(&body).await;
        let event = rx.try_recv().unwrap();
        assert_eq!(event.fact, FactKind::Like);
        assert_eq!(event.change, ChangeKind::Added);

        // A duplicate add changes nothing and announces nothing.
        server.post("/api/likes").json(&body).await;
        assert!(rx.try_recv().is_err());

        // The delete publishes one Removed event.
        server.delete("/api/likes").json(&body).await;
        let event = rx.try_recv().unwrap();
        assert_eq!(event.change, ChangeKind::Removed);

        // Deleting the absent fact announces nothing.
        server.delete("/api/likes").json(&body).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_favorite_mutations_notify_their_product_only() {
        let (server, notifier) = create_test_server();
        let mut p1 = notifier.subscribe_product("p1");
        let mut p2 = notifier.subscribe_product("p2");

        server
            .post("/api/favorites")
            .json(&json!({ "productId": "p1", "userId": "u1" }))
            .await;

        let event = p1.try_recv().unwrap();
        assert_eq!(event.fact, FactKind::Favorite);
        assert!(p2.try_recv().is_err());
    }
}
