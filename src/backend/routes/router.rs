/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines all
 * route configurations into a single Axum router.
 *
 * # Route Order
 *
 * The static `/api/favorites/check/...` and `/api/likes/count/...` prefixes
 * are registered alongside the parameterized `/api/favorites/{user_id}`
 * route; Axum's matcher prefers the more specific static segments, so check
 * requests never fall into the list-favorites handler.
 */

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::engagement::handlers;
use crate::backend::realtime::subscription;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Route Details
///
/// ## Favorites
///
/// - `GET /api/favorites/{user_id}` - All favorites for an actor
/// - `POST /api/favorites` - Add a favorite
/// - `DELETE /api/favorites` - Remove a favorite
/// - `GET /api/favorites/check/{product_id}/{user_id}` - Existence check
///
/// ## Likes
///
/// - `GET /api/likes/count/{product_id}` - Like count for a product
/// - `GET /api/likes/check/{product_id}/{user_id}` - Existence check
/// - `POST /api/likes` - Add a like
/// - `DELETE /api/likes` - Remove a like
///
/// ## Real-time
///
/// - `GET /api/engagement/subscribe/{product_id}` - SSE stream per product
/// - `GET /api/catalog/subscribe` - SSE stream for the whole catalog
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new()
        .route(
            "/api/favorites",
            axum::routing::post(handlers::add_favorite).delete(handlers::remove_favorite),
        )
        .route("/api/favorites/{user_id}", get(handlers::list_favorites))
        .route(
            "/api/favorites/check/{product_id}/{user_id}",
            get(handlers::check_favorite),
        )
        .route(
            "/api/likes",
            axum::routing::post(handlers::add_like).delete(handlers::remove_like),
        )
        .route("/api/likes/count/{product_id}", get(handlers::like_count))
        .route(
            "/api/likes/check/{product_id}/{user_id}",
            get(handlers::check_like),
        )
        .route(
            "/api/engagement/subscribe/{product_id}",
            get(subscription::subscribe_product),
        )
        .route("/api/catalog/subscribe", get(subscription::subscribe_catalog));

    // Fallback handler for 404
    let router = router.fallback(|| async { "404 Not Found" });

    router.layer(TraceLayer::new_for_http()).with_state(app_state)
}
