//! Engagement HTTP Handlers
//!
//! This module contains the HTTP handlers for the favorites and likes
//! endpoints. Every mutating handler publishes exactly one change event per
//! logical mutation: an add that found an existing row, or a remove of an
//! absent row, changes nothing and therefore announces nothing.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::backend::engagement::store::EngagementStore;
use crate::backend::error::BackendError;
use crate::backend::realtime::ChangeNotifier;
use crate::shared::{
    ChangeKind, EngagementEvent, EngagementRequest, FactKind, Favorite, FavoriteCheckResponse,
    Like, LikeCheckResponse, LikeCountResponse,
};

/// Get all favorites for an actor (GET /api/favorites/{user_id})
pub async fn list_favorites(
    State(store): State<Arc<dyn EngagementStore>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Favorite>>, BackendError> {
    let favorites = store.favorites_for_user(&user_id).await?;
    Ok(Json(favorites))
}

/// Add a favorite (POST /api/favorites)
///
/// Returns 201 with the fact for the pair. A duplicate add is a success
/// and returns the existing row without publishing a change event.
pub async fn add_favorite(
    State(store): State<Arc<dyn EngagementStore>>,
    State(notifier): State<ChangeNotifier>,
    Json(request): Json<EngagementRequest>,
) -> Result<(StatusCode, Json<Favorite>), BackendError> {
    request.validate()?;

    let outcome = store
        .add_favorite(&request.product_id, &request.user_id)
        .await?;

    if outcome.newly_created {
        notifier.publish(EngagementEvent::new(
            request.product_id.as_str(),
            FactKind::Favorite,
            ChangeKind::Added,
        ));
    }

    Ok((StatusCode::CREATED, Json(outcome.fact)))
}

/// Remove a favorite (DELETE /api/favorites)
///
/// 204 when a row was deleted, 404 when there was none. The 404 is the
/// routine idempotent-unset answer, not a failure.
pub async fn remove_favorite(
    State(store): State<Arc<dyn EngagementStore>>,
    State(notifier): State<ChangeNotifier>,
    Json(request): Json<EngagementRequest>,
) -> Result<StatusCode, BackendError> {
    request.validate()?;

    let removed = store
        .remove_favorite(&request.product_id, &request.user_id)
        .await?;

    if !removed {
        return Err(BackendError::not_found("favorite"));
    }

    notifier.publish(EngagementEvent::new(
        request.product_id.as_str(),
        FactKind::Favorite,
        ChangeKind::Removed,
    ));

    Ok(StatusCode::NO_CONTENT)
}

/// Check favorite status (GET /api/favorites/check/{product_id}/{user_id})
pub async fn check_favorite(
    State(store): State<Arc<dyn EngagementStore>>,
    Path((product_id, user_id)): Path<(String, String)>,
) -> Result<Json<FavoriteCheckResponse>, BackendError> {
    let is_favorite = store.is_favorite(&product_id, &user_id).await?;
    Ok(Json(FavoriteCheckResponse { is_favorite }))
}

/// Get the like count for a product (GET /api/likes/count/{product_id})
pub async fn like_count(
    State(store): State<Arc<dyn EngagementStore>>,
    Path(product_id): Path<String>,
) -> Result<Json<LikeCountResponse>, BackendError> {
    let count = store.like_count(&product_id).await?;
    Ok(Json(LikeCountResponse { count }))
}

/// Check like status (GET /api/likes/check/{product_id}/{user_id})
pub async fn check_like(
    State(store): State<Arc<dyn EngagementStore>>,
    Path((product_id, user_id)): Path<(String, String)>,
) -> Result<Json<LikeCheckResponse>, BackendError> {
    let is_liked = store.is_liked(&product_id, &user_id).await?;
    Ok(Json(LikeCheckResponse { is_liked }))
}

/// Add a like (POST /api/likes)
pub async fn add_like(
    State(store): State<Arc<dyn EngagementStore>>,
    State(notifier): State<ChangeNotifier>,
    Json(request): Json<EngagementRequest>,
) -> Result<(StatusCode, Json<Like>), BackendError> {
    request.validate()?;

    let outcome = store.add_like(&request.product_id, &request.user_id).await?;

    if outcome.newly_created {
        notifier.publish(EngagementEvent::new(
            request.product_id.as_str(),
            FactKind::Like,
            ChangeKind::Added,
        ));
    }

    Ok((StatusCode::CREATED, Json(outcome.fact)))
}

/// Remove a like (DELETE /api/likes)
pub async fn remove_like(
    State(store): State<Arc<dyn EngagementStore>>,
    State(notifier): State<ChangeNotifier>,
    Json(request): Json<EngagementRequest>,
) -> Result<StatusCode, BackendError> {
    request.validate()?;

    let removed = store.remove_like(&request.product_id, &request.user_id).await?;

    if !removed {
        return Err(BackendError::not_found("like"));
    }

    notifier.publish(EngagementEvent::new(
        request.product_id.as_str(),
        FactKind::Like,
        ChangeKind::Removed,
    ));

    Ok(StatusCode::NO_CONTENT)
}
