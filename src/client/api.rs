//! # Engagement API Client
//!
//! The HTTP client for the engagement REST surface, plus the trait the
//! reconciliation layer is written against so tests can substitute an
//! in-process implementation.
//!
//! Status mapping follows the server contract: a `DELETE` answered with
//! 404 is the routine idempotent-unset outcome and comes back as
//! `Ok(false)`, not an error.

use async_trait::async_trait;
use thiserror::Error;

use crate::shared::{
    EngagementRequest, Favorite, FavoriteCheckResponse, Like, LikeCheckResponse,
    LikeCountResponse,
};

/// Engagement API failure.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// The engagement operations the client layer needs.
///
/// Mirrors the REST surface one-to-one; implementations must keep the
/// idempotent-unset contract (`remove_*` returns `false` for an absent
/// fact).
#[async_trait]
pub trait EngagementApi: Send + Sync {
    async fn favorites_for(&self, user_id: &str) -> Result<Vec<Favorite>, ApiError>;

    async fn add_favorite(&self, product_id: &str, user_id: &str) -> Result<Favorite, ApiError>;

    /// `false` when there was no favorite to remove.
    async fn remove_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError>;

    async fn is_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError>;

    async fn like_count(&self, product_id: &str) -> Result<i64, ApiError>;

    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError>;

    async fn add_like(&self, product_id: &str, user_id: &str) -> Result<Like, ApiError>;

    /// `false` when there was no like to remove.
    async fn remove_like(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError>;
}

/// `EngagementApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEngagementApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpEngagementApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turn a non-success response into an `ApiError::Status`.
async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable body>".to_string());
    ApiError::Status { status, message }
}

#[async_trait]
impl EngagementApi for HttpEngagementApi {
    async fn favorites_for(&self, user_id: &str) -> Result<Vec<Favorite>, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/favorites/{}", user_id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn add_favorite(&self, product_id: &str, user_id: &str) -> Result<Favorite, ApiError> {
        let response = self
            .client
            .post(self.url("/api/favorites"))
            .json(&EngagementRequest::new(product_id, user_id))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn remove_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .delete(self.url("/api/favorites"))
            .json(&EngagementRequest::new(product_id, user_id))
            .send()
            .await?;
        match response.status().as_u16() {
            404 => Ok(false),
            status if (200..300).contains(&status) => Ok(true),
            _ => Err(status_error(response).await),
        }
    }

    async fn is_favorite(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/favorites/check/{}/{}", product_id, user_id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: FavoriteCheckResponse = response.json().await?;
        Ok(body.is_favorite)
    }

    async fn like_count(&self, product_id: &str) -> Result<i64, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/likes/count/{}", product_id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: LikeCountResponse = response.json().await?;
        Ok(body.count)
    }

    async fn is_liked(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/likes/check/{}/{}", product_id, user_id)))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body: LikeCheckResponse = response.json().await?;
        Ok(body.is_liked)
    }

    async fn add_like(&self, product_id: &str, user_id: &str) -> Result<Like, ApiError> {
        let response = self
            .client
            .post(self.url("/api/likes"))
            .json(&EngagementRequest::new(product_id, user_id))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        Ok(response.json().await?)
    }

    async fn remove_like(&self, product_id: &str, user_id: &str) -> Result<bool, ApiError> {
        let response = self
            .client
            .delete(self.url("/api/likes"))
            .json(&EngagementRequest::new(product_id, user_id))
            .send()
            .await?;
        match response.status().as_u16() {
            404 => Ok(false),
            status if (200..300).contains(&status) => Ok(true),
            _ => Err(status_error(response).await),
        }
    }
}
