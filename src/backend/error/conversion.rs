//! Error-to-response conversion
//!
//! Converts [`BackendError`] into an Axum response. All store-layer errors
//! are logged here and reduced to a generic body so no internal detail
//! crosses the API boundary.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("[Engagement] Request failed: {:?}", self);
        } else {
            tracing::debug!("[Engagement] Request rejected: {}", self);
        }

        let body = Json(json!({ "message": self.public_message() }));
        (status, body).into_response()
    }
}
