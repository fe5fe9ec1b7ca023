//! Backend Error Types
//!
//! This module defines the error type used by the HTTP handlers. Every
//! variant maps to an HTTP status code; the conversion to a response lives
//! in `conversion.rs`.
//!
//! # Error Categories
//!
//! - `NotFound` - remove called for an absent fact. Routine, not
//!   exceptional: the idempotent-unset path reports 404 and nothing else.
//! - `Validation` - malformed input (missing `productId`/`userId`); the
//!   caller must correct the request before retrying.
//! - `Store` - the underlying datastore errored. Surfaced once, never
//!   retried here; retry policy belongs to the caller.

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::engagement::store::StoreError;
use crate::shared::SharedError;

/// Backend-specific error types
///
/// This enum represents all possible errors that can occur in the backend
/// handlers. Each variant can be converted to an HTTP response.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The requested fact does not exist
    #[error("{what} not found")]
    NotFound {
        /// What was looked up ("favorite", "like")
        what: &'static str,
    },

    /// Invalid request input
    #[error(transparent)]
    Validation(#[from] SharedError),

    /// Persistence-layer failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BackendError {
    /// Create a not-found error
    pub fn not_found(what: &'static str) -> Self {
        Self::NotFound { what }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `NotFound` - 404 Not Found
    /// - `Validation` - 400 Bad Request
    /// - `Store` - 500 Internal Server Error
    /// - `Serialization` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Validation(err) => match err {
                SharedError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                SharedError::SerializationError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Store and serialization details stay in the logs; the wire gets a
    /// generic failure message.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound { what } => format!("{} not found", what),
            Self::Validation(err) => err.to_string(),
            Self::Store(_) | Self::Serialization(_) => "Internal server error".to_string(),
        }
    }
}
