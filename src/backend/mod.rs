//! Backend Module
//!
//! This module contains all server-side code for the SwipeShop engagement
//! service. It provides an Axum HTTP server exposing the favorites/likes
//! REST surface, real-time change fan-out over SSE, and persistence against
//! PostgreSQL with an in-memory fallback.
//!
//! # Overview
//!
//! The backend module includes:
//! - Axum HTTP server setup and configuration
//! - The Engagement Store trait with Postgres and in-memory implementations
//! - REST handlers for the favorites and likes endpoints
//! - The Change Notifier (per-product broadcast channels) and SSE handlers
//! - Backend-specific error types
//!
//! This module is only compiled when the `ssr` feature is enabled. All code
//! in this module runs on the server and handles HTTP requests.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`engagement`** - Store trait, Postgres/in-memory stores, handlers
//! - **`realtime`** - Change notifier and SSE subscription endpoints
//! - **`error`** - Backend-specific error types

pub mod engagement;
pub mod error;
pub mod realtime;
pub mod routes;
pub mod server;
