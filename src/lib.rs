//! SwipeShop Engagement - Main Library
//!
//! SwipeShop is a consumer-to-business storefront; this crate implements its
//! engagement subsystem: per-user favorite and like facts, real-time
//! invalidation so every viewer of a product converges on the same counts,
//! and the client-side reconciliation that keeps a swipeable feed responsive.
//!
//! # Overview
//!
//! This library provides:
//! - The authoritative Engagement Store (Postgres-backed, with an in-memory
//!   fallback) and its HTTP surface
//! - A publish/subscribe Change Notifier with SSE fan-out per product
//! - A client library with durable guest identity, optimistic toggles,
//!   one-time favorites migration, and signal/timer-driven reconciliation
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between client and server
//!   - Engagement facts, wire request/response bodies
//!   - Change events for the notifier channels
//!   - Error types
//!
//! - **`backend`** - Server-side code (only compiled with the `ssr` feature)
//!   - Axum HTTP server with the engagement REST endpoints
//!   - Store trait with Postgres and in-memory implementations
//!   - Change notifier and SSE subscription handlers
//!
//! - **`client`** - Client-side library
//!   - Identity resolution (authenticated or durable guest)
//!   - HTTP API client and streaming change feed
//!   - Favorites migration and the reconciliation layer
//!
//! # Feature Flags
//!
//! - `ssr` - Enables the backend module and the `swipeshop-server` binary.
//!   The client and shared modules compile without it.

pub mod shared;

#[cfg(feature = "ssr")]
pub mod backend;

pub mod client;
