//! Client Library
//!
//! The storefront-side half of the engagement subsystem. Everything here is
//! asynchronous with respect to the rendering thread: a UI calls into the
//! reconciliation layer, gets an immediate (possibly optimistic) answer,
//! and convergence with server truth happens through change-feed signals
//! and the fallback refresh timer.
//!
//! # Key Components
//!
//! - `storage` - Durable local key-value store (the localStorage analog)
//! - `identity` - Actor identity resolution, guest or authenticated
//! - `api` - HTTP client for the engagement REST surface
//! - `feed` - Streaming change-feed subscriptions (SSE)
//! - `migration` - One-time move of legacy local favorites to the server
//! - `engagement` - Cached projections, optimistic toggles, reconciliation
//! - `refresh` - Fallback refresh scheduling

pub mod api;
pub mod engagement;
pub mod feed;
pub mod identity;
pub mod migration;
pub mod refresh;
pub mod storage;

pub use api::{ApiError, EngagementApi, HttpEngagementApi};
pub use engagement::{ClientError, EngagementClient, EngagementState, Projection};
pub use feed::{ChangeFeed, ChangeSubscription};
pub use identity::{ActorId, AuthSession, ClientIdentity, IdentityProvider, NoSession};
pub use migration::{FavoritesMigration, MigrationReport};
pub use refresh::RefreshScheduler;
pub use storage::{LocalStore, StorageError};
