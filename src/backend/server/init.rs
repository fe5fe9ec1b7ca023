/**
 * Server Initialization
 *
 * This module handles the initialization and setup of the Axum HTTP
 * server: store selection, notifier creation, and route configuration.
 *
 * # Initialization Process
 *
 * 1. Create the change notifier and its broadcast channels
 * 2. Load the database; fall back to the in-memory store without one
 * 3. Create the router with the assembled application state
 * 4. Start the periodic cleanup task for idle notifier channels
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::engagement::store::EngagementStore;
use crate::backend::engagement::{MemEngagementStore, PgEngagementStore};
use crate::backend::realtime::ChangeNotifier;
use crate::backend::routes::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Error Handling
///
/// The function is designed to be resilient: a missing or unreachable
/// database selects the in-memory store, and migration failures are logged
/// without preventing startup.
pub async fn create_app() -> Router<()> {
    tracing::info!("Initializing SwipeShop engagement server");

    let notifier = ChangeNotifier::new();

    let store: Arc<dyn EngagementStore> = match load_database().await {
        Some(pool) => {
            tracing::info!("Using PostgreSQL engagement store");
            Arc::new(PgEngagementStore::new(pool))
        }
        None => {
            tracing::warn!("Using in-memory engagement store; facts will not survive restart");
            Arc::new(MemEngagementStore::new())
        }
    };

    let app_state = AppState::new(store, notifier);

    let app = create_router(app_state.clone());

    // Prune product channels whose subscribers have all disconnected.
    let cleanup_notifier = app_state.notifier.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(std::time::Duration::from_secs(300));
        loop {
            interval.tick().await;
            cleanup_notifier.cleanup_inactive_channels();
            tracing::debug!("Cleaned up inactive notifier channels");
        }
    });

    tracing::info!("Router configured with periodic cleanup task");

    app
}
