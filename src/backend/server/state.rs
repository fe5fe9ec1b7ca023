/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct is the central state container for the engagement
 * service, holding:
 * - The engagement store (Postgres-backed or in-memory)
 * - The change notifier with its per-product broadcast channels
 *
 * # Thread Safety
 *
 * Both fields are designed for concurrent access: the store is an
 * `Arc<dyn EngagementStore>` whose implementations synchronize internally,
 * and the notifier shares its channel map behind a lock.
 *
 * # State Extraction
 *
 * The `FromRef` implementations allow Axum handlers to extract the piece of
 * state they need without taking the whole `AppState`.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::engagement::store::EngagementStore;
use crate::backend::realtime::ChangeNotifier;

/// Application state for the engagement service
#[derive(Clone)]
pub struct AppState {
    /// Authoritative store of favorite and like facts
    pub store: Arc<dyn EngagementStore>,

    /// Per-product change fan-out
    pub notifier: ChangeNotifier,
}

impl AppState {
    pub fn new(store: Arc<dyn EngagementStore>, notifier: ChangeNotifier) -> Self {
        Self { store, notifier }
    }
}

impl FromRef<AppState> for Arc<dyn EngagementStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for ChangeNotifier {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.notifier.clone()
    }
}
