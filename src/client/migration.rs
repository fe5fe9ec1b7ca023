//! # Legacy Favorites Migration
//!
//! Before the server-side store existed, favorites lived only in the
//! client's durable local storage. This agent moves that list into the
//! Engagement Store exactly once per installation.
//!
//! The run is sequential and best-effort: an item that fails to migrate is
//! logged and skipped, the remaining items still run, nothing rolls back,
//! and the completion marker is set even after partial failure so the
//! migration never re-runs and never re-attempts failed items. Only
//! favorites migrate; likes were never kept locally.

use std::sync::Arc;

use crate::client::api::EngagementApi;
use crate::client::identity::ActorId;
use crate::client::storage::{LocalStore, StorageError, LEGACY_FAVORITES_KEY, MIGRATION_KEY};

/// What a migration run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    /// Items written to the store
    pub migrated: usize,
    /// Items that failed and were skipped
    pub failed: usize,
    /// True when the completion marker was already set and nothing ran
    pub skipped: bool,
}

impl MigrationReport {
    fn skipped() -> Self {
        Self {
            migrated: 0,
            failed: 0,
            skipped: true,
        }
    }
}

/// One-time mover of legacy local favorites into the Engagement Store.
pub struct FavoritesMigration {
    store: Arc<LocalStore>,
}

impl FavoritesMigration {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }

    /// Run the migration if it has not run before.
    ///
    /// Idempotent: with the marker set, or no legacy list present, this
    /// makes zero store calls.
    pub async fn run_once(
        &self,
        api: &dyn EngagementApi,
        actor: &ActorId,
    ) -> Result<MigrationReport, StorageError> {
        if self.store.contains(MIGRATION_KEY) {
            return Ok(MigrationReport::skipped());
        }

        let Some(product_ids) = self.store.get::<Vec<String>>(LEGACY_FAVORITES_KEY) else {
            self.store.set(MIGRATION_KEY, &true)?;
            return Ok(MigrationReport {
                migrated: 0,
                failed: 0,
                skipped: false,
            });
        };

        let mut migrated = 0;
        let mut failed = 0;
        for product_id in &product_ids {
            match api.add_favorite(product_id, actor.as_str()).await {
                Ok(_) => migrated += 1,
                Err(e) => {
                    tracing::warn!(
                        "Failed to migrate favorite {} for {}: {}",
                        product_id,
                        actor,
                        e
                    );
                    failed += 1;
                }
            }
        }

        // Completion is recorded even after partial failure; failed items
        // are never re-attempted.
        self.store.set(MIGRATION_KEY, &true)?;
        self.store.remove(LEGACY_FAVORITES_KEY)?;

        tracing::info!(
            "Favorites migration complete: {} migrated, {} failed",
            migrated,
            failed
        );

        Ok(MigrationReport {
            migrated,
            failed,
            skipped: false,
        })
    }
}
