//! Shared application state for `SpecDock` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`.

use std::sync::Arc;

use specdock_core::SpecRegistry;
use specdock_storage::SpecBackend;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// The spec registry; sole owner of the storage backend.
    pub registry: Arc<SpecRegistry>,
}

impl AppState {
    /// Build state around a storage backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SpecBackend>) -> Self {
        Self {
            registry: Arc::new(SpecRegistry::new(backend)),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}
