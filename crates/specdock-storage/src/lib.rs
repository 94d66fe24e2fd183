//! Storage backend abstraction for `SpecDock`.
//!
//! This crate defines the [`SpecBackend`] trait: a keyed store of serialized
//! specification documents with creation and update timestamps. It knows
//! nothing about OpenAPI, parsing, or validation: documents arrive here as
//! already-validated JSON text.
//!
//! Three implementations are provided:
//!
//! - [`SqliteBackend`] — production default, a single-file `SQLite` database (feature `sqlite-backend`)
//! - [`PostgresBackend`] — shared database for multi-instance deployments (feature `postgres-backend`)
//! - [`MemoryBackend`] — in-memory, for testing and throwaway dev servers

mod error;
mod memory;
#[cfg(feature = "postgres-backend")]
mod postgres_backend;
#[cfg(feature = "sqlite-backend")]
mod sqlite_backend;
#[cfg(any(feature = "sqlite-backend", feature = "postgres-backend"))]
mod timestamp;

use chrono::{DateTime, Utc};

pub use error::StorageError;
pub use memory::MemoryBackend;
#[cfg(feature = "postgres-backend")]
pub use postgres_backend::PostgresBackend;
#[cfg(feature = "sqlite-backend")]
pub use sqlite_backend::SqliteBackend;

/// A document row as held by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSpec {
    /// Unique key of the document.
    pub spec_id: String,
    /// The document serialized as JSON text.
    pub document: String,
    /// When the key was first written. Never changes afterwards.
    pub created_at: DateTime<Utc>,
    /// When the document was last replaced.
    pub updated_at: DateTime<Utc>,
}

/// Key and timestamps of a stored document, without its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSummary {
    pub spec_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&StoredSpec> for SpecSummary {
    fn from(spec: &StoredSpec) -> Self {
        Self {
            spec_id: spec.spec_id.clone(),
            created_at: spec.created_at,
            updated_at: spec.updated_at,
        }
    }
}

/// A pluggable document storage backend.
///
/// Keys are the caller-validated spec identifiers. Values are JSON text that
/// the backend stores verbatim.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`)
/// and must make [`upsert`](SpecBackend::upsert) atomic per key: concurrent
/// writers to the same key leave exactly one writer's document behind.
#[async_trait::async_trait]
pub trait SpecBackend: Send + Sync + 'static {
    /// Insert a document, or replace the document of an existing key.
    ///
    /// On insert both timestamps are set to `now`. On replace `created_at` is
    /// preserved and `updated_at` becomes the later of its stored value and
    /// `now`, so it never moves backwards.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn upsert(
        &self,
        spec_id: &str,
        document: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Retrieve a document by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails, or
    /// [`StorageError::Corrupt`] if a stored timestamp cannot be decoded.
    async fn fetch(&self, spec_id: &str) -> Result<Option<StoredSpec>, StorageError>;

    /// List every stored key with its timestamps, ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the underlying backend fails.
    async fn list(&self) -> Result<Vec<SpecSummary>, StorageError>;

    /// Check whether a key exists in storage.
    ///
    /// The default implementation calls [`fetch`](SpecBackend::fetch) and
    /// checks for `Some`. Backends may override this with a cheaper query.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn exists(&self, spec_id: &str) -> Result<bool, StorageError> {
        Ok(self.fetch(spec_id).await?.is_some())
    }

    /// Verify the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] if a trivial round-trip fails.
    async fn ping(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
