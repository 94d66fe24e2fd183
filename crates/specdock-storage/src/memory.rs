//! In-memory storage backend for testing.
//!
//! This backend stores all documents in a `BTreeMap` behind a `RwLock`. It is
//! not persistent; all data is lost when the process exits. Use this for
//! unit tests, integration tests, and throwaway dev servers.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::{SpecBackend, SpecSummary, StorageError, StoredSpec};

/// An in-memory storage backend backed by a `BTreeMap`.
///
/// Thread-safe and async-compatible. Upserts take the write lock for their
/// whole read-modify-write, so same-key writers are serialized. Data is
/// sorted by key, which gives [`list`](SpecBackend::list) its ordering for free.
///
/// # Examples
///
/// ```
/// # use specdock_storage::{MemoryBackend, SpecBackend};
/// # #[tokio::main]
/// # async fn main() {
/// let backend = MemoryBackend::new();
/// backend.upsert("petstore", "{}", chrono::Utc::now()).await.unwrap();
/// let spec = backend.fetch("petstore").await.unwrap();
/// assert_eq!(spec.map(|s| s.document), Some("{}".to_owned()));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MemoryBackend {
    data: Arc<RwLock<BTreeMap<String, StoredSpec>>>,
}

impl MemoryBackend {
    /// Create a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl SpecBackend for MemoryBackend {
    async fn upsert(
        &self,
        spec_id: &str,
        document: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.entry(spec_id.to_owned())
            .and_modify(|existing| {
                existing.document = document.to_owned();
                existing.updated_at = existing.updated_at.max(now);
            })
            .or_insert_with(|| StoredSpec {
                spec_id: spec_id.to_owned(),
                document: document.to_owned(),
                created_at: now,
                updated_at: now,
            });
        Ok(())
    }

    async fn fetch(&self, spec_id: &str) -> Result<Option<StoredSpec>, StorageError> {
        let data = self.data.read().await;
        Ok(data.get(spec_id).cloned())
    }

    async fn list(&self) -> Result<Vec<SpecSummary>, StorageError> {
        let data = self.data.read().await;
        Ok(data.values().map(SpecSummary::from).collect())
    }

    async fn exists(&self, spec_id: &str) -> Result<bool, StorageError> {
        let data = self.data.read().await;
        Ok(data.contains_key(spec_id))
    }
}
