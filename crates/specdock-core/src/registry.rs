//! Spec registry: keyed upsert and lookup of specification documents.
//!
//! The registry is the only writer of the storage backend. It enforces the
//! shallow validity invariant on every [`put`](SpecRegistry::put), encodes
//! documents as JSON text, and stamps writes with the current time. The
//! backend supplies per-key atomicity.
//!
//! Callers hand documents in by reference and receive owned copies out; no
//! stored state is ever shared mutably.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use specdock_storage::{SpecBackend, SpecSummary, StorageError, StoredSpec};

use crate::document::{SpecFormat, parse_document};
use crate::error::RegistryError;
use crate::spec_id::SpecId;
use crate::validate::check_plausible_spec;

/// A stored document with its key and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecRecord {
    pub spec_id: SpecId,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A stored key with its timestamps, without the document body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecListing {
    pub spec_id: SpecId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Keyed store of specification documents over a pluggable backend.
pub struct SpecRegistry {
    backend: Arc<dyn SpecBackend>,
}

impl std::fmt::Debug for SpecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecRegistry").finish_non_exhaustive()
    }
}

impl SpecRegistry {
    /// Create a registry over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn SpecBackend>) -> Self {
        Self { backend }
    }

    /// Decode, validate, and store an uploaded document.
    ///
    /// Nothing is written unless every step before the write succeeds.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Document`] if the bytes do not decode under
    ///   `format` or the result fails shallow validation.
    /// - [`RegistryError::Storage`] if the write fails.
    pub async fn ingest(
        &self,
        spec_id: &SpecId,
        bytes: &[u8],
        format: SpecFormat,
    ) -> Result<(), RegistryError> {
        let document = parse_document(bytes, format)?;
        self.put(spec_id, &document).await
    }

    /// Insert or replace the document stored under `spec_id`.
    ///
    /// A first write sets `created_at` and `updated_at` to now. A later write
    /// replaces the document and advances `updated_at`, leaving `created_at`
    /// untouched.
    ///
    /// # Errors
    ///
    /// - [`RegistryError::Document`] if `document` fails shallow validation.
    /// - [`RegistryError::Storage`] if encoding or the backend write fails.
    pub async fn put(&self, spec_id: &SpecId, document: &Value) -> Result<(), RegistryError> {
        check_plausible_spec(document)?;

        let encoded = serde_json::to_string(document).map_err(|e| StorageError::Write {
            spec_id: spec_id.to_string(),
            reason: format!("serialization failed: {e}"),
        })?;

        self.backend
            .upsert(spec_id.as_str(), &encoded, Utc::now())
            .await?;

        tracing::info!(spec_id = %spec_id, bytes = encoded.len(), "spec stored");
        Ok(())
    }

    /// Return the current document for `spec_id`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the backend read fails or the
    /// stored row cannot be decoded. A missing key is not an error.
    pub async fn get(&self, spec_id: &SpecId) -> Result<Option<Value>, RegistryError> {
        Ok(self.get_record(spec_id).await?.map(|record| record.document))
    }

    /// Return the current document for `spec_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if no document is stored under
    /// `spec_id`, or [`RegistryError::Storage`] if the read fails.
    pub async fn require(&self, spec_id: &SpecId) -> Result<Value, RegistryError> {
        self.get(spec_id)
            .await?
            .ok_or_else(|| RegistryError::NotFound {
                spec_id: spec_id.to_string(),
            })
    }

    /// Whether a document is stored under `spec_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the backend read fails.
    pub async fn contains(&self, spec_id: &SpecId) -> Result<bool, RegistryError> {
        Ok(self.backend.exists(spec_id.as_str()).await?)
    }

    /// Return the full record (document and timestamps) for `spec_id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the backend read fails or the
    /// stored row cannot be decoded.
    pub async fn get_record(&self, spec_id: &SpecId) -> Result<Option<SpecRecord>, RegistryError> {
        let Some(stored) = self.backend.fetch(spec_id.as_str()).await? else {
            return Ok(None);
        };
        Ok(Some(decode_record(spec_id.clone(), stored)?))
    }

    /// List every stored spec with its timestamps, ordered by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the backend fails or holds a key
    /// that is not a valid identifier.
    pub async fn list(&self) -> Result<Vec<SpecListing>, RegistryError> {
        let summaries = self.backend.list().await?;
        let listings = summaries
            .into_iter()
            .map(decode_listing)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    /// Check that the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Storage`] if the backend round-trip fails.
    pub async fn health(&self) -> Result<(), RegistryError> {
        Ok(self.backend.ping().await?)
    }
}

fn decode_listing(summary: SpecSummary) -> Result<SpecListing, StorageError> {
    let spec_id = SpecId::parse(summary.spec_id.as_str()).map_err(|e| StorageError::Corrupt {
        spec_id: summary.spec_id.clone(),
        reason: format!("stored key is not a valid identifier: {e}"),
    })?;
    Ok(SpecListing {
        spec_id,
        created_at: summary.created_at,
        updated_at: summary.updated_at,
    })
}

fn decode_record(spec_id: SpecId, stored: StoredSpec) -> Result<SpecRecord, StorageError> {
    let document = serde_json::from_str(&stored.document).map_err(|e| StorageError::Corrupt {
        spec_id: stored.spec_id.clone(),
        reason: format!("document is not valid JSON: {e}"),
    })?;

    Ok(SpecRecord {
        spec_id,
        document,
        created_at: stored.created_at,
        updated_at: stored.updated_at,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{DocumentError, SpecIdError};
    use serde_json::json;
    use specdock_storage::MemoryBackend;

    fn registry() -> (MemoryBackend, SpecRegistry) {
        let backend = MemoryBackend::new();
        let registry = SpecRegistry::new(Arc::new(backend.clone()));
        (backend, registry)
    }

    fn id(raw: &str) -> SpecId {
        SpecId::parse(raw).unwrap()
    }

    fn petstore() -> Value {
        json!({"openapi": "3.0.0", "info": {"title": "x", "version": "1"}})
    }

    #[tokio::test]
    async fn put_then_get_roundtrip() {
        let (_, registry) = registry();
        registry.put(&id("petstore"), &petstore()).await.unwrap();
        assert_eq!(registry.get(&id("petstore")).await.unwrap(), Some(petstore()));
    }

    #[tokio::test]
    async fn get_unknown_is_none() {
        let (backend, registry) = registry();
        assert_eq!(registry.get(&id("unknown")).await.unwrap(), None);
        assert!(!backend.exists("unknown").await.unwrap());
    }

    #[tokio::test]
    async fn require_unknown_is_not_found() {
        let (_, registry) = registry();
        let err = registry.require(&id("unknown")).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { ref spec_id } if spec_id == "unknown"));
    }

    #[tokio::test]
    async fn repeated_put_keeps_latest_and_created_at() {
        let (_, registry) = registry();
        let spec_id = id("petstore");

        registry.put(&spec_id, &petstore()).await.unwrap();
        let first = registry.get_record(&spec_id).await.unwrap().unwrap();

        let v2 = json!({"openapi": "3.1.0", "info": {"title": "y", "version": "2"}});
        registry.put(&spec_id, &v2).await.unwrap();
        let second = registry.get_record(&spec_id).await.unwrap().unwrap();

        let v3 = json!({"openapi": "3.1.0", "info": {"title": "z", "version": "3"}});
        registry.put(&spec_id, &v3).await.unwrap();
        let third = registry.get_record(&spec_id).await.unwrap().unwrap();

        assert_eq!(third.document, v3);
        assert_eq!(first.created_at, second.created_at);
        assert_eq!(second.created_at, third.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert!(third.updated_at >= second.updated_at);
    }

    #[tokio::test]
    async fn put_rejects_implausible_document_without_storing() {
        let (backend, registry) = registry();
        let err = registry
            .put(&id("bad"), &json!({"openapi": "3.0.0"}))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Document(DocumentError::ShallowValidation { .. })
        ));
        assert!(backend.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ingest_json_and_yaml_store_the_same_document() {
        let (_, registry) = registry();
        registry
            .ingest(
                &id("from-json"),
                br#"{"openapi": "3.0.0", "info": {"title": "x", "version": "1"}}"#,
                SpecFormat::Json,
            )
            .await
            .unwrap();
        registry
            .ingest(
                &id("from-yaml"),
                b"openapi: \"3.0.0\"\ninfo:\n  title: x\n  version: \"1\"\n",
                SpecFormat::Yaml,
            )
            .await
            .unwrap();

        assert_eq!(
            registry.get(&id("from-json")).await.unwrap(),
            registry.get(&id("from-yaml")).await.unwrap()
        );
    }

    #[tokio::test]
    async fn ingest_malformed_bytes_stores_nothing() {
        let (backend, registry) = registry();
        let err = registry
            .ingest(&id("broken"), b"{not json", SpecFormat::Json)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::Document(DocumentError::Parse { .. })));
        assert!(!backend.exists("broken").await.unwrap());
    }

    #[tokio::test]
    async fn failed_reupload_leaves_previous_document() {
        let (_, registry) = registry();
        let spec_id = id("petstore");
        registry.put(&spec_id, &petstore()).await.unwrap();

        let _ = registry.ingest(&spec_id, b"[1, 2, 3]", SpecFormat::Json).await;
        assert_eq!(registry.get(&spec_id).await.unwrap(), Some(petstore()));
    }

    #[tokio::test]
    async fn corrupt_stored_document_is_storage_error() {
        let (backend, registry) = registry();
        backend.upsert("mangled", "{not json", Utc::now()).await.unwrap();

        let err = registry.get(&id("mangled")).await.unwrap_err();
        assert!(matches!(err, RegistryError::Storage(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn list_reports_stored_ids() {
        let (_, registry) = registry();
        registry.put(&id("b"), &petstore()).await.unwrap();
        registry.put(&id("a"), &petstore()).await.unwrap();

        let ids: Vec<_> = registry
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.spec_id.into_inner())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn list_rejects_key_that_is_not_an_identifier() {
        let (backend, registry) = registry();
        backend.upsert("bad id", "{}", Utc::now()).await.unwrap();

        let err = registry.list().await.unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Storage(StorageError::Corrupt { ref spec_id, .. }) if spec_id == "bad id"
        ));
    }

    #[test]
    fn invalid_identifier_converts_into_registry_error() {
        let err: RegistryError = SpecId::parse("bad id!").unwrap_err().into();
        assert!(matches!(
            err,
            RegistryError::InvalidIdentifier(SpecIdError::InvalidCharacter { .. })
        ));
    }

    #[tokio::test]
    async fn contains_tracks_presence() {
        let (_, registry) = registry();
        assert!(!registry.contains(&id("petstore")).await.unwrap());
        registry.put(&id("petstore"), &petstore()).await.unwrap();
        assert!(registry.contains(&id("petstore")).await.unwrap());
    }

    #[tokio::test]
    async fn health_succeeds_on_memory_backend() {
        let (_, registry) = registry();
        registry.health().await.unwrap();
    }
}
