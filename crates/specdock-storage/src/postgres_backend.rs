//! PostgreSQL storage backend.
//!
//! Stores documents in the same `openapi_specs` table layout as the `SQLite`
//! backend, for deployments that run several server instances against one
//! database.
//!
//! Feature-gated behind `postgres-backend`. Uses `sqlx` with the Tokio
//! runtime for fully async operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::timestamp;
use crate::{SpecBackend, SpecSummary, StorageError, StoredSpec};

/// A storage backend backed by PostgreSQL.
///
/// Thread-safe via `PgPool` (connection pool). All operations are fully async.
///
/// # Examples
///
/// ```no_run
/// # use specdock_storage::PostgresBackend;
/// # #[tokio::main]
/// # async fn main() {
/// let backend = PostgresBackend::connect("postgres://localhost/specdock").await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresBackend {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresBackend")
            .field("pool", &"[PgPool]")
            .finish_non_exhaustive()
    }
}

impl PostgresBackend {
    /// Connect to PostgreSQL and run the initial migration.
    ///
    /// Creates the `openapi_specs` table if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the connection or migration fails.
    /// The connection string is never echoed into the error.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Open {
                location: "[postgres]".to_owned(),
                reason: e.to_string(),
            })?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS openapi_specs (\
                spec_id    TEXT PRIMARY KEY, \
                document   TEXT NOT NULL, \
                created_at TEXT NOT NULL, \
                updated_at TEXT NOT NULL\
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Open {
            location: "[postgres]".to_owned(),
            reason: format!("migration failed: {e}"),
        })?;

        Ok(Self { pool })
    }

    /// Return a reference to the underlying connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl SpecBackend for PostgresBackend {
    async fn upsert(
        &self,
        spec_id: &str,
        document: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO openapi_specs (spec_id, document, created_at, updated_at) \
             VALUES ($1, $2, $3, $3) \
             ON CONFLICT (spec_id) DO UPDATE SET \
                document   = EXCLUDED.document, \
                updated_at = GREATEST(openapi_specs.updated_at, EXCLUDED.updated_at)",
        )
        .bind(spec_id)
        .bind(document)
        .bind(timestamp::encode(now))
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Write {
            spec_id: spec_id.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(())
    }

    async fn fetch(&self, spec_id: &str) -> Result<Option<StoredSpec>, StorageError> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            "SELECT document, created_at, updated_at FROM openapi_specs WHERE spec_id = $1",
        )
        .bind(spec_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Read {
            spec_id: spec_id.to_owned(),
            reason: e.to_string(),
        })?;

        row.map(|(document, created_at, updated_at)| {
            Ok(StoredSpec {
                spec_id: spec_id.to_owned(),
                document,
                created_at: timestamp::decode(spec_id, &created_at)?,
                updated_at: timestamp::decode(spec_id, &updated_at)?,
            })
        })
        .transpose()
    }

    async fn list(&self) -> Result<Vec<SpecSummary>, StorageError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "SELECT spec_id, created_at, updated_at FROM openapi_specs ORDER BY spec_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::List {
            reason: e.to_string(),
        })?;

        rows.into_iter()
            .map(|(spec_id, created_at, updated_at)| {
                Ok(SpecSummary {
                    created_at: timestamp::decode(&spec_id, &created_at)?,
                    updated_at: timestamp::decode(&spec_id, &updated_at)?,
                    spec_id,
                })
            })
            .collect()
    }

    async fn exists(&self, spec_id: &str) -> Result<bool, StorageError> {
        let row: Option<(bool,)> =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM openapi_specs WHERE spec_id = $1)")
                .bind(spec_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StorageError::Read {
                    spec_id: spec_id.to_owned(),
                    reason: e.to_string(),
                })?;

        Ok(row.is_some_and(|(e,)| e))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable {
                reason: e.to_string(),
            })?;
        Ok(())
    }
}
