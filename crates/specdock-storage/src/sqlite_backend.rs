//! `SQLite` storage backend, the production default.
//!
//! Stores every document in a single `openapi_specs` table inside one
//! database file. Uses `sqlx` with the Tokio runtime, so no `spawn_blocking`
//! is needed.
//!
//! Connections come from a pool and are checked out per statement. A
//! checked-out connection returns to the pool when its guard drops, on the
//! success path and on every error path alike.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

use crate::timestamp;
use crate::{SpecBackend, SpecSummary, StorageError, StoredSpec};

/// How long a writer waits on a locked database before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A storage backend backed by a `SQLite` database file.
///
/// Thread-safe via `SqlitePool`. Writes use `SQLite`'s native
/// `INSERT … ON CONFLICT DO UPDATE`, a single atomic statement, so concurrent
/// upserts of the same key never interleave.
///
/// # Examples
///
/// ```no_run
/// # use specdock_storage::SqliteBackend;
/// # #[tokio::main]
/// # async fn main() {
/// let backend = SqliteBackend::open("openapi_specs.db").await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
    path: PathBuf,
}

impl std::fmt::Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteBackend {
    /// Open (or create) the database file at `path` and run the migration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the file cannot be opened or the
    /// `openapi_specs` table cannot be created.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let open_err = |reason: String| StorageError::Open {
            location: path.display().to_string(),
            reason,
        };

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| open_err(e.to_string()))?;

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
        .map_err(|e| open_err(format!("migration failed: {e}")))?;

        tracing::debug!(path = %path.display(), "sqlite spec store ready");

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    /// Return the filesystem path of this database.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Close every pooled connection.
    ///
    /// The last connection to close checkpoints the WAL into the main file.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait::async_trait]
impl SpecBackend for SqliteBackend {
    async fn upsert(
        &self,
        spec_id: &str,
        document: &str,
        now: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO openapi_specs (spec_id, document, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?3) \
             ON CONFLICT (spec_id) DO UPDATE SET \
                document   = excluded.document, \
                updated_at = MAX(openapi_specs.updated_at, excluded.updated_at)",
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
            "SELECT document, created_at, updated_at FROM openapi_specs WHERE spec_id = ?1",
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
        let (found,): (i64,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM openapi_specs WHERE spec_id = ?1)")
                .bind(spec_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StorageError::Read {
                    spec_id: spec_id.to_owned(),
                    reason: e.to_string(),
                })?;

        Ok(found != 0)
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
