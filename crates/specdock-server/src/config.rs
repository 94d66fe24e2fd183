//! Server configuration for `SpecDock`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Nothing here is global: the loaded [`ServerConfig`] is passed explicitly
//! to whatever needs it at startup.

use std::net::SocketAddr;

/// Default location of the `SQLite` database file.
pub const DEFAULT_DB_PATH: &str = "openapi_specs.db";

/// Default request body limit for uploads (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Default cap on uploads processed at once.
pub const DEFAULT_MAX_CONCURRENT_UPLOADS: usize = 16;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Storage backend type.
    pub storage_backend: StorageBackendType,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Largest request body accepted by the upload routes.
    pub max_upload_bytes: usize,
    /// Upload requests allowed in flight at once; later ones wait.
    pub max_concurrent_uploads: usize,
}

/// Supported storage backend types.
#[derive(Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, data lost on restart).
    Memory,
    /// `SQLite` database file.
    Sqlite { path: String },
    /// PostgreSQL database.
    Postgres { url: String },
}

impl StorageBackendType {
    /// A description safe to log: never includes connection credentials.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Memory => "memory".to_owned(),
            Self::Sqlite { path } => format!("sqlite:{path}"),
            Self::Postgres { .. } => "postgres:[redacted]".to_owned(),
        }
    }
}

impl std::fmt::Debug for StorageBackendType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on, on all interfaces
    /// - `SPECDOCK_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8000`)
    /// - `SPECDOCK_STORAGE` — `sqlite`, `memory`, or `postgres` (default: `sqlite`)
    /// - `OPENAPI_DB_PATH` — `SQLite` database file (default: `openapi_specs.db`)
    /// - `DATABASE_URL` — PostgreSQL connection string (used when `SPECDOCK_STORAGE=postgres`)
    /// - `SPECDOCK_LOG_LEVEL` — log filter (default: `info`)
    /// - `SPECDOCK_MAX_UPLOAD_BYTES` — upload body limit in bytes (default: 10 MiB)
    /// - `SPECDOCK_MAX_CONCURRENT_UPLOADS` — uploads handled at once (default: 16)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Unparseable values fall back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: SPECDOCK_BIND_ADDR > PORT > default 127.0.0.1:8000
        let default_addr = SocketAddr::from(([127, 0, 0, 1], 8000));
        let bind_addr = if let Some(addr) = lookup("SPECDOCK_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = lookup("PORT") {
            port.parse::<u16>()
                .map_or(default_addr, |p| SocketAddr::from(([0, 0, 0, 0], p)))
        } else {
            default_addr
        };

        let storage_backend = match lookup("SPECDOCK_STORAGE")
            .unwrap_or_else(|| "sqlite".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackendType::Memory,
            "postgres" | "postgresql" => StorageBackendType::Postgres {
                url: lookup("DATABASE_URL")
                    .unwrap_or_else(|| "postgres://localhost/specdock".to_owned()),
            },
            _ => StorageBackendType::Sqlite {
                path: lookup("OPENAPI_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_owned()),
            },
        };

        let log_level = lookup("SPECDOCK_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let max_upload_bytes = lookup("SPECDOCK_MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let max_concurrent_uploads = lookup("SPECDOCK_MAX_CONCURRENT_UPLOADS")
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_UPLOADS);

        Self {
            bind_addr,
            storage_backend,
            log_level,
            max_upload_bytes,
            max_concurrent_uploads,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> ServerConfig {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8000)));
        assert_eq!(
            config.storage_backend,
            StorageBackendType::Sqlite {
                path: DEFAULT_DB_PATH.to_owned()
            }
        );
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert_eq!(config.max_concurrent_uploads, DEFAULT_MAX_CONCURRENT_UPLOADS);
    }

    #[test]
    fn zero_concurrency_is_ignored() {
        let config = load(&[("SPECDOCK_MAX_CONCURRENT_UPLOADS", "0")]);
        assert_eq!(config.max_concurrent_uploads, DEFAULT_MAX_CONCURRENT_UPLOADS);
        let config = load(&[("SPECDOCK_MAX_CONCURRENT_UPLOADS", "4")]);
        assert_eq!(config.max_concurrent_uploads, 4);
    }

    #[test]
    fn db_path_is_overridable() {
        let config = load(&[("OPENAPI_DB_PATH", "/var/lib/specdock/specs.db")]);
        assert_eq!(
            config.storage_backend,
            StorageBackendType::Sqlite {
                path: "/var/lib/specdock/specs.db".to_owned()
            }
        );
    }

    #[test]
    fn port_binds_all_interfaces() {
        let config = load(&[("PORT", "9000")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 9000)));
    }

    #[test]
    fn bind_addr_wins_over_port() {
        let config = load(&[("PORT", "9000"), ("SPECDOCK_BIND_ADDR", "127.0.0.1:7000")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 7000)));
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let config = load(&[("PORT", "not-a-port"), ("SPECDOCK_MAX_UPLOAD_BYTES", "lots")]);
        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 8000)));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn selects_memory_and_postgres() {
        assert_eq!(
            load(&[("SPECDOCK_STORAGE", "MEMORY")]).storage_backend,
            StorageBackendType::Memory
        );
        let pg = load(&[
            ("SPECDOCK_STORAGE", "postgres"),
            ("DATABASE_URL", "postgres://user:secret@db/specs"),
        ]);
        assert_eq!(
            pg.storage_backend,
            StorageBackendType::Postgres {
                url: "postgres://user:secret@db/specs".to_owned()
            }
        );
        assert!(!format!("{:?}", pg.storage_backend).contains("secret"));
    }
}
