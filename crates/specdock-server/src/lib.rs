//! `SpecDock` HTTP server.
//!
//! Wires the spec registry and a storage backend into an Axum router: the
//! upload form at `/`, the raw upload API at `/upload/{spec_id}`, the
//! Swagger UI viewer at `/docs/{spec_id}`, and the stored JSON at
//! `/openapi/{spec_id}`.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
