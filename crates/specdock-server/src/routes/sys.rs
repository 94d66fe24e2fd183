//! System routes: `GET /health` and `GET /specs`.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use chrono::SecondsFormat;
use specdock_core::SpecListing;

use crate::error::AppError;
use crate::state::AppState;

/// Build the system router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/specs", get(list_specs))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness plus a storage round-trip.
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    state.registry.health().await?;
    Ok(Json(HealthResponse { status: "ok" }))
}

#[derive(Serialize)]
struct SpecListEntry {
    spec_id: String,
    created_at: String,
    updated_at: String,
    docs_url: String,
    openapi_url: String,
}

impl From<SpecListing> for SpecListEntry {
    fn from(listing: SpecListing) -> Self {
        Self {
            docs_url: listing.spec_id.docs_path(),
            openapi_url: listing.spec_id.openapi_path(),
            created_at: listing.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            updated_at: listing.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            spec_id: listing.spec_id.into_inner(),
        }
    }
}

/// Every stored spec, ordered by id.
async fn list_specs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SpecListEntry>>, AppError> {
    let specs: Vec<SpecListEntry> = state
        .registry
        .list()
        .await?
        .into_iter()
        .map(SpecListEntry::from)
        .collect();
    Ok(Json(specs))
}
