//! Raw document route: `GET /openapi/{spec_id}`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

use super::stored_spec_id;
use crate::error::AppError;
use crate::state::AppState;

/// Build the raw document router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/openapi/{spec_id}", get(raw_document))
}

/// Serve the stored document exactly as it was decoded at upload time.
async fn raw_document(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let spec_id = stored_spec_id(raw_id)?;
    let document = state.registry.require(&spec_id).await?;
    Ok(Json(document))
}
