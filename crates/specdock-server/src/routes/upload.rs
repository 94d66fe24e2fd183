//! Raw upload API: `POST /upload/{spec_id}`.
//!
//! The request body is the spec itself. A `Content-Type` mentioning `yaml`
//! selects the YAML decoder; anything else (including no header) is decoded
//! as strict JSON.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::http::header::CONTENT_TYPE;
use axum::routing::post;
use axum::{Json, Router};
use serde::Serialize;
use tower::limit::GlobalConcurrencyLimitLayer;

use specdock_core::{RegistryError, SpecFormat, SpecId};

use crate::error::AppError;
use crate::state::AppState;

/// Build the raw upload router.
pub fn router(upload_limit: GlobalConcurrencyLimitLayer) -> Router<Arc<AppState>> {
    Router::new().route("/upload/{spec_id}", post(upload_spec).layer(upload_limit))
}

#[derive(Serialize)]
struct UploadResponse {
    message: String,
    docs_url: String,
    openapi_url: String,
}

async fn upload_spec(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let body = body?;
    let spec_id = SpecId::parse(raw_id).map_err(RegistryError::from)?;

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let format = SpecFormat::from_content_type(content_type);

    state.registry.ingest(&spec_id, &body, format).await?;

    tracing::info!(spec_id = %spec_id, format = format.name(), "spec uploaded via api");

    Ok(Json(UploadResponse {
        message: format!("Spec '{spec_id}' uploaded successfully."),
        docs_url: spec_id.docs_path(),
        openapi_url: spec_id.openapi_path(),
    }))
}
