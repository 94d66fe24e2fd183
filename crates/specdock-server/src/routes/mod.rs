//! HTTP routes for `SpecDock`.
//!
//! Each submodule exposes a `router()` over the shared [`AppState`];
//! [`build_router`] merges them and applies the middleware stack.

pub mod openapi;
pub mod sys;
pub mod ui;
pub mod upload;
pub mod viewer;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::{HeaderValue, Method};
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use specdock_core::SpecId;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::state::AppState;

/// Build the Axum router with all routes and middleware.
///
/// The body limit applies to every route, which in practice means the two
/// upload routes. Those two POST handlers also draw from one shared pool of
/// `max_concurrent_uploads` permits, since each in-flight upload may buffer
/// a full body.
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    let upload_limit = GlobalConcurrencyLimitLayer::new(config.max_concurrent_uploads);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .merge(ui::router(upload_limit.clone()))
        .merge(upload::router(upload_limit))
        .merge(viewer::router())
        .merge(openapi::router())
        .merge(sys::router())
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// Parse a path segment naming a spec that should already exist.
///
/// A malformed id can never have been stored, so it reads as not found
/// rather than as a bad request.
pub(crate) fn stored_spec_id(raw: String) -> Result<SpecId, AppError> {
    SpecId::parse(raw).map_err(|err| AppError::NotFound(format!("spec not found: {err}")))
}
