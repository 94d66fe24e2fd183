//! Swagger UI viewer: `GET /docs/{spec_id}`.
//!
//! The page itself holds no spec data; Swagger UI fetches the document from
//! `/openapi/{spec_id}` in the browser.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, State};
use axum::response::Html;
use axum::routing::get;

use specdock_core::SpecId;

use super::stored_spec_id;
use crate::error::AppError;
use crate::state::AppState;

/// Build the viewer router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/docs/{spec_id}", get(viewer_page))
}

async fn viewer_page(
    State(state): State<Arc<AppState>>,
    Path(raw_id): Path<String>,
) -> Result<Html<String>, AppError> {
    let spec_id = stored_spec_id(raw_id)?;
    if !state.registry.contains(&spec_id).await? {
        return Err(AppError::NotFound(format!("spec '{spec_id}' not found")));
    }
    Ok(Html(render_viewer(&spec_id)))
}

fn render_viewer(spec_id: &SpecId) -> String {
    VIEWER_PAGE
        .replace("{{SPEC_ID}}", spec_id.as_str())
        .replace("{{OPENAPI_URL}}", &spec_id.openapi_path())
}

const VIEWER_PAGE: &str = r##"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <title>{{SPEC_ID}} - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css" />
    <style>
      html { box-sizing: border-box; overflow-y: scroll; }
      *, *:before, *:after { box-sizing: inherit; }
      body { margin: 0; background: #fafafa; }
    </style>
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.onload = function() {
        window.ui = SwaggerUIBundle({
          url: "{{OPENAPI_URL}}",
          dom_id: "#swagger-ui",
          presets: [SwaggerUIBundle.presets.apis, SwaggerUIBundle.SwaggerUIStandalonePreset],
          layout: "BaseLayout",
          deepLinking: true
        });
      };
    </script>
  </body>
</html>
"##;
