//! Upload form routes.
//!
//! `GET /` serves the upload form. `POST /` accepts the same form as
//! `multipart/form-data` (`spec_id` text field plus a `file` part) and
//! re-renders the page with either a success message and links to the
//! stored spec, or the error that stopped the upload.

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use tower::limit::GlobalConcurrencyLimitLayer;

use specdock_core::{SpecFormat, SpecId};

use crate::error::AppError;
use crate::state::AppState;

/// Build the upload form router.
///
/// `upload_limit` wraps only the form submission; the blank form is never
/// held back by in-flight uploads.
pub fn router(upload_limit: GlobalConcurrencyLimitLayer) -> Router<Arc<AppState>> {
    Router::new().route(
        "/",
        get(upload_page).merge(post(upload_form).layer(upload_limit)),
    )
}

/// What the page reports after a submission.
enum Outcome {
    Stored(SpecId),
    Rejected(String),
}

async fn upload_page() -> Html<String> {
    Html(render_upload_page(None))
}

async fn upload_form(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match store_upload(&state, multipart).await {
        Ok(spec_id) => {
            tracing::info!(spec_id = %spec_id, "spec uploaded via form");
            Html(render_upload_page(Some(&Outcome::Stored(spec_id)))).into_response()
        }
        Err(err) => {
            tracing::warn!(error = err.message(), code = err.code(), "form upload rejected");
            let page = render_upload_page(Some(&Outcome::Rejected(err.message().to_owned())));
            (err.status(), Html(page)).into_response()
        }
    }
}

/// Pull the form fields out of the request and push them through the
/// registry. Checks run in a fixed order: identifier, file type, decode,
/// shallow validation, store.
async fn store_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<SpecId, AppError> {
    let mut multipart = multipart?;

    let mut raw_id: Option<String> = None;
    let mut file: Option<(String, Bytes)> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("spec_id") => raw_id = Some(field.text().await?),
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                file = Some((file_name, field.bytes().await?));
            }
            _ => {}
        }
    }

    let raw_id = raw_id.ok_or_else(|| AppError::BadRequest("missing 'spec_id' field".to_owned()))?;
    let (file_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("missing 'file' field".to_owned()))?;

    let spec_id = SpecId::parse(raw_id).map_err(specdock_core::RegistryError::from)?;
    let format = SpecFormat::from_filename(&file_name)?;
    state.registry.ingest(&spec_id, &bytes, format).await?;

    Ok(spec_id)
}

fn render_upload_page(outcome: Option<&Outcome>) -> String {
    let (message_block, urls_block) = match outcome {
        None => (String::new(), String::new()),
        Some(Outcome::Rejected(message)) => (
            format!(
                r#"<div class="message error">{}</div>"#,
                escape_html(message)
            ),
            String::new(),
        ),
        Some(Outcome::Stored(spec_id)) => {
            // Spec ids are restricted to [A-Za-z0-9_-]; nothing to escape.
            let message = format!(
                r#"<div class="message success">Spec '<b>{spec_id}</b>' uploaded successfully.</div>"#
            );
            let mut urls = String::from(r#"<div class="urls"><b>Access your documentation:</b>"#);
            for url in [spec_id.docs_path(), spec_id.openapi_path()] {
                urls.push_str(&format!(r#"<a href="{url}" target="_blank">{url}</a>"#));
            }
            urls.push_str("</div>");
            (message, urls)
        }
    };

    UPLOAD_PAGE
        .replace("{{MESSAGE_BLOCK}}", &message_block)
        .replace("{{URLS_BLOCK}}", &urls_block)
}

/// Escape text for inclusion in HTML element content.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const UPLOAD_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="UTF-8">
    <title>Upload OpenAPI Spec</title>
    <style>
      body { font-family: Arial, sans-serif; background: #f8f9fa; margin: 0; padding: 0; }
      .container { max-width: 500px; margin: 40px auto; background: #fff; border-radius: 8px; box-shadow: 0 2px 8px #0001; padding: 32px; }
      h1 { font-size: 1.6em; margin-bottom: 0.5em; }
      form { display: flex; flex-direction: column; gap: 1em; }
      label { font-weight: bold; }
      input[type="text"], input[type="file"] { padding: 0.5em; border: 1px solid #ccc; border-radius: 4px; }
      button { background: #007bff; color: #fff; border: none; padding: 0.7em 1.2em; border-radius: 4px; font-size: 1em; cursor: pointer; }
      button:hover { background: #0056b3; }
      .message { margin-top: 1em; padding: 1em; border-radius: 4px; }
      .error { background: #ffe5e5; color: #b30000; border: 1px solid #ffb3b3; }
      .success { background: #e6ffe6; color: #006600; border: 1px solid #99ff99; }
      .urls { margin-top: 1em; }
      .urls a { display: block; color: #007bff; text-decoration: none; margin-bottom: 0.3em; }
      .urls a:hover { text-decoration: underline; }
      .instructions { background: #f1f1f1; padding: 1em; border-radius: 4px; margin-bottom: 1em; }
    </style>
  </head>
  <body>
    <div class="container">
      <h1>Upload OpenAPI Specification</h1>
      <div class="instructions">
        <ul>
          <li>Select an OpenAPI JSON or YAML file from your computer.</li>
          <li>Enter a unique <b>spec ID</b> (letters, numbers, underscores, hyphens; at most 50 characters).</li>
          <li>After upload you get links to the Swagger UI and the raw JSON for your spec.</li>
        </ul>
      </div>
      {{MESSAGE_BLOCK}}
      <form method="post" enctype="multipart/form-data">
        <label for="spec_id">Spec ID:</label>
        <input type="text" id="spec_id" name="spec_id" required pattern="^[A-Za-z0-9_\-]+$" maxlength="50" />

        <label for="file">OpenAPI JSON or YAML file:</label>
        <input type="file" id="file" name="file" accept=".json,.yaml,.yml,application/json,application/x-yaml,text/yaml" required />

        <button type="submit">Upload</button>
      </form>
      {{URLS_BLOCK}}
    </div>
  </body>
</html>
"#;
