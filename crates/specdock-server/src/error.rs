//! HTTP error types for `SpecDock` server.
//!
//! Maps registry errors from `specdock-core` into HTTP responses. On the API
//! routes every error becomes a JSON body with a machine-readable `error`
//! field and a human-readable `message`; the upload form renders the same
//! status and message as HTML instead.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use specdock_core::{DocumentError, RegistryError};

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// The spec identifier failed the character or length check.
    InvalidIdentifier(String),
    /// The uploaded file's type is not JSON or YAML.
    UnsupportedFormat(String),
    /// The uploaded bytes did not decode.
    Parse(String),
    /// The decoded document is not a plausible OpenAPI spec.
    InvalidSpec(String),
    /// Requested spec not found.
    NotFound(String),
    /// The request itself was malformed (missing form fields, bad multipart).
    BadRequest(String),
    /// The request body exceeded the configured limit.
    PayloadTooLarge(String),
    /// Internal server error.
    Internal(String),
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidIdentifier(_)
            | Self::UnsupportedFormat(_)
            | Self::Parse(_)
            | Self::InvalidSpec(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidIdentifier(_) => "invalid_identifier",
            Self::UnsupportedFormat(_) => "unsupported_format",
            Self::Parse(_) => "parse_error",
            Self::InvalidSpec(_) => "invalid_spec",
            Self::NotFound(_) => "not_found",
            Self::BadRequest(_) => "bad_request",
            Self::PayloadTooLarge(_) => "payload_too_large",
            Self::Internal(_) => "internal_error",
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidIdentifier(msg)
            | Self::UnsupportedFormat(msg)
            | Self::Parse(msg)
            | Self::InvalidSpec(msg)
            | Self::NotFound(msg)
            | Self::BadRequest(msg)
            | Self::PayloadTooLarge(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'static str,
    message: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code(),
            message: self.message(),
        };
        (self.status(), axum::Json(body)).into_response()
    }
}

impl From<RegistryError> for AppError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::InvalidIdentifier(_) => Self::InvalidIdentifier(err.to_string()),
            RegistryError::Document(ref inner) => match inner {
                DocumentError::UnsupportedFormat { .. } => Self::UnsupportedFormat(err.to_string()),
                DocumentError::Parse { .. } => Self::Parse(err.to_string()),
                DocumentError::ShallowValidation { .. } => Self::InvalidSpec(err.to_string()),
            },
            RegistryError::NotFound { .. } => Self::NotFound(err.to_string()),
            RegistryError::Storage(ref inner) => {
                tracing::error!(error = %inner, "storage backend failure");
                Self::Internal("database error while handling the spec".to_owned())
            }
        }
    }
}

impl From<DocumentError> for AppError {
    fn from(err: DocumentError) -> Self {
        RegistryError::from(err).into()
    }
}

/// Map a body extractor's rejection, keeping 413 for oversized bodies.
fn body_rejection(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(text)
    } else {
        AppError::BadRequest(text)
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        body_rejection(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::PayloadTooLarge(err.body_text())
        } else {
            Self::BadRequest(format!("malformed upload: {}", err.body_text()))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use specdock_core::{SpecId, SpecIdError};
    use specdock_storage::StorageError;

    #[test]
    fn taxonomy_maps_to_statuses() {
        let cases: Vec<(RegistryError, StatusCode, &str)> = vec![
            (
                RegistryError::InvalidIdentifier(SpecIdError::Empty),
                StatusCode::BAD_REQUEST,
                "invalid_identifier",
            ),
            (
                DocumentError::UnsupportedFormat { hint: "a.txt".to_owned() }.into(),
                StatusCode::BAD_REQUEST,
                "unsupported_format",
            ),
            (
                DocumentError::Parse { format: "JSON", reason: "eof".to_owned() }.into(),
                StatusCode::BAD_REQUEST,
                "parse_error",
            ),
            (
                DocumentError::ShallowValidation { reason: "missing".to_owned() }.into(),
                StatusCode::BAD_REQUEST,
                "invalid_spec",
            ),
            (
                RegistryError::NotFound { spec_id: "x".to_owned() },
                StatusCode::NOT_FOUND,
                "not_found",
            ),
            (
                StorageError::Write { spec_id: "x".to_owned(), reason: "disk full".to_owned() }
                    .into(),
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
            ),
        ];

        for (err, status, code) in cases {
            let app: AppError = err.into();
            assert_eq!(app.status(), status);
            assert_eq!(app.code(), code);
        }
    }

    #[test]
    fn storage_details_are_not_exposed() {
        let app: AppError = RegistryError::from(StorageError::Open {
            location: "/secret/path.db".to_owned(),
            reason: "denied".to_owned(),
        })
        .into();
        assert!(!app.message().contains("/secret/path.db"));
    }

    #[test]
    fn identifier_message_explains_rule() {
        let err = RegistryError::from(SpecId::parse("bad id!").unwrap_err());
        let app = AppError::from(err);
        assert!(app.message().contains("letters, numbers, underscores, or hyphens"));
    }
}
