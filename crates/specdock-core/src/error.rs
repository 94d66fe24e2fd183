//! Error types for `specdock-core`.
//!
//! Each error variant carries enough context to tell the uploader what to
//! fix. None of them include document contents.

use specdock_storage::StorageError;

/// Errors from spec identifier validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecIdError {
    /// The identifier is empty.
    #[error("spec ID must not be empty")]
    Empty,

    /// The identifier exceeds the length bound.
    #[error("spec ID is {len} characters long, the maximum is {max}")]
    TooLong { len: usize, max: usize },

    /// The identifier contains a character outside `[A-Za-z0-9_-]`.
    #[error(
        "invalid character {ch:?} at position {position} in spec ID; use only letters, numbers, underscores, or hyphens"
    )]
    InvalidCharacter { ch: char, position: usize },
}

/// Errors from decoding and shallow validation of an uploaded document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// The declared file name or content hint names no supported format.
    #[error("unsupported file type '{hint}'; the file must be a .json, .yaml, or .yml file")]
    UnsupportedFormat { hint: String },

    /// The bytes do not decode under the selected format.
    #[error("uploaded file is not valid {format}: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },

    /// The decoded value lacks the minimal shape of an OpenAPI document.
    #[error("not a valid OpenAPI spec: {reason}")]
    ShallowValidation { reason: String },
}

/// Errors from the spec registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The spec identifier failed validation.
    #[error("invalid spec ID: {0}")]
    InvalidIdentifier(#[from] SpecIdError),

    /// The uploaded document was rejected before reaching storage.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// No document is stored under the requested identifier.
    #[error("spec '{spec_id}' not found")]
    NotFound { spec_id: String },

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
