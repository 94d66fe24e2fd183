//! Storage error types.
//!
//! Every error variant carries enough context to diagnose the problem
//! without a debugger.

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open the storage backend at the given location.
    #[error("failed to open storage at '{location}': {reason}")]
    Open { location: String, reason: String },

    /// Failed to read a document from storage.
    #[error("failed to read spec '{spec_id}': {reason}")]
    Read { spec_id: String, reason: String },

    /// Failed to write a document to storage.
    #[error("failed to write spec '{spec_id}': {reason}")]
    Write { spec_id: String, reason: String },

    /// Failed to list stored documents.
    #[error("failed to list specs: {reason}")]
    List { reason: String },

    /// A stored row could not be decoded.
    #[error("stored spec '{spec_id}' is corrupt: {reason}")]
    Corrupt { spec_id: String, reason: String },

    /// The backend did not answer a health check.
    #[error("storage backend unreachable: {reason}")]
    Unavailable { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_names_no_spec() {
        let err = StorageError::Unavailable {
            reason: "pool timed out".into(),
        };
        assert_eq!(err.to_string(), "storage backend unreachable: pool timed out");
    }
}
