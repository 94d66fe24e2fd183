//! Text encoding of timestamps for SQL backends.
//!
//! Timestamps are stored as fixed-width RFC 3339 UTC strings with
//! microsecond precision (`2024-05-01T12:00:00.000000Z`). Fixed width makes
//! lexicographic order equal to chronological order, which the upsert relies
//! on to keep `updated_at` monotonic with a plain `MAX`.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::StorageError;

/// Encode a timestamp for storage.
pub(crate) fn encode(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Decode a stored timestamp belonging to `spec_id`.
pub(crate) fn decode(spec_id: &str, raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| StorageError::Corrupt {
            spec_id: spec_id.to_owned(),
            reason: format!("invalid timestamp '{raw}': {e}"),
        })
}
