//! Spec identifiers.
//!
//! A [`SpecId`] is the only key under which documents are stored and served.
//! It is restricted to ASCII letters, digits, `_` and `-`, at most
//! [`MAX_SPEC_ID_LEN`] characters, so it can be embedded in URLs and HTML
//! without escaping.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SpecIdError;

/// Maximum length of a spec identifier, in characters.
pub const MAX_SPEC_ID_LEN: usize = 50;

/// A validated spec identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SpecId(String);

impl SpecId {
    /// Validate `raw` and wrap it.
    ///
    /// # Errors
    ///
    /// Returns [`SpecIdError`] if `raw` is empty, longer than
    /// [`MAX_SPEC_ID_LEN`], or contains a character outside `[A-Za-z0-9_-]`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SpecIdError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(SpecIdError::Empty);
        }
        if let Some((position, ch)) = raw
            .chars()
            .enumerate()
            .find(|(_, c)| !is_id_char(*c))
        {
            return Err(SpecIdError::InvalidCharacter { ch, position });
        }
        // All characters are ASCII at this point, so bytes == chars.
        if raw.len() > MAX_SPEC_ID_LEN {
            return Err(SpecIdError::TooLong {
                len: raw.len(),
                max: MAX_SPEC_ID_LEN,
            });
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Path of the documentation viewer page for this spec.
    #[must_use]
    pub fn docs_path(&self) -> String {
        format!("/docs/{}", self.0)
    }

    /// Path of the raw JSON document for this spec.
    #[must_use]
    pub fn openapi_path(&self) -> String {
        format!("/openapi/{}", self.0)
    }
}

fn is_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

impl fmt::Display for SpecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SpecId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for SpecId {
    type Err = SpecIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SpecId {
    type Error = SpecIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<SpecId> for String {
    fn from(id: SpecId) -> Self {
        id.0
    }
}
