//! Shallow validator.
//!
//! A document is a plausible OpenAPI spec when it is a mapping containing
//! every key in [`REQUIRED_KEYS`]. The values under those keys are not
//! inspected, nor is anything else in the document: deep schema validation
//! is out of scope for a passthrough store.

use serde_json::Value;

use crate::error::DocumentError;

/// Top-level keys every stored document must carry.
pub const REQUIRED_KEYS: [&str; 2] = ["openapi", "info"];

/// Return whether `value` has the minimal shape of an OpenAPI document.
#[must_use]
pub fn is_plausible_spec(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|map| REQUIRED_KEYS.iter().all(|key| map.contains_key(*key)))
}

/// Like [`is_plausible_spec`], but explains the rejection.
///
/// # Errors
///
/// Returns [`DocumentError::ShallowValidation`] naming what is missing.
pub fn check_plausible_spec(value: &Value) -> Result<(), DocumentError> {
    let Some(map) = value.as_object() else {
        return Err(DocumentError::ShallowValidation {
            reason: format!("expected a mapping at the top level, found {}", kind(value)),
        });
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !map.contains_key(*key))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DocumentError::ShallowValidation {
            reason: format!("missing required key(s) {}", quoted(&missing)),
        })
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

fn quoted(keys: &[&str]) -> String {
    keys.iter()
        .map(|k| format!("'{k}'"))
        .collect::<Vec<_>>()
        .join(" and ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_minimal_document() {
        let doc = json!({"openapi": "3.0.0", "info": {"title": "x", "version": "1"}});
        assert!(is_plausible_spec(&doc));
        assert!(check_plausible_spec(&doc).is_ok());
    }

    #[test]
    fn ignores_value_types_of_required_keys() {
        let doc = json!({"openapi": 3, "info": "just a string"});
        assert!(is_plausible_spec(&doc));
    }

    #[test]
    fn rejects_missing_openapi() {
        let doc = json!({"info": {}});
        assert!(!is_plausible_spec(&doc));
        let err = check_plausible_spec(&doc).unwrap_err().to_string();
        assert!(err.contains("'openapi'"), "{err}");
        assert!(!err.contains("'info'"), "{err}");
    }

    #[test]
    fn rejects_missing_info() {
        let doc = json!({"openapi": "3.0.0", "paths": {}});
        assert!(!is_plausible_spec(&doc));
        assert!(check_plausible_spec(&doc).unwrap_err().to_string().contains("'info'"));
    }

    #[test]
    fn names_both_missing_keys() {
        let err = check_plausible_spec(&json!({"swagger": "2.0"})).unwrap_err().to_string();
        assert!(err.contains("'openapi' and 'info'"), "{err}");
    }

    #[test]
    fn rejects_non_mappings() {
        for doc in [json!(null), json!([1, 2]), json!("openapi"), json!(3), json!(true)] {
            assert!(!is_plausible_spec(&doc));
            assert!(matches!(
                check_plausible_spec(&doc),
                Err(DocumentError::ShallowValidation { .. })
            ));
        }
    }

    #[test]
    fn nested_keys_do_not_count() {
        let doc = json!({"spec": {"openapi": "3.0.0", "info": {}}});
        assert!(!is_plausible_spec(&doc));
    }
}
