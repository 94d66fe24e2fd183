//! Document parser.
//!
//! Decodes an uploaded byte buffer into a [`serde_json::Value`], using either
//! strict JSON or YAML. The format is chosen from a hint (a file name for
//! form uploads, a `Content-Type` for the raw upload API) before any bytes
//! are decoded.
//!
//! YAML goes through `serde_yaml`, which only ever builds plain data: no
//! tags are instantiated and nothing is executed. Because the stored and
//! served representation is JSON, YAML-only constructs are lowered:
//!
//! - aliases are expanded and `<<` merge keys applied,
//! - tags are dropped, keeping the tagged value,
//! - scalar mapping keys are stringified (`200:` becomes `"200"`), which is
//!   what OpenAPI response maps written in YAML rely on.

use serde_json::{Map, Number, Value};
use serde_yaml::Value as YamlValue;

use crate::error::DocumentError;

/// Encoding of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    /// Strict JSON.
    Json,
    /// YAML 1.2, a superset of JSON.
    Yaml,
}

impl SpecFormat {
    /// Pick a format from an uploaded file's name.
    ///
    /// Matching is case-insensitive on the suffix: `.json` is JSON, `.yaml`
    /// and `.yml` are YAML.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::UnsupportedFormat`] for any other name.
    pub fn from_filename(name: &str) -> Result<Self, DocumentError> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".json") {
            Ok(Self::Json)
        } else if lower.ends_with(".yaml") || lower.ends_with(".yml") {
            Ok(Self::Yaml)
        } else {
            Err(DocumentError::UnsupportedFormat {
                hint: name.to_owned(),
            })
        }
    }

    /// Pick a format from a request's `Content-Type`.
    ///
    /// Any content type mentioning `yaml` (`application/yaml`,
    /// `application/x-yaml`, `text/yaml`, ...) selects YAML. Everything else,
    /// including a missing header, selects JSON.
    #[must_use]
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.to_ascii_lowercase().contains("yaml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    /// Display name of the format, as used in parse errors and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Decode `bytes` as a structured document in the given format.
///
/// # Errors
///
/// Returns [`DocumentError::Parse`] if the bytes are malformed, or if a YAML
/// document uses a construct with no JSON equivalent (a non-scalar mapping
/// key, or a non-finite float).
pub fn parse_document(bytes: &[u8], format: SpecFormat) -> Result<Value, DocumentError> {
    let parse_err = |reason: String| DocumentError::Parse {
        format: format.name(),
        reason,
    };

    match format {
        SpecFormat::Json => serde_json::from_slice(bytes).map_err(|e| parse_err(e.to_string())),
        SpecFormat::Yaml => {
            let mut yaml: YamlValue =
                serde_yaml::from_slice(bytes).map_err(|e| parse_err(e.to_string()))?;
            yaml.apply_merge().map_err(|e| parse_err(e.to_string()))?;
            yaml_to_json(yaml).map_err(parse_err)
        }
    }
}

fn yaml_to_json(value: YamlValue) -> Result<Value, String> {
    Ok(match value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(b),
        YamlValue::Number(n) => Value::Number(yaml_number(&n)?),
        YamlValue::String(s) => Value::String(s),
        YamlValue::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<_, _>>()?,
        ),
        YamlValue::Mapping(mapping) => {
            let mut object = Map::with_capacity(mapping.len());
            for (key, val) in mapping {
                object.insert(yaml_key(key)?, yaml_to_json(val)?);
            }
            Value::Object(object)
        }
        YamlValue::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Number, String> {
    if let Some(i) = n.as_i64() {
        Ok(Number::from(i))
    } else if let Some(u) = n.as_u64() {
        Ok(Number::from(u))
    } else {
        n.as_f64()
            .and_then(Number::from_f64)
            .ok_or_else(|| format!("number {n} has no JSON representation"))
    }
}

fn yaml_key(key: YamlValue) -> Result<String, String> {
    match key {
        YamlValue::String(s) => Ok(s),
        YamlValue::Number(n) => Ok(n.to_string()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Null => Ok("null".to_owned()),
        YamlValue::Tagged(tagged) => yaml_key(tagged.value),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => {
            Err("mapping keys must be scalars".to_owned())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filename_selects_format_case_insensitively() {
        assert_eq!(SpecFormat::from_filename("spec.json").unwrap(), SpecFormat::Json);
        assert_eq!(SpecFormat::from_filename("SPEC.JSON").unwrap(), SpecFormat::Json);
        assert_eq!(SpecFormat::from_filename("spec.yaml").unwrap(), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_filename("spec.Yml").unwrap(), SpecFormat::Yaml);
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        for name in ["spec.txt", "spec", "spec.json.bak", "yaml"] {
            assert!(matches!(
                SpecFormat::from_filename(name),
                Err(DocumentError::UnsupportedFormat { .. })
            ));
        }
    }

    #[test]
    fn content_type_selects_format() {
        assert_eq!(SpecFormat::from_content_type(Some("application/x-yaml")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_content_type(Some("text/YAML; charset=utf-8")), SpecFormat::Yaml);
        assert_eq!(SpecFormat::from_content_type(Some("application/json")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_content_type(Some("text/plain")), SpecFormat::Json);
        assert_eq!(SpecFormat::from_content_type(None), SpecFormat::Json);
    }

    #[test]
    fn parses_json() {
        let doc = parse_document(br#"{"openapi": "3.0.0", "info": {"title": "x"}}"#, SpecFormat::Json)
            .unwrap();
        assert_eq!(doc, json!({"openapi": "3.0.0", "info": {"title": "x"}}));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = parse_document(b"{\"openapi\": ", SpecFormat::Json).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { format: "JSON", .. }));
    }

    #[test]
    fn json_decoder_does_not_accept_yaml() {
        let err = parse_document(b"openapi: 3.0.0\n", SpecFormat::Json).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn yaml_matches_equivalent_json() {
        let yaml = b"openapi: \"3.0.0\"\ninfo:\n  title: x\n  version: \"1\"\n";
        let json = br#"{"openapi": "3.0.0", "info": {"title": "x", "version": "1"}}"#;
        assert_eq!(
            parse_document(yaml, SpecFormat::Yaml).unwrap(),
            parse_document(json, SpecFormat::Json).unwrap()
        );
    }

    #[test]
    fn yaml_accepts_json_input() {
        let doc = parse_document(br#"{"openapi": "3.1.0", "info": {}}"#, SpecFormat::Yaml).unwrap();
        assert_eq!(doc, json!({"openapi": "3.1.0", "info": {}}));
    }

    #[test]
    fn yaml_integer_keys_become_strings() {
        let yaml = b"responses:\n  200:\n    description: ok\n  404:\n    description: missing\n";
        let doc = parse_document(yaml, SpecFormat::Yaml).unwrap();
        assert_eq!(
            doc,
            json!({"responses": {"200": {"description": "ok"}, "404": {"description": "missing"}}})
        );
    }

    #[test]
    fn yaml_aliases_and_merge_keys_expand() {
        let yaml = b"base: &base\n  type: string\nfield:\n  <<: *base\n  format: email\n";
        let doc = parse_document(yaml, SpecFormat::Yaml).unwrap();
        assert_eq!(doc["base"], json!({"type": "string"}));
        assert_eq!(doc["field"], json!({"type": "string", "format": "email"}));
    }

    #[test]
    fn yaml_tags_are_dropped() {
        let doc = parse_document(b"value: !custom hello\n", SpecFormat::Yaml).unwrap();
        assert_eq!(doc, json!({"value": "hello"}));
    }

    #[test]
    fn yaml_preserves_key_order() {
        let doc = parse_document(b"zeta: 1\nalpha: 2\nmid: 3\n", SpecFormat::Yaml).unwrap();
        let keys: Vec<_> = doc.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn yaml_non_finite_float_is_parse_error() {
        let err = parse_document(b"x: .inf\n", SpecFormat::Yaml).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { format: "YAML", .. }));
    }

    #[test]
    fn yaml_complex_key_is_parse_error() {
        let err = parse_document(b"? [a, b]\n: value\n", SpecFormat::Yaml).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { .. }));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = parse_document(b"openapi: [unclosed\n", SpecFormat::Yaml).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { format: "YAML", .. }));
    }
}
