//! Place records: the decoded form of a single Who's On First GeoJSON file.
//!
//! Decoding is deliberately lenient. Only a missing or unusable `wof:id` (or
//! bytes that are not a JSON object with `properties`) is an error; every other
//! gap produces a [`DecodeWarning`] and a best-effort default.

pub mod uri;

use std::collections::BTreeSet;
use std::fmt;

use serde_json::{Map, Value as JsonValue};

use crate::error::{GraphError, Result};

/// Tri-state flag for properties that may be explicitly unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Existential {
    True,
    #[default]
    False,
    Unknown,
}

impl Existential {
    /// True only when the value is definitively known to be true.
    pub fn is_true(self) -> bool {
        matches!(self, Existential::True)
    }
}

/// A decoded place record. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Record {
    pub id: i64,
    /// 0 means the record is a root. Negative values (-1 unknown, -2
    /// multiple) are still parent references and resolve to a placeholder.
    pub parent_id: i64,
    pub name: String,
    pub placetype: String,
    /// `wof:label`, preferred over `name` for display.
    pub label: Option<String>,
    pub deprecated: Existential,
    pub ceased: Existential,
    pub inception: Option<String>,
    pub cessation: Option<String>,
    pub belongs_to: BTreeSet<i64>,
    pub supersedes: Vec<i64>,
    pub superseded_by: Vec<i64>,
}

impl Record {
    pub fn has_parent(&self) -> bool {
        self.parent_id != 0
    }

    /// Name shown in the graph: the label override when present.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

/// Non-fatal problem found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeWarning {
    pub property: &'static str,
    pub message: String,
}

impl fmt::Display for DecodeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.message)
    }
}

/// Result of a successful decode: the record plus any tolerated warnings.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub record: Record,
    pub warnings: Vec<DecodeWarning>,
}

/// Decode raw GeoJSON bytes into a [`Record`].
///
/// `path` is only used for error messages.
pub fn decode_record(bytes: &[u8], path: &str) -> Result<Decoded> {
    let decode_err = |reason: String| GraphError::Decode {
        path: path.to_string(),
        reason,
    };

    let value: JsonValue =
        serde_json::from_slice(bytes).map_err(|e| decode_err(e.to_string()))?;

    let props = match value.get("properties") {
        Some(JsonValue::Object(map)) => map,
        Some(_) => return Err(decode_err("properties is not an object".to_string())),
        None => return Err(decode_err("missing properties".to_string())),
    };

    let id = match props.get("wof:id") {
        Some(v) => as_id(v).ok_or_else(|| decode_err(format!("invalid wof:id: {}", v)))?,
        None => return Err(decode_err("missing wof:id".to_string())),
    };

    let mut warnings = Vec::new();

    let parent_id = match props.get("wof:parent_id").and_then(as_id) {
        Some(id) => id,
        None => {
            warnings.push(DecodeWarning {
                property: "wof:parent_id",
                message: "missing or invalid, assuming 0".to_string(),
            });
            0
        }
    };

    let name = string_prop(props, "wof:name").unwrap_or_else(|| {
        warnings.push(DecodeWarning {
            property: "wof:name",
            message: "missing".to_string(),
        });
        String::new()
    });

    let placetype = string_prop(props, "wof:placetype").unwrap_or_else(|| {
        warnings.push(DecodeWarning {
            property: "wof:placetype",
            message: "missing".to_string(),
        });
        String::new()
    });

    let record = Record {
        id,
        parent_id,
        name,
        placetype,
        label: string_prop(props, "wof:label"),
        deprecated: deprecation_flag(props.get("edtf:deprecated")),
        ceased: cessation_flag(props.get("edtf:cessation")),
        inception: string_prop(props, "edtf:inception"),
        cessation: string_prop(props, "edtf:cessation"),
        belongs_to: id_list(props, "wof:belongsto", &mut warnings).into_iter().collect(),
        supersedes: id_list(props, "wof:supersedes", &mut warnings),
        superseded_by: id_list(props, "wof:superseded_by", &mut warnings),
    };

    Ok(Decoded { record, warnings })
}

/// IDs show up both as JSON numbers and, in older data, as numeric strings.
fn as_id(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn string_prop(props: &Map<String, JsonValue>, key: &str) -> Option<String> {
    match props.get(key) {
        Some(JsonValue::String(s)) => Some(s.clone()),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn id_list(
    props: &Map<String, JsonValue>,
    key: &'static str,
    warnings: &mut Vec<DecodeWarning>,
) -> Vec<i64> {
    let items = match props.get(key) {
        Some(JsonValue::Array(items)) => items,
        Some(JsonValue::Null) | None => return Vec::new(),
        Some(other) => {
            warnings.push(DecodeWarning {
                property: key,
                message: format!("expected a list, got {}", other),
            });
            return Vec::new();
        }
    };

    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        match as_id(item) {
            Some(id) => ids.push(id),
            None => warnings.push(DecodeWarning {
                property: key,
                message: format!("skipping invalid ID {}", item),
            }),
        }
    }
    ids
}

fn deprecation_flag(value: Option<&JsonValue>) -> Existential {
    match value {
        None | Some(JsonValue::Null) => Existential::False,
        Some(JsonValue::String(s)) => match s.trim() {
            "" => Existential::False,
            "u" | "uuuu" => Existential::Unknown,
            _ => Existential::True,
        },
        Some(JsonValue::Bool(true)) => Existential::True,
        Some(JsonValue::Bool(false)) => Existential::False,
        Some(_) => Existential::Unknown,
    }
}

fn cessation_flag(value: Option<&JsonValue>) -> Existential {
    match value {
        None | Some(JsonValue::Null) => Existential::False,
        Some(JsonValue::String(s)) => match s.trim() {
            "" | ".." | "open" => Existential::False,
            "u" | "uuuu" => Existential::Unknown,
            _ => Existential::True,
        },
        Some(JsonValue::Bool(true)) => Existential::True,
        Some(JsonValue::Bool(false)) => Existential::False,
        Some(_) => Existential::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(props: &str) -> Vec<u8> {
        format!(
            r#"{{"type": "Feature", "properties": {{{}}}, "geometry": null}}"#,
            props
        )
        .into_bytes()
    }

    #[test]
    fn test_decode_full_record() {
        let bytes = feature(
            r#""wof:id": 101736545, "wof:parent_id": 85633793, "wof:name": "Montreal",
               "wof:placetype": "locality", "wof:label": "Montréal",
               "edtf:inception": "1642", "edtf:cessation": "..",
               "wof:belongsto": [85633041, 102191575],
               "wof:supersedes": [1], "wof:superseded_by": []"#,
        );
        let decoded = decode_record(&bytes, "101/736/545/101736545.geojson").unwrap();
        assert!(decoded.warnings.is_empty());

        let r = decoded.record;
        assert_eq!(r.id, 101736545);
        assert_eq!(r.parent_id, 85633793);
        assert_eq!(r.display_name(), "Montréal");
        assert_eq!(r.placetype, "locality");
        assert_eq!(r.inception.as_deref(), Some("1642"));
        assert_eq!(r.ceased, Existential::False);
        assert_eq!(r.deprecated, Existential::False);
        assert!(r.belongs_to.contains(&85633041));
        assert_eq!(r.supersedes, vec![1]);
        assert!(r.superseded_by.is_empty());
    }

    #[test]
    fn test_decode_missing_optional_fields_warns() {
        let bytes = feature(r#""wof:id": "42""#);
        let decoded = decode_record(&bytes, "42.geojson").unwrap();
        assert_eq!(decoded.record.id, 42);
        assert_eq!(decoded.record.parent_id, 0);
        assert!(!decoded.record.has_parent());

        let props: Vec<_> = decoded.warnings.iter().map(|w| w.property).collect();
        assert!(props.contains(&"wof:parent_id"));
        assert!(props.contains(&"wof:name"));
        assert!(props.contains(&"wof:placetype"));
    }

    #[test]
    fn test_decode_missing_id_is_error() {
        let bytes = feature(r#""wof:name": "Nowhere""#);
        let err = decode_record(&bytes, "x.geojson").unwrap_err();
        assert!(matches!(err, GraphError::Decode { .. }));
        assert!(err.to_string().contains("wof:id"));
    }

    #[test]
    fn test_decode_invalid_json_is_error() {
        let err = decode_record(b"{not json", "bad.geojson").unwrap_err();
        assert!(err.to_string().contains("bad.geojson"));
    }

    #[test]
    fn test_decode_skips_bad_list_entries() {
        let bytes = feature(r#""wof:id": 7, "wof:parent_id": 1, "wof:supersedes": [3, "x", 4]"#);
        let decoded = decode_record(&bytes, "7.geojson").unwrap();
        assert_eq!(decoded.record.supersedes, vec![3, 4]);
        assert_eq!(decoded.warnings.len(), 3);
    }

    #[test]
    fn test_deprecation_tri_state() {
        assert_eq!(deprecation_flag(None), Existential::False);
        assert_eq!(deprecation_flag(Some(&JsonValue::from(""))), Existential::False);
        assert_eq!(deprecation_flag(Some(&JsonValue::from("uuuu"))), Existential::Unknown);
        assert_eq!(deprecation_flag(Some(&JsonValue::from("2017-08-24"))), Existential::True);
        assert!(!Existential::Unknown.is_true());
        assert!(Existential::True.is_true());
    }

    #[test]
    fn test_negative_parent_is_still_a_parent() {
        let bytes = feature(r#""wof:id": 5, "wof:parent_id": -1"#);
        let record = decode_record(&bytes, "5.geojson").unwrap().record;
        assert_eq!(record.parent_id, -1);
        assert!(record.has_parent());

        let root = feature(r#""wof:id": 1, "wof:parent_id": 0"#);
        assert!(!decode_record(&root, "1.geojson").unwrap().record.has_parent());
    }

    #[test]
    fn test_cessation_flag() {
        assert_eq!(cessation_flag(Some(&JsonValue::from(".."))), Existential::False);
        assert_eq!(cessation_flag(Some(&JsonValue::from("u"))), Existential::Unknown);
        assert_eq!(cessation_flag(Some(&JsonValue::from("1999"))), Existential::True);
    }
}
