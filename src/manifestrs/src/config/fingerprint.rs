// manifestrs/src/config/fingerprint.rs

use crate::manifest::Component;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt::Write;
use std::hash::Hasher;
use twox_hash::XxHash64;

/// Content hash of a component definition.
///
/// Hashes a canonical serialization (object keys sorted recursively, array
/// order preserved) of every field except `metadata.updatedAt`, so a save that
/// only bumps the timestamp is not seen as a modification.
pub fn compute_hash(component: &Component) -> String {
    let mut value = match serde_json::to_value(component) {
        Ok(value) => value,
        Err(e) => {
            log::error!("Could not serialize component {}: {}", component.id, e);
            Value::String(component.id.clone())
        }
    };

    if let Some(metadata) = value.get_mut("metadata").and_then(Value::as_object_mut) {
        metadata.remove("updatedAt");
    }

    sha256_hex(canonical_json(&value).as_bytes())
}

/// Serialize a JSON value with object keys sorted at every level
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{}:", Value::String(key.clone()));
                write_canonical(item, out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        leaf => {
            let _ = write!(out, "{}", leaf);
        }
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Cheap non-cryptographic fingerprint of raw file contents
pub fn content_fingerprint(bytes: &[u8]) -> String {
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(bytes);
    format!("{:x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::component::{DataType, PropertyDefinition};
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::json;

    fn sample() -> Component {
        Component::new("a", "Card", "div")
            .with_children(["b", "c"])
            .with_property("title", PropertyDefinition::text("Hello"))
    }

    #[test]
    fn test_canonical_json_sorts_keys_recursively() {
        let value = json!({ "b": 1, "a": { "z": true, "y": [3, 1, 2] } });
        assert_eq!(
            canonical_json(&value),
            r#"{"a":{"y":[3,1,2],"z":true},"b":1}"#
        );
    }

    #[test]
    fn test_canonical_json_escapes_strings() {
        let value = json!({ "q\"k": "line\nbreak" });
        assert_eq!(canonical_json(&value), r#"{"q\"k":"line\nbreak"}"#);
    }

    #[test]
    fn test_compute_hash_deterministic() {
        let component = sample();
        assert_eq!(compute_hash(&component), compute_hash(&component.clone()));
        assert_eq!(compute_hash(&component).len(), 64);
    }

    #[test]
    fn test_compute_hash_ignores_property_insertion_order() {
        let first = Component::new("a", "Card", "div")
            .with_property("x", PropertyDefinition::text("1"))
            .with_property("y", PropertyDefinition::text("2"));
        let mut second = Component::new("a", "Card", "div")
            .with_property("y", PropertyDefinition::text("2"))
            .with_property("x", PropertyDefinition::text("1"));
        second.metadata = first.metadata.clone();

        assert_eq!(compute_hash(&first), compute_hash(&second));
    }

    #[test]
    fn test_compute_hash_ignores_updated_at() {
        let component = sample();
        let mut touched = component.clone();
        touched.metadata.updated_at = Utc::now() + Duration::hours(3);

        assert_eq!(compute_hash(&component), compute_hash(&touched));
    }

    #[test]
    fn test_compute_hash_sensitive_fields() {
        let base = sample();
        let base_hash = compute_hash(&base);

        let mut changed = base.clone();
        changed.display_name = "Panel".to_string();
        assert_ne!(compute_hash(&changed), base_hash, "displayName");

        let mut changed = base.clone();
        changed.element_type = "section".to_string();
        assert_ne!(compute_hash(&changed), base_hash, "type");

        let mut changed = base.clone();
        changed.category = Some("layout".to_string());
        assert_ne!(compute_hash(&changed), base_hash, "category");

        let mut changed = base.clone();
        changed.properties.insert(
            "title".to_string(),
            PropertyDefinition::Static {
                value: json!("Bye"),
                data_type: DataType::String,
            },
        );
        assert_ne!(compute_hash(&changed), base_hash, "properties");

        let mut changed = base.clone();
        changed.styling.base_classes.push("p-4".to_string());
        assert_ne!(compute_hash(&changed), base_hash, "styling");

        let mut changed = base.clone();
        changed.children.reverse();
        assert_ne!(compute_hash(&changed), base_hash, "children order");

        let changed = base.clone().with_event("onClick", "flow-1");
        assert_ne!(compute_hash(&changed), base_hash, "events");
    }

    #[test]
    fn test_created_at_is_hashed_but_pinnable() {
        let earlier = Component::new("a", "Card", "div");
        let mut later = earlier.clone();
        later.metadata.created_at = earlier.metadata.created_at + Duration::milliseconds(1);
        assert_ne!(compute_hash(&earlier), compute_hash(&later));

        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let first = Component::new("a", "Card", "div").with_timestamps(at);
        let second = Component::new("a", "Card", "div").with_timestamps(at);
        assert_eq!(compute_hash(&first), compute_hash(&second));
    }

    #[test]
    fn test_content_fingerprint() {
        assert_eq!(content_fingerprint(b"abc"), content_fingerprint(b"abc"));
        assert_ne!(content_fingerprint(b"abc"), content_fingerprint(b"abd"));
        assert!(content_fingerprint(b"").chars().all(|c| c.is_ascii_hexdigit()));
    }
}
