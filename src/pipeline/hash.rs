// src/pipeline/hash.rs

//! Deterministic content fingerprints.
//!
//! Content is first rendered to a canonical text form (mapping keys
//! sorted, sequences in order, scalars in a fixed format) and the text is
//! hashed with SHA-256. Two structurally equal values always produce the
//! same digest regardless of how their mappings were built.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{Content, Scalar, format_number};

/// Hash a structured value to a lowercase hex SHA-256 digest.
pub fn hash_content(content: &Content) -> String {
    hash_text(&canonicalize(content))
}

/// SHA-256 of arbitrary text as lowercase hex.
pub(crate) fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Render the canonical text form of a structured value.
///
/// Absent mapping members are skipped and absent sequence elements render
/// as `null`, matching how content is persisted, so a reloaded snapshot
/// hashes the same as the original.
pub fn canonicalize(content: &Content) -> String {
    let mut out = String::new();
    write_canonical(content, &mut out);
    out
}

fn write_canonical(content: &Content, out: &mut String) {
    match content {
        Content::Scalar(scalar) => write_scalar(scalar, out),
        Content::Sequence(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Content::Mapping(map) => {
            // BTreeMap iterates in sorted key order.
            out.push('{');
            let mut first = true;
            for (key, value) in map.iter().filter(|(_, v)| !v.is_absent()) {
                if !first {
                    out.push(',');
                }
                first = false;
                write_string(key, out);
                out.push(':');
                write_canonical(value, out);
            }
            out.push('}');
        }
    }
}

fn write_scalar(scalar: &Scalar, out: &mut String) {
    match scalar {
        Scalar::Absent | Scalar::Null => out.push_str("null"),
        Scalar::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Scalar::Number(n) => out.push_str(&format_number(*n)),
        Scalar::String(s) => write_string(s, out),
    }
}

/// Quoted, JSON-escaped string.
fn write_string(s: &str, out: &mut String) {
    out.push_str(&Value::from(s).to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hash_is_deterministic() {
        let content = Content::from(json!({"name": "John", "tags": ["a", "b"]}));
        assert_eq!(hash_content(&content), hash_content(&content));
        assert_eq!(hash_content(&content).len(), 64);
    }

    #[test]
    fn test_hash_ignores_key_order() {
        let a = Content::mapping([("name", Content::from("John")), ("age", Content::from(30))]);
        let b = Content::mapping([("age", Content::from(30)), ("name", Content::from("John"))]);
        assert_eq!(hash_content(&a), hash_content(&b));
    }

    #[test]
    fn test_different_content_different_hash() {
        let john = Content::from(json!({"name": "John"}));
        let jane = Content::from(json!({"name": "Jane"}));
        assert_ne!(hash_content(&john), hash_content(&jane));
    }

    #[test]
    fn test_sequence_order_matters() {
        let a = Content::from(json!([1, 2, 3]));
        let b = Content::from(json!([3, 2, 1]));
        assert_ne!(hash_content(&a), hash_content(&b));
    }

    #[test]
    fn test_kinds_are_distinguished() {
        let number = Content::from(1);
        let string = Content::from("1");
        let boolean = Content::from(true);
        assert_ne!(hash_content(&number), hash_content(&string));
        assert_ne!(hash_content(&string), hash_content(&boolean));
    }

    #[test]
    fn test_canonical_form() {
        let content = Content::from(json!({"b": [1.0, 2.5, null], "a": "x\"y"}));
        assert_eq!(canonicalize(&content), r#"{"a":"x\"y","b":[1,2.5,null]}"#);
    }

    #[test]
    fn test_canonical_form_matches_persisted_json() {
        let content = Content::mapping([
            ("gone", Content::absent()),
            ("list", Content::sequence([Content::absent(), Content::from(2)])),
        ]);
        let persisted: Content = serde_json::from_str(&serde_json::to_string(&content).unwrap())
            .unwrap();
        assert_eq!(hash_content(&content), hash_content(&persisted));
    }

    #[test]
    fn test_control_characters_escaped() {
        let content = Content::from("line\nbreak\u{1}");
        assert_eq!(canonicalize(&content), "\"line\\nbreak\\u0001\"");
    }
}
