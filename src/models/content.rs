// src/models/content.rs

//! Structured content values.
//!
//! A `Content` is one observation of a source as already-parsed, JSON-like
//! data. It is a closed, recursive variant so the differ can match on it
//! exhaustively. Cyclic values cannot be built from owned data, so the
//! "no cycles" requirement holds by construction.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Largest integer an `f64` represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A leaf value.
#[derive(Debug, Clone)]
pub enum Scalar {
    /// A slot that exists but holds no value (JavaScript `undefined`).
    Absent,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Absent, Scalar::Absent) | (Scalar::Null, Scalar::Null) => true,
            (Scalar::Bool(a), Scalar::Bool(b)) => a == b,
            // NaN must equal itself or diff(v, v) would report a change.
            (Scalar::Number(a), Scalar::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Scalar::String(a), Scalar::String(b)) => a == b,
            _ => false,
        }
    }
}

/// A structured value: scalar, ordered sequence, or keyed mapping.
///
/// Mapping keys are kept sorted, so two mappings built with different
/// insertion orders are identical values.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Scalar(Scalar),
    Sequence(Vec<Content>),
    Mapping(BTreeMap<String, Content>),
}

impl Content {
    /// The `null` value.
    pub fn null() -> Self {
        Content::Scalar(Scalar::Null)
    }

    /// The absent (undefined) value.
    pub fn absent() -> Self {
        Content::Scalar(Scalar::Absent)
    }

    /// Build a mapping from key/value pairs. Later duplicates win.
    pub fn mapping<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Content>,
    {
        Content::Mapping(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a sequence from items.
    pub fn sequence<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Content>,
    {
        Content::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Parse content from JSON text.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Short name of the value kind, for messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Scalar(Scalar::Absent) => "absent",
            Content::Scalar(Scalar::Null) => "null",
            Content::Scalar(Scalar::Bool(_)) => "boolean",
            Content::Scalar(Scalar::Number(_)) => "number",
            Content::Scalar(Scalar::String(_)) => "string",
            Content::Sequence(_) => "sequence",
            Content::Mapping(_) => "mapping",
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Content::Scalar(Scalar::Absent))
    }

    /// Look up a mapping member.
    pub fn get(&self, key: &str) -> Option<&Content> {
        match self {
            Content::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Content::Scalar(Scalar::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Content::Scalar(Scalar::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// Convert to a `serde_json::Value`.
    ///
    /// Absent mapping members are dropped and absent sequence elements
    /// become `null`, the same way the value is persisted.
    pub fn to_json(&self) -> Value {
        match self {
            Content::Scalar(scalar) => match scalar {
                Scalar::Absent | Scalar::Null => Value::Null,
                Scalar::Bool(b) => Value::Bool(*b),
                Scalar::Number(n) => match integral(*n) {
                    Some(i) => Value::from(i),
                    None => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
                },
                Scalar::String(s) => Value::String(s.clone()),
            },
            Content::Sequence(items) => Value::Array(items.iter().map(Content::to_json).collect()),
            Content::Mapping(map) => Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_absent())
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Integer form of `n` when it is integral and exactly representable.
pub(crate) fn integral(n: f64) -> Option<i64> {
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(n as i64)
    } else {
        None
    }
}

/// Fixed textual form of a number: integral values without a fraction,
/// others in shortest round-trip form, non-finite values as `null`.
pub(crate) fn format_number(n: f64) -> String {
    match integral(n) {
        Some(i) => i.to_string(),
        None if n.is_finite() => n.to_string(),
        None => "null".to_string(),
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Content::null(),
            Value::Bool(b) => Content::Scalar(Scalar::Bool(b)),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(Content::null, |f| Content::Scalar(Scalar::Number(f))),
            Value::String(s) => Content::Scalar(Scalar::String(s)),
            Value::Array(items) => Content::Sequence(items.into_iter().map(Content::from).collect()),
            Value::Object(map) => {
                Content::Mapping(map.into_iter().map(|(k, v)| (k, Content::from(v))).collect())
            }
        }
    }
}

impl From<&Content> for Value {
    fn from(content: &Content) -> Self {
        content.to_json()
    }
}

impl From<Scalar> for Content {
    fn from(scalar: Scalar) -> Self {
        Content::Scalar(scalar)
    }
}

impl From<bool> for Content {
    fn from(b: bool) -> Self {
        Content::Scalar(Scalar::Bool(b))
    }
}

impl From<&str> for Content {
    fn from(s: &str) -> Self {
        Content::Scalar(Scalar::String(s.to_string()))
    }
}

impl From<String> for Content {
    fn from(s: String) -> Self {
        Content::Scalar(Scalar::String(s))
    }
}

impl<T: Into<Content>> From<Vec<T>> for Content {
    fn from(items: Vec<T>) -> Self {
        Content::sequence(items)
    }
}

impl<T: Into<Content>> From<Option<T>> for Content {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Content::null, Into::into)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Content {
                fn from(n: $t) -> Self {
                    Content::Scalar(Scalar::Number(n as f64))
                }
            }
        )*
    };
}

number_from!(i32, i64, u32, u64, usize, f32, f64);

impl Serialize for Content {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Content::Scalar(scalar) => match scalar {
                Scalar::Absent | Scalar::Null => serializer.serialize_unit(),
                Scalar::Bool(b) => serializer.serialize_bool(*b),
                Scalar::Number(n) => match integral(*n) {
                    Some(i) => serializer.serialize_i64(i),
                    None if n.is_finite() => serializer.serialize_f64(*n),
                    None => serializer.serialize_unit(),
                },
                Scalar::String(s) => serializer.serialize_str(s),
            },
            Content::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Content::Mapping(map) => {
                let mut out = serializer.serialize_map(None)?;
                for (key, value) in map.iter().filter(|(_, v)| !v.is_absent()) {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Content {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Content::from)
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Content::Scalar(Scalar::Absent) => f.write_str("undefined"),
            _ => {
                let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
                f.write_str(&text)
            }
        }
    }
}
