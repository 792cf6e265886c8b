//! The value tree returned by the analysis engine.
//!
//! Every decoded response is a [`Value`]: one of six shapes (null,
//! boolean, 64-bit integer, string, ordered array, string-keyed
//! dictionary). The enum is closed, so no other shape can be produced by
//! the decoder and consumers can match exhaustively.
//!
//! # Equality
//!
//! Two notions of equality are provided:
//!
//! | Operation | Semantics |
//! |-----------|-----------|
//! | `==` ([`PartialEq`]) | Full, symmetric structural equality |
//! | [`Value::structurally_equals`] | Directional: every entry of the left dictionary must be found, equal, on the right |
//!
//! Consumers that compare a decoded response against an expected subset
//! (for example "the response contains `key.offset = 5`") use the
//! directional form; extra keys on the right-hand side are ignored.

use serde::Serialize;
use std::collections::BTreeMap;

/// A decoded engine value.
///
/// Dictionaries are keyed by canonical strings and stored in a
/// [`BTreeMap`], so insertion order never affects equality and JSON
/// output is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    String(String),
    Array(Vec<Value>),
    Dictionary(BTreeMap<String, Value>),
}

impl Value {
    /// Directional structural equality.
    ///
    /// - Scalars are equal iff they have the same shape and value.
    /// - Arrays are equal iff they have the same length and every
    ///   positional pair is equal. Comparison stops at the first mismatch.
    /// - Dictionaries: every key of `self` must exist in `other` with an
    ///   equal value. Keys present only in `other` are ignored, so
    ///   `{a:1}.structurally_equals({a:1,b:2})` is `true` while the
    ///   reverse is `false`.
    pub fn structurally_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(left), Value::Array(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|(l, r)| l.structurally_equals(r))
            }
            (Value::Dictionary(left), Value::Dictionary(right)) => left
                .iter()
                .all(|(key, l)| right.get(key).is_some_and(|r| l.structurally_equals(r))),
            _ => false,
        }
    }

    /// Short name of the shape, used in diagnostics.
    pub fn shape(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int64(_) => "int64",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dictionary(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Dictionary(map) => Some(map),
            _ => None,
        }
    }

    /// Look up `key` if this value is a dictionary.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_dictionary().and_then(|map| map.get(key))
    }

    /// Render as a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int64(i) => serde_json::Value::Number((*i).into()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Dictionary(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int64(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Dictionary(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Value::Dictionary(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
