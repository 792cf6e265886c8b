//! Engine response values.
//!
//! Responses arrive as a generic tagged variant. [`WireNode`] is the
//! read-only view the decoder needs; an engine adapter implements it over
//! its native handles, and [`Variant`] is an owned implementation used by
//! replay fixtures and tests.

use crate::uid::Uid;

/// Declared type tag of a response value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Null,
    Dictionary,
    Array,
    Int64,
    String,
    Uid,
    Bool,
    Double,
    Data,
    /// A tag this crate does not know about.
    Other(i32),
}

impl WireType {
    /// Map the engine's numeric variant tag.
    pub fn from_code(code: i32) -> WireType {
        match code {
            0 => WireType::Null,
            1 => WireType::Dictionary,
            2 => WireType::Array,
            3 => WireType::Int64,
            4 => WireType::String,
            5 => WireType::Uid,
            6 => WireType::Bool,
            7 => WireType::Double,
            8 => WireType::Data,
            other => WireType::Other(other),
        }
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireType::Null => f.write_str("null"),
            WireType::Dictionary => f.write_str("dictionary"),
            WireType::Array => f.write_str("array"),
            WireType::Int64 => f.write_str("int64"),
            WireType::String => f.write_str("string"),
            WireType::Uid => f.write_str("uid"),
            WireType::Bool => f.write_str("bool"),
            WireType::Double => f.write_str("double"),
            WireType::Data => f.write_str("data"),
            WireType::Other(code) => write!(f, "type #{}", code),
        }
    }
}

/// Read access to one response value.
///
/// Accessors for a type other than [`wire_type`](WireNode::wire_type)
/// return that type's zero value, mirroring the engine's C interface.
/// Iteration order of arrays and dictionaries is whatever the engine
/// provides; returning `false` from the callback stops the walk.
pub trait WireNode {
    fn wire_type(&self) -> WireType;

    fn for_each_element(&self, f: &mut dyn FnMut(&Self) -> bool);

    fn for_each_entry(&self, f: &mut dyn FnMut(Uid, &Self) -> bool);

    fn string_bytes(&self) -> &[u8];

    fn int64(&self) -> i64;

    fn bool(&self) -> bool;

    fn uid(&self) -> Uid;
}

/// Owned response value.
#[derive(Debug, Clone, PartialEq)]
pub enum Variant {
    Null,
    Bool(bool),
    Int64(i64),
    /// Raw string bytes; the encoding is not guaranteed.
    String(Vec<u8>),
    Uid(Uid),
    Array(Vec<Variant>),
    Dictionary(Vec<(Uid, Variant)>),
    Double(f64),
    Data(Vec<u8>),
}

impl Variant {
    pub fn string(s: &str) -> Variant {
        Variant::String(s.as_bytes().to_vec())
    }
}

impl WireNode for Variant {
    fn wire_type(&self) -> WireType {
        match self {
            Variant::Null => WireType::Null,
            Variant::Bool(_) => WireType::Bool,
            Variant::Int64(_) => WireType::Int64,
            Variant::String(_) => WireType::String,
            Variant::Uid(_) => WireType::Uid,
            Variant::Array(_) => WireType::Array,
            Variant::Dictionary(_) => WireType::Dictionary,
            Variant::Double(_) => WireType::Double,
            Variant::Data(_) => WireType::Data,
        }
    }

    fn for_each_element(&self, f: &mut dyn FnMut(&Self) -> bool) {
        if let Variant::Array(items) = self {
            for item in items {
                if !f(item) {
                    break;
                }
            }
        }
    }

    fn for_each_entry(&self, f: &mut dyn FnMut(Uid, &Self) -> bool) {
        if let Variant::Dictionary(entries) = self {
            for (key, value) in entries {
                if !f(*key, value) {
                    break;
                }
            }
        }
    }

    fn string_bytes(&self) -> &[u8] {
        match self {
            Variant::String(bytes) => bytes,
            _ => &[],
        }
    }

    fn int64(&self) -> i64 {
        match self {
            Variant::Int64(i) => *i,
            _ => 0,
        }
    }

    fn bool(&self) -> bool {
        matches!(self, Variant::Bool(true))
    }

    fn uid(&self) -> Uid {
        match self {
            Variant::Uid(uid) => *uid,
            _ => Uid(0),
        }
    }
}
