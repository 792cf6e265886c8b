//! JSON encoding of engine values, used by replay fixtures and custom
//! requests.
//!
//! Plain JSON maps onto wire values directly (objects are dictionaries,
//! integers are int64, and so on). Single-key marker objects cover the
//! wire types JSON has no literal for:
//!
//! | JSON | Wire value |
//! |------|------------|
//! | `{"$uid": "source.lang.swift.decl.class"}` | UID |
//! | `{"$bytes": "<base64>"}` | string with raw (possibly non-UTF-8) bytes |
//! | `{"$data": "<base64>"}` | opaque data blob |

use anyhow::{anyhow, bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value as Json;
use std::collections::HashMap;

use sourcekit_bridge_core::uid::Uid;
use sourcekit_bridge_core::variant::Variant;
use sourcekit_bridge_core::wire::{WireObject, UID_MARKER};

const BYTES_MARKER: &str = "$bytes";
const DATA_MARKER: &str = "$data";

/// Assigns UIDs to names, standing in for the engine's UID registry.
///
/// UID 0 is never assigned.
#[derive(Debug, Default)]
pub struct UidTable {
    by_name: HashMap<String, Uid>,
    names: Vec<String>,
}

impl UidTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, name: &str) -> Uid {
        if let Some(uid) = self.by_name.get(name) {
            return *uid;
        }
        self.names.push(name.to_string());
        let uid = Uid(self.names.len() as u64);
        self.by_name.insert(name.to_string(), uid);
        uid
    }

    pub fn name(&self, uid: Uid) -> Option<&str> {
        let index = usize::try_from(uid.0).ok()?.checked_sub(1)?;
        self.names.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// If `map` is a single-key marker object, return `(marker, payload)`.
fn marker(map: &serde_json::Map<String, Json>) -> Option<(&str, &Json)> {
    if map.len() != 1 {
        return None;
    }
    let (key, value) = map.iter().next()?;
    match key.as_str() {
        UID_MARKER | BYTES_MARKER | DATA_MARKER => Some((key.as_str(), value)),
        _ => None,
    }
}

fn marker_text<'a>(name: &str, payload: &'a Json) -> Result<&'a str> {
    payload
        .as_str()
        .ok_or_else(|| anyhow!("{} expects a string, got {}", name, payload))
}

fn base64_payload(name: &str, payload: &Json) -> Result<Vec<u8>> {
    STANDARD
        .decode(marker_text(name, payload)?)
        .with_context(|| format!("{}: invalid base64", name))
}

/// Decode a JSON document into an engine response value, interning every
/// dictionary key and `$uid` name in `uids`.
pub fn variant_from_json(json: &Json, uids: &mut UidTable) -> Result<Variant> {
    match json {
        Json::Null => Ok(Variant::Null),
        Json::Bool(b) => Ok(Variant::Bool(*b)),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Variant::Int64(i))
            } else if let Some(f) = n.as_f64().filter(|_| !n.is_u64()) {
                Ok(Variant::Double(f))
            } else {
                bail!("integer out of int64 range: {}", n)
            }
        }
        Json::String(s) => Ok(Variant::string(s)),
        Json::Array(items) => items
            .iter()
            .map(|item| variant_from_json(item, uids))
            .collect::<Result<Vec<_>>>()
            .map(Variant::Array),
        Json::Object(map) => match marker(map) {
            Some((UID_MARKER, payload)) => {
                Ok(Variant::Uid(uids.intern(marker_text(UID_MARKER, payload)?)))
            }
            Some((BYTES_MARKER, payload)) => {
                Ok(Variant::String(base64_payload(BYTES_MARKER, payload)?))
            }
            Some((_, payload)) => Ok(Variant::Data(base64_payload(DATA_MARKER, payload)?)),
            None => {
                let mut entries = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let uid = uids.intern(key);
                    entries.push((uid, variant_from_json(value, uids)?));
                }
                Ok(Variant::Dictionary(entries))
            }
        },
    }
}

/// Decode a JSON document into a request object, the inverse of
/// [`WireObject::to_json`].
pub fn wire_from_json(json: &Json) -> Result<WireObject> {
    match json {
        Json::String(s) => Ok(WireObject::String(s.clone())),
        Json::Number(n) => n
            .as_i64()
            .map(WireObject::Int64)
            .ok_or_else(|| anyhow!("request values must be int64, got {}", n)),
        Json::Array(items) => items
            .iter()
            .map(wire_from_json)
            .collect::<Result<Vec<_>>>()
            .map(WireObject::Array),
        Json::Object(map) => match marker(map) {
            Some((UID_MARKER, payload)) => Ok(WireObject::uid(marker_text(UID_MARKER, payload)?)),
            Some((other, _)) => bail!("{} is not allowed in a request", other),
            None => map
                .iter()
                .map(|(k, v)| Ok((k.clone(), wire_from_json(v)?)))
                .collect::<Result<Vec<_>>>()
                .map(WireObject::Dictionary),
        },
        Json::Bool(_) | Json::Null => bail!("requests cannot contain {}", json),
    }
}
