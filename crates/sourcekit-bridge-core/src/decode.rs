//! Response decoding.
//!
//! [`Decoder::decode`] walks an engine response and produces a
//! [`Value`]. Dispatch is purely on the node's declared [`WireType`]:
//!
//! | Wire type | Result |
//! |-----------|--------|
//! | array | [`Value::Array`]; elements that decode to nothing are dropped |
//! | dictionary | [`Value::Dictionary`]; entries with an unnameable key or an empty value are dropped |
//! | string | [`Value::String`] via UTF-8, then Windows-1252, then ASCII |
//! | int64 / bool | the matching scalar |
//! | uid | [`Value::String`] with the UID's canonical name |
//! | null | nothing |
//! | anything else | [`DecodeError::UnsupportedType`] |
//!
//! Dropped nodes are silent by default. Attach a [`DropObserver`] to be
//! told about each one.

use std::collections::BTreeMap;

use crate::error::DecodeError;
use crate::uid::{Uid, UidCache, UidSource};
use crate::value::Value;
use crate::variant::{WireNode, WireType};

/// Why a node was left out of the decoded tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DropReason {
    /// Array element at `index` decoded to nothing.
    ArrayElement { index: usize, wire_type: WireType },
    /// Dictionary key whose UID could not be named.
    UnnamedKey(Uid),
    /// Dictionary value under `key` decoded to nothing.
    EmptyEntry { key: String, wire_type: WireType },
}

/// Diagnostic hook for partial decodes.
pub trait DropObserver {
    fn dropped(&self, reason: DropReason);
}

pub struct Decoder<'a> {
    cache: &'a UidCache,
    source: &'a dyn UidSource,
    observer: Option<&'a dyn DropObserver>,
}

impl<'a> Decoder<'a> {
    pub fn new(cache: &'a UidCache, source: &'a dyn UidSource) -> Self {
        Self {
            cache,
            source,
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn DropObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Decode `node`. `Ok(None)` means the node has no representation
    /// (null, undecodable bytes, unnameable UID).
    pub fn decode<N: WireNode>(&self, node: &N) -> Result<Option<Value>, DecodeError> {
        match node.wire_type() {
            WireType::Array => self.decode_array(node).map(Some),
            WireType::Dictionary => self.decode_dictionary(node).map(Some),
            WireType::String => Ok(decode_string(node.string_bytes()).map(Value::String)),
            WireType::Int64 => Ok(Some(Value::Int64(node.int64()))),
            WireType::Bool => Ok(Some(Value::Bool(node.bool()))),
            WireType::Uid => Ok(self
                .cache
                .resolve(node.uid(), self.source)
                .map(|name| Value::String(name.to_string()))),
            WireType::Null => Ok(None),
            other => Err(DecodeError::UnsupportedType(other)),
        }
    }

    fn decode_array<N: WireNode>(&self, node: &N) -> Result<Value, DecodeError> {
        let mut items = Vec::new();
        let mut failure = None;
        let mut index = 0;
        node.for_each_element(&mut |element| {
            match self.decode(element) {
                Ok(Some(value)) => items.push(value),
                Ok(None) => self.report(DropReason::ArrayElement {
                    index,
                    wire_type: element.wire_type(),
                }),
                Err(e) => {
                    failure = Some(e);
                    return false;
                }
            }
            index += 1;
            true
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(Value::Array(items)),
        }
    }

    fn decode_dictionary<N: WireNode>(&self, node: &N) -> Result<Value, DecodeError> {
        let mut map = BTreeMap::new();
        let mut failure = None;
        node.for_each_entry(&mut |uid, value| {
            let Some(key) = self.cache.resolve(uid, self.source) else {
                self.report(DropReason::UnnamedKey(uid));
                return true;
            };
            match self.decode(value) {
                Ok(Some(decoded)) => {
                    map.insert(key.to_string(), decoded);
                }
                Ok(None) => self.report(DropReason::EmptyEntry {
                    key: key.to_string(),
                    wire_type: value.wire_type(),
                }),
                Err(e) => {
                    failure = Some(e);
                    return false;
                }
            }
            true
        });
        match failure {
            Some(e) => Err(e),
            None => Ok(Value::Dictionary(map)),
        }
    }

    fn report(&self, reason: DropReason) {
        if let Some(observer) = self.observer {
            observer.dropped(reason);
        }
    }
}

/// Decode engine string bytes. Encodings are tried in a fixed order and
/// the first success wins: UTF-8, Windows-1252, ASCII.
pub fn decode_string(bytes: &[u8]) -> Option<String> {
    const DECODERS: [fn(&[u8]) -> Option<String>; 3] =
        [decode_utf8, decode_windows_1252, decode_ascii];
    DECODERS.iter().find_map(|decode| decode(bytes))
}

fn decode_utf8(bytes: &[u8]) -> Option<String> {
    std::str::from_utf8(bytes).ok().map(str::to_string)
}

// Only reached after Windows-1252 has failed, which requires one of its
// five unassigned bytes. Those are never ASCII, so this step is a formality
// that keeps the fallback order complete.
fn decode_ascii(bytes: &[u8]) -> Option<String> {
    bytes
        .is_ascii()
        .then(|| bytes.iter().map(|&b| b as char).collect())
}

/// 0x80..=0x9F in Windows-1252. `None` marks the five unassigned bytes.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn decode_windows_1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize],
            _ => Some(b as char),
        })
        .collect()
}
