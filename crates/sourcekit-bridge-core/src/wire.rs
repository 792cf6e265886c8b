//! Request object graph.
//!
//! A [`WireObject`] is the engine-neutral description of a request:
//! nested dictionaries, arrays and scalars keyed by canonical key strings.
//! It never touches the engine directly. An engine adapter turns it into
//! its own opaque objects through the constructors of an
//! [`ObjectBuilder`], which is the only construction path. Test doubles
//! can skip the builder and inspect the `WireObject` itself.

/// A request value before it is handed to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum WireObject {
    String(String),
    Int64(i64),
    /// A name the engine turns into a UID (request kinds, enumerated tags).
    Uid(String),
    Array(Vec<WireObject>),
    /// Ordered `(key, value)` entries. Keys are encoded as UIDs by the engine.
    Dictionary(Vec<(String, WireObject)>),
}

impl WireObject {
    pub fn string(s: impl Into<String>) -> Self {
        WireObject::String(s.into())
    }

    pub fn uid(name: impl Into<String>) -> Self {
        WireObject::Uid(name.into())
    }

    /// An array of string leaves.
    pub fn strings<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        WireObject::Array(items.into_iter().map(WireObject::string).collect())
    }

    pub fn dictionary<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, WireObject)>,
        K: Into<String>,
    {
        WireObject::Dictionary(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Value stored under `key`, if this is a dictionary.
    pub fn get(&self, key: &str) -> Option<&WireObject> {
        match self {
            WireObject::Dictionary(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireObject::String(s) | WireObject::Uid(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            WireObject::Int64(i) => Some(*i),
            _ => None,
        }
    }

    /// Rebuild this graph with an engine's constructors.
    pub fn build<B: ObjectBuilder>(&self, builder: &mut B) -> B::Object {
        match self {
            WireObject::String(s) => builder.string(s),
            WireObject::Int64(i) => builder.int64(*i),
            WireObject::Uid(name) => builder.uid(name),
            WireObject::Array(items) => {
                let built = items.iter().map(|item| item.build(builder)).collect();
                builder.array(built)
            }
            WireObject::Dictionary(entries) => {
                let built = entries
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.build(builder)))
                    .collect();
                builder.dictionary(built)
            }
        }
    }

    /// Render as JSON. UIDs become `{"$uid": name}` so the output can be
    /// fed back in as a custom request.
    pub fn to_json(&self) -> serde_json::Value {
        self.build(&mut JsonBuilder)
    }
}

/// Engine-provided constructors for request objects.
pub trait ObjectBuilder {
    type Object;

    fn string(&mut self, value: &str) -> Self::Object;
    fn int64(&mut self, value: i64) -> Self::Object;
    fn uid(&mut self, name: &str) -> Self::Object;
    fn array(&mut self, items: Vec<Self::Object>) -> Self::Object;
    fn dictionary(&mut self, entries: Vec<(&str, Self::Object)>) -> Self::Object;
}

/// Builds `serde_json::Value`s.
pub struct JsonBuilder;

/// JSON object key marking a UID leaf.
pub const UID_MARKER: &str = "$uid";

impl ObjectBuilder for JsonBuilder {
    type Object = serde_json::Value;

    fn string(&mut self, value: &str) -> serde_json::Value {
        serde_json::Value::String(value.to_string())
    }

    fn int64(&mut self, value: i64) -> serde_json::Value {
        serde_json::Value::Number(value.into())
    }

    fn uid(&mut self, name: &str) -> serde_json::Value {
        serde_json::json!({ UID_MARKER: name })
    }

    fn array(&mut self, items: Vec<serde_json::Value>) -> serde_json::Value {
        serde_json::Value::Array(items)
    }

    fn dictionary(&mut self, entries: Vec<(&str, serde_json::Value)>) -> serde_json::Value {
        serde_json::Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }
}
