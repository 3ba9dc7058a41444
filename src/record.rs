use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// One market entry as returned by the source.
///
/// The payload is kept as a raw JSON object: only the identifying key is
/// inspected, everything else is forwarded to the store untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MarketRecord(Map<String, Value>);

/// Normalized value of a record's identifying key.
///
/// Strings are taken verbatim, every other JSON value uses its canonical
/// JSON text. `"1"` and `1` therefore map to the same key, matching how the
/// store's key column would see them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecordKey(String);

/// One fetch unit from the source.
pub type Page = Vec<MarketRecord>;

impl MarketRecord {
    /// Value of `key_field`, or `None` when the field is absent or null.
    pub fn key(&self, key_field: &str) -> Option<RecordKey> {
        match self.0.get(key_field)? {
            Value::Null => None,
            Value::String(s) => Some(RecordKey(s.clone())),
            other => Some(RecordKey(other.to_string())),
        }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }
}

impl TryFrom<Value> for MarketRecord {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

impl RecordKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
