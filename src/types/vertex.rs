use super::graphid::Graphid;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Vertex (Node) in the graph
///
/// A vertex carries a label (its type, e.g. "User" or "Post") and an
/// arbitrary JSON object of properties.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Vertex {
    /// Unique identifier
    pub id: Graphid,

    /// Vertex label
    pub label: String,

    /// Properties stored as JSON
    pub properties: JsonValue,
}

impl Vertex {
    pub fn new(id: Graphid, label: impl Into<String>, properties: JsonValue) -> Self {
        Self {
            id,
            label: label.into(),
            properties,
        }
    }

    /// Get a property value by key
    pub fn property(&self, key: &str) -> Option<&JsonValue> {
        self.properties.get(key)
    }

    /// Get a string property by key
    pub fn str_property(&self, key: &str) -> Option<&str> {
        self.property(key).and_then(JsonValue::as_str)
    }

    /// Get an integer property by key
    pub fn i64_property(&self, key: &str) -> Option<i64> {
        self.property(key).and_then(JsonValue::as_i64)
    }
}
