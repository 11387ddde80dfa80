use super::graphid::Graphid;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Edge (Relationship) in the graph
///
/// Edges are directed: `start` is the source vertex, `end` the target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    /// Unique identifier
    pub id: Graphid,

    /// Start vertex ID (source)
    pub start: Graphid,

    /// End vertex ID (target)
    pub end: Graphid,

    /// Edge label (e.g., "FOLLOWS", "LIKES")
    pub label: String,

    /// Properties stored as JSON
    pub properties: JsonValue,
}

impl Edge {
    pub fn new(
        id: Graphid,
        start: Graphid,
        end: Graphid,
        label: impl Into<String>,
        properties: JsonValue,
    ) -> Self {
        Self {
            id,
            start,
            end,
            label: label.into(),
            properties,
        }
    }
}
