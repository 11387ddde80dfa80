/// Storage engine abstraction for the graph store
///
/// - GraphStorage trait: the operations the application relies on
/// - RocksDB implementation: the persistent backend

pub mod error;
pub mod rocksdb_store;

use crate::types::{Edge, Graphid, Vertex};
use async_trait::async_trait;
pub use error::{StorageError, StorageResult};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Graph storage abstraction
///
/// Every operation is a single pattern step: create a vertex or edge, look a
/// vertex up by id or by property, or walk one relationship type from a vertex.
#[async_trait]
pub trait GraphStorage: Send + Sync {
    /// Get a vertex by ID
    async fn get_vertex(&self, id: Graphid) -> StorageResult<Option<Vertex>>;

    /// Create a new vertex
    ///
    /// # Returns
    /// * `Ok(vertex)` with assigned ID
    /// * `Err(StorageError::UniqueViolation)` if a unique indexed property of
    ///   `label` already holds the same value
    async fn create_vertex(&self, label: &str, properties: JsonValue) -> StorageResult<Vertex>;

    /// Create a new directed edge from `start` to `end`
    ///
    /// # Returns
    /// * `Ok(edge)` with assigned ID
    /// * `Err(StorageError::VertexNotFound)` if either endpoint does not exist
    async fn create_edge(
        &self,
        label: &str,
        start: Graphid,
        end: Graphid,
        properties: JsonValue,
    ) -> StorageResult<Edge>;

    /// Find the vertex of `label` whose `property` equals `value`
    ///
    /// Uses the unique index when one is declared for `(label, property)`;
    /// otherwise scans the label and returns the first match.
    async fn find_vertex(
        &self,
        label: &str,
        property: &str,
        value: &str,
    ) -> StorageResult<Option<Vertex>>;

    /// Scan all vertices with a given label, in creation order
    ///
    /// A label that has never been used yields an empty list.
    async fn scan_vertices(&self, label: &str) -> StorageResult<Vec<Vertex>>;

    /// Outgoing edges of type `label` from a vertex, in creation order
    async fn outgoing_edges(&self, vid: Graphid, label: &str) -> StorageResult<Vec<Edge>>;

    /// Incoming edges of type `label` to a vertex, in creation order
    async fn incoming_edges(&self, vid: Graphid, label: &str) -> StorageResult<Vec<Edge>>;

    /// Declare a unique index over `property` of vertices labelled `label`
    ///
    /// Idempotent. Existing vertices are indexed when the declaration is new.
    async fn ensure_unique_index(&self, label: &str, property: &str) -> StorageResult<()>;
}

/// Shared storage handle
pub type SharedStorage = Arc<dyn GraphStorage>;
