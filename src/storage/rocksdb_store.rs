/// RocksDB storage implementation
///
/// Key space design:
/// - Label:    l:{graph}:{name} → labid
/// - Counter:  c:{graph}:{labid} → max_locid
/// - Vertex:   v:{graph}:{labid}:{locid} → JSON
/// - Edge:     e:{graph}:{labid}:{locid} → JSON
/// - OutEdge:  o:{graph}:{src_vid}:{edge_labid}:{eid} → empty
/// - InEdge:   i:{graph}:{dst_vid}:{edge_labid}:{eid} → empty
/// - Index:    x:{graph}:{label}:{property} → empty
/// - Unique:   u:{graph}:{labid}:{property}:{value} → vid
///
/// Numeric key segments are zero-padded so that a prefix scan walks them in
/// creation order.

use super::error::{StorageError, StorageResult};
use super::GraphStorage;
use crate::types::{Edge, Graphid, Vertex};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use rocksdb::{Options, WriteBatch, DB};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::Path;

/// RocksDB-backed graph storage
pub struct RocksDbStorage {
    /// RocksDB database instance
    db: DB,

    /// Graph name (namespace)
    graph_name: String,

    /// Label cache: name -> label ID. Authoritative once loaded, since RocksDB
    /// holds an exclusive lock on the directory.
    labels: RwLock<HashMap<String, u16>>,

    /// Unique indexes: label -> indexed properties
    unique_indexes: RwLock<HashMap<String, Vec<String>>>,

    /// Serializes id allocation and unique checks
    write_lock: Mutex<()>,
}

impl RocksDbStorage {
    /// Open (or create) a RocksDB storage instance
    ///
    /// # Arguments
    /// * `path` - Path to the database directory
    /// * `graph_name` - Name of the graph (namespace)
    pub fn new<P: AsRef<Path>>(path: P, graph_name: impl Into<String>) -> StorageResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path)?;

        let storage = Self {
            db,
            graph_name: graph_name.into(),
            labels: RwLock::new(HashMap::new()),
            unique_indexes: RwLock::new(HashMap::new()),
            write_lock: Mutex::new(()),
        };

        storage.load_labels()?;
        storage.load_index_declarations()?;

        tracing::debug!(
            graph = %storage.graph_name,
            labels = storage.labels.read().len(),
            "graph storage opened"
        );

        Ok(storage)
    }

    /// Load existing labels from database
    fn load_labels(&self) -> StorageResult<()> {
        let prefix = format!("l:{}:", self.graph_name);
        let mut labels = self.labels.write();

        for (key, value) in self.scan_prefix(&prefix)? {
            let label_name = &key[prefix.len()..];
            let bytes: [u8; 2] = value.as_slice().try_into().map_err(|_| {
                StorageError::InvalidState(format!("label '{}' has a malformed id", label_name))
            })?;
            labels.insert(label_name.to_string(), u16::from_le_bytes(bytes));
        }

        Ok(())
    }

    /// Load unique index declarations from database
    fn load_index_declarations(&self) -> StorageResult<()> {
        let prefix = format!("x:{}:", self.graph_name);
        let mut indexes = self.unique_indexes.write();

        for (key, _) in self.scan_prefix(&prefix)? {
            let (label, property) = key[prefix.len()..].split_once(':').ok_or_else(|| {
                StorageError::InvalidState(format!("malformed index declaration '{}'", key))
            })?;
            indexes
                .entry(label.to_string())
                .or_default()
                .push(property.to_string());
        }

        Ok(())
    }

    /// Collect every (key, value) pair under a prefix
    fn scan_prefix(&self, prefix: &str) -> StorageResult<Vec<(String, Vec<u8>)>> {
        let mut entries = Vec::new();

        for item in self.db.prefix_iterator(prefix.as_bytes()) {
            let (key, value) = item?;
            let key_str = std::str::from_utf8(&key)?;

            // The iterator runs past the prefix without an extractor
            if !key_str.starts_with(prefix) {
                break;
            }

            entries.push((key_str.to_string(), value.to_vec()));
        }

        Ok(entries)
    }

    /// Look up a label ID without creating it
    fn label_id(&self, label: &str) -> Option<u16> {
        self.labels.read().get(label).copied()
    }

    /// Get or create a label ID. Callers must hold `write_lock`.
    fn get_or_create_label(&self, label: &str) -> StorageResult<u16> {
        if let Some(label_id) = self.label_id(label) {
            return Ok(label_id);
        }

        let mut labels = self.labels.write();
        let label_id = labels
            .values()
            .copied()
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| StorageError::CounterOverflow(label.to_string()))?;

        let key = format!("l:{}:{}", self.graph_name, label);
        self.db.put(key.as_bytes(), label_id.to_le_bytes())?;
        labels.insert(label.to_string(), label_id);

        tracing::debug!(label, label_id, "created label");

        Ok(label_id)
    }

    /// Reserve the next local ID for a label, staging the counter in `batch`.
    /// Callers must hold `write_lock`.
    fn allocate_local_id(
        &self,
        label_id: u16,
        label: &str,
        batch: &mut WriteBatch,
    ) -> StorageResult<u64> {
        let key = self.make_counter_key(label_id);

        let current = match self.db.get(key.as_bytes())? {
            Some(bytes) => {
                let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                    StorageError::InvalidState(format!("counter for '{}' is malformed", label))
                })?;
                u64::from_le_bytes(bytes)
            }
            None => 0,
        };

        let next = current
            .checked_add(1)
            .filter(|next| *next <= Graphid::MAX_LOCID)
            .ok_or_else(|| StorageError::CounterOverflow(label.to_string()))?;

        batch.put(key.as_bytes(), next.to_le_bytes());

        Ok(next)
    }

    fn read_vertex(&self, id: Graphid) -> StorageResult<Option<Vertex>> {
        let key = self.make_vertex_key(id.labid(), id.locid());

        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn read_edge(&self, id: Graphid) -> StorageResult<Option<Edge>> {
        let key = self.make_edge_key(id.labid(), id.locid());

        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn indexed_properties(&self, label: &str) -> Vec<String> {
        self.unique_indexes
            .read()
            .get(label)
            .cloned()
            .unwrap_or_default()
    }

    /// Stage the unique index entries of a new vertex, rejecting duplicates.
    /// Callers must hold `write_lock`.
    fn stage_unique_entries(
        &self,
        vertex: &Vertex,
        label_id: u16,
        batch: &mut WriteBatch,
    ) -> StorageResult<()> {
        for property in self.indexed_properties(&vertex.label) {
            let Some(value) = vertex.property(&property).and_then(index_value) else {
                continue;
            };

            let key = self.make_unique_key(label_id, &property, &value);
            if self.db.get(key.as_bytes())?.is_some() {
                return Err(StorageError::UniqueViolation {
                    label: vertex.label.clone(),
                    property,
                    value,
                });
            }

            batch.put(key.as_bytes(), vertex.id.as_raw().to_le_bytes());
        }

        Ok(())
    }

    /// Edges adjacent to `vid` under an adjacency prefix (`o` or `i`)
    fn adjacent_edges(&self, direction: char, vid: Graphid, label: &str) -> StorageResult<Vec<Edge>> {
        let Some(label_id) = self.label_id(label) else {
            return Ok(Vec::new());
        };

        let prefix = format!(
            "{}:{}:{:020}:{}:",
            direction,
            self.graph_name,
            vid.as_raw(),
            label_id
        );

        let mut edges = Vec::new();
        for (key, _) in self.scan_prefix(&prefix)? {
            let eid_raw = key[prefix.len()..]
                .parse::<u64>()
                .map_err(|_| StorageError::InvalidState(format!("invalid edge ID in index key '{}'", key)))?;

            if let Some(edge) = self.read_edge(Graphid::from_raw(eid_raw))? {
                edges.push(edge);
            }
        }

        Ok(edges)
    }

    /// Make key for a counter
    fn make_counter_key(&self, label_id: u16) -> String {
        format!("c:{}:{}", self.graph_name, label_id)
    }

    /// Make key for a vertex
    fn make_vertex_key(&self, label_id: u16, locid: u64) -> String {
        format!("v:{}:{}:{:015}", self.graph_name, label_id, locid)
    }

    /// Make key prefix for vertex scan
    fn make_vertex_prefix(&self, label_id: u16) -> String {
        format!("v:{}:{}:", self.graph_name, label_id)
    }

    /// Make key for an edge
    fn make_edge_key(&self, label_id: u16, locid: u64) -> String {
        format!("e:{}:{}:{:015}", self.graph_name, label_id, locid)
    }

    /// Make key for an adjacency entry
    fn make_adjacency_key(&self, direction: char, vid: Graphid, eid: Graphid) -> String {
        format!(
            "{}:{}:{:020}:{}:{:020}",
            direction,
            self.graph_name,
            vid.as_raw(),
            eid.labid(),
            eid.as_raw()
        )
    }

    /// Make key for a unique index entry
    fn make_unique_key(&self, label_id: u16, property: &str, value: &str) -> String {
        format!("u:{}:{}:{}:{}", self.graph_name, label_id, property, value)
    }

    /// Make key for a unique index declaration
    fn make_index_declaration_key(&self, label: &str, property: &str) -> String {
        format!("x:{}:{}:{}", self.graph_name, label, property)
    }
}

/// The indexable text of a property value
fn index_value(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[async_trait]
impl GraphStorage for RocksDbStorage {
    async fn get_vertex(&self, id: Graphid) -> StorageResult<Option<Vertex>> {
        self.read_vertex(id)
    }

    async fn create_vertex(&self, label: &str, properties: JsonValue) -> StorageResult<Vertex> {
        let _guard = self.write_lock.lock();

        let label_id = self.get_or_create_label(label)?;
        let mut batch = WriteBatch::default();
        let locid = self.allocate_local_id(label_id, label, &mut batch)?;
        let id = Graphid::new(label_id, locid)
            .map_err(|e| StorageError::InvalidState(e.to_string()))?;

        let vertex = Vertex::new(id, label, properties);
        self.stage_unique_entries(&vertex, label_id, &mut batch)?;

        let key = self.make_vertex_key(label_id, locid);
        batch.put(key.as_bytes(), serde_json::to_vec(&vertex)?);
        self.db.write(batch)?;

        Ok(vertex)
    }

    async fn create_edge(
        &self,
        label: &str,
        start: Graphid,
        end: Graphid,
        properties: JsonValue,
    ) -> StorageResult<Edge> {
        let _guard = self.write_lock.lock();

        for endpoint in [start, end] {
            if self.read_vertex(endpoint)?.is_none() {
                return Err(StorageError::VertexNotFound(endpoint.to_string()));
            }
        }

        let label_id = self.get_or_create_label(label)?;
        let mut batch = WriteBatch::default();
        let locid = self.allocate_local_id(label_id, label, &mut batch)?;
        let id = Graphid::new(label_id, locid)
            .map_err(|e| StorageError::InvalidState(e.to_string()))?;

        let edge = Edge::new(id, start, end, label, properties);

        let key = self.make_edge_key(label_id, locid);
        batch.put(key.as_bytes(), serde_json::to_vec(&edge)?);
        batch.put(self.make_adjacency_key('o', start, id).as_bytes(), b"");
        batch.put(self.make_adjacency_key('i', end, id).as_bytes(), b"");
        self.db.write(batch)?;

        Ok(edge)
    }

    async fn find_vertex(
        &self,
        label: &str,
        property: &str,
        value: &str,
    ) -> StorageResult<Option<Vertex>> {
        let Some(label_id) = self.label_id(label) else {
            return Ok(None);
        };

        if self.indexed_properties(label).iter().any(|p| p == property) {
            let key = self.make_unique_key(label_id, property, value);
            return match self.db.get(key.as_bytes())? {
                Some(bytes) => {
                    let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
                        StorageError::InvalidState(format!("unique entry '{}' is malformed", key))
                    })?;
                    self.read_vertex(Graphid::from_raw(u64::from_le_bytes(bytes)))
                }
                None => Ok(None),
            };
        }

        let found = self
            .scan_vertices(label)
            .await?
            .into_iter()
            .find(|v| v.property(property).and_then(index_value).as_deref() == Some(value));

        Ok(found)
    }

    async fn scan_vertices(&self, label: &str) -> StorageResult<Vec<Vertex>> {
        let Some(label_id) = self.label_id(label) else {
            return Ok(Vec::new());
        };

        self.scan_prefix(&self.make_vertex_prefix(label_id))?
            .into_iter()
            .map(|(_, value)| serde_json::from_slice::<Vertex>(&value).map_err(StorageError::from))
            .collect()
    }

    async fn outgoing_edges(&self, vid: Graphid, label: &str) -> StorageResult<Vec<Edge>> {
        self.adjacent_edges('o', vid, label)
    }

    async fn incoming_edges(&self, vid: Graphid, label: &str) -> StorageResult<Vec<Edge>> {
        self.adjacent_edges('i', vid, label)
    }

    async fn ensure_unique_index(&self, label: &str, property: &str) -> StorageResult<()> {
        let _guard = self.write_lock.lock();

        if self.indexed_properties(label).iter().any(|p| p == property) {
            return Ok(());
        }

        let label_id = self.get_or_create_label(label)?;
        let mut batch = WriteBatch::default();
        let mut seen = HashMap::new();

        for (_, bytes) in self.scan_prefix(&self.make_vertex_prefix(label_id))? {
            let vertex: Vertex = serde_json::from_slice(&bytes)?;
            let Some(value) = vertex.property(property).and_then(index_value) else {
                continue;
            };

            if seen.insert(value.clone(), vertex.id).is_some() {
                return Err(StorageError::UniqueViolation {
                    label: label.to_string(),
                    property: property.to_string(),
                    value,
                });
            }

            let key = self.make_unique_key(label_id, property, &value);
            batch.put(key.as_bytes(), vertex.id.as_raw().to_le_bytes());
        }

        batch.put(self.make_index_declaration_key(label, property).as_bytes(), b"");
        self.db.write(batch)?;

        self.unique_indexes
            .write()
            .entry(label.to_string())
            .or_default()
            .push(property.to_string());

        tracing::info!(label, property, backfilled = seen.len(), "unique index ready");

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_storage() -> (RocksDbStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = RocksDbStorage::new(temp_dir.path(), "test_graph").unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_create_and_get_vertex() {
        let (storage, _temp) = create_test_storage();

        let vertex = storage
            .create_vertex("User", json!({"username": "alice"}))
            .await
            .unwrap();

        assert_eq!(vertex.label, "User");
        assert_eq!(vertex.str_property("username"), Some("alice"));

        let retrieved = storage.get_vertex(vertex.id).await.unwrap();
        assert_eq!(retrieved, Some(vertex));
    }

    #[tokio::test]
    async fn test_create_edge_and_walk_by_type() {
        let (storage, _temp) = create_test_storage();

        let alice = storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();
        let bob = storage.create_vertex("User", json!({"username": "bob"})).await.unwrap();
        let post = storage.create_vertex("Post", json!({"body": "hi"})).await.unwrap();

        let follows = storage
            .create_edge("FOLLOWS", alice.id, bob.id, json!({}))
            .await
            .unwrap();
        storage
            .create_edge("LIKES", alice.id, post.id, json!({}))
            .await
            .unwrap();

        let out = storage.outgoing_edges(alice.id, "FOLLOWS").await.unwrap();
        assert_eq!(out, vec![follows]);

        let likes = storage.incoming_edges(post.id, "LIKES").await.unwrap();
        assert_eq!(likes.len(), 1);
        assert_eq!(likes[0].start, alice.id);

        assert!(storage.incoming_edges(alice.id, "FOLLOWS").await.unwrap().is_empty());
        assert!(storage.outgoing_edges(alice.id, "POSTED").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_edge_to_missing_vertex_fails() {
        let (storage, _temp) = create_test_storage();

        let alice = storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();
        let ghost = Graphid::new(alice.id.labid(), 99).unwrap();

        let result = storage.create_edge("FOLLOWS", alice.id, ghost, json!({})).await;
        assert!(matches!(result, Err(StorageError::VertexNotFound(_))));
        assert!(storage.outgoing_edges(alice.id, "FOLLOWS").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_scan_keeps_creation_order() {
        let (storage, _temp) = create_test_storage();

        for i in 0..12 {
            storage
                .create_vertex("Post", json!({"body": format!("post {}", i)}))
                .await
                .unwrap();
        }
        storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();

        let posts = storage.scan_vertices("Post").await.unwrap();
        let bodies: Vec<_> = posts.iter().filter_map(|p| p.str_property("body")).collect();
        let expected: Vec<_> = (0..12).map(|i| format!("post {}", i)).collect();
        assert_eq!(bodies, expected);

        assert!(storage.scan_vertices("Comment").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unique_index_rejects_duplicates() {
        let (storage, _temp) = create_test_storage();
        storage.ensure_unique_index("User", "username").await.unwrap();
        storage.ensure_unique_index("User", "username").await.unwrap();

        let alice = storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();
        let result = storage.create_vertex("User", json!({"username": "alice"})).await;
        assert!(matches!(result, Err(StorageError::UniqueViolation { .. })));

        let found = storage.find_vertex("User", "username", "alice").await.unwrap();
        assert_eq!(found.map(|v| v.id), Some(alice.id));
        assert_eq!(storage.scan_vertices("User").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_find_vertex_without_index_scans() {
        let (storage, _temp) = create_test_storage();

        storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();
        let bob = storage.create_vertex("User", json!({"username": "bob"})).await.unwrap();

        let found = storage.find_vertex("User", "username", "bob").await.unwrap();
        assert_eq!(found.map(|v| v.id), Some(bob.id));
        assert!(storage.find_vertex("User", "username", "carol").await.unwrap().is_none());
        assert!(storage.find_vertex("Nobody", "username", "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_index_backfill_detects_existing_duplicates() {
        let (storage, _temp) = create_test_storage();

        storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();
        storage.create_vertex("User", json!({"username": "alice"})).await.unwrap();

        let result = storage.ensure_unique_index("User", "username").await;
        assert!(matches!(result, Err(StorageError::UniqueViolation { .. })));
    }

    #[tokio::test]
    async fn test_reopen_keeps_labels_counters_and_indexes() {
        let temp_dir = TempDir::new().unwrap();

        let alice_id = {
            let storage = RocksDbStorage::new(temp_dir.path(), "test_graph").unwrap();
            storage.ensure_unique_index("User", "username").await.unwrap();
            storage
                .create_vertex("User", json!({"username": "alice"}))
                .await
                .unwrap()
                .id
        };

        let storage = RocksDbStorage::new(temp_dir.path(), "test_graph").unwrap();
        let bob = storage.create_vertex("User", json!({"username": "bob"})).await.unwrap();
        assert_eq!(bob.id.labid(), alice_id.labid());
        assert_eq!(bob.id.locid(), alice_id.locid() + 1);

        let again = storage.create_vertex("User", json!({"username": "alice"})).await;
        assert!(matches!(again, Err(StorageError::UniqueViolation { .. })));
    }
}
