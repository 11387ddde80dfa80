/// switter graph store
///
/// An embedded property graph used as the database behind the switter feed.
///
/// # Architecture
///
/// ```text
/// ┌──────────────────────────────────────────────────┐
/// │           switter-graph                          │
/// ├──────────────────────────────────────────────────┤
/// │  ┌────────────────────────────────┐              │
/// │  │   GraphStorage (async trait)   │              │
/// │  └────────────┬───────────────────┘              │
/// │               ↓                                   │
/// │  ┌────────────────────────────────┐              │
/// │  │   Storage Engine (RocksDB)     │              │
/// │  └────────────────────────────────┘              │
/// └──────────────────────────────────────────────────┘
/// ```
///
/// # Modules
///
/// - `types`: Core data types (Graphid, Vertex, Edge)
/// - `storage`: Storage abstraction and the RocksDB implementation

pub mod storage;
pub mod types;

// Re-export commonly used types
pub use types::{Edge, Graphid, GraphidError, Vertex};

// Re-export storage types
pub use storage::{GraphStorage, SharedStorage, StorageError, StorageResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
