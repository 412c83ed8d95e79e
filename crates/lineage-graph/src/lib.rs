//! Lineage Graph Layer
//!
//! Implements the [`GraphStore`](lineage_domain::traits::GraphStore) trait
//! twice:
//!
//! - [`MemoryGraph`]: in-memory, `RwLock`-guarded; the fake used by tests
//! - [`SqliteGraph`]: persistent, one SQLite transaction per batch
//!
//! Both backends share the same read filtering (visibility, tombstones,
//! hidden marks) and the same batch validation, so the provenance index
//! behaves identically on either.
//!
//! # Examples
//!
//! ```no_run
//! use lineage_graph::SqliteGraph;
//!
//! let graph = SqliteGraph::new(":memory:").unwrap();
//! // Graph is now ready for provenance operations
//! ```

#![warn(missing_docs)]

mod access;
mod batch;
mod error;
mod memory;
mod sqlite;

pub use error::GraphError;
pub use memory::MemoryGraph;
pub use sqlite::SqliteGraph;
