//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the provenance index and the
//! systems it collaborates with. Implementations live in other crates.

use crate::element::{Direction, Edge, Mutation, Vertex};
use crate::notification::GraphPropertyEvent;
use crate::visibility::Authorizations;

/// Trait for reading and writing the property graph
///
/// Implemented by the infrastructure layer (lineage-graph). Every read is
/// filtered by `authorizations`: elements and properties whose visibility
/// cannot be read, soft-deleted elements, and elements hidden from the caller
/// are all absent from results.
pub trait GraphStore {
    /// Error type for store operations
    type Error: std::fmt::Display;

    /// Get a vertex by id
    fn get_vertex(
        &self,
        id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Vertex>, Self::Error>;

    /// Get an edge by id
    fn get_edge(&self, id: &str, authorizations: &Authorizations)
        -> Result<Option<Edge>, Self::Error>;

    /// Get every readable edge among `ids`, skipping missing ones
    fn get_edges(
        &self,
        ids: &[String],
        authorizations: &Authorizations,
    ) -> Result<Vec<Edge>, Self::Error> {
        let mut edges = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(edge) = self.get_edge(id, authorizations)? {
                edges.push(edge);
            }
        }
        Ok(edges)
    }

    /// Edges attached to a vertex in insertion order
    ///
    /// An empty `labels` slice matches every label.
    fn edges(
        &self,
        vertex_id: &str,
        direction: Direction,
        labels: &[&str],
        authorizations: &Authorizations,
    ) -> Result<Vec<Edge>, Self::Error>;

    /// Ids of the vertices across the matching edges, in edge order
    fn traverse(
        &self,
        vertex_id: &str,
        direction: Direction,
        labels: &[&str],
        authorizations: &Authorizations,
    ) -> Result<Vec<String>, Self::Error> {
        Ok(self
            .edges(vertex_id, direction, labels, authorizations)?
            .iter()
            .map(|edge| edge.other_vertex_id(vertex_id).to_string())
            .collect())
    }

    /// Apply a batch of mutations atomically
    ///
    /// Every mutation is checked against the state before the batch; if any
    /// check fails nothing is written.
    fn apply(
        &self,
        mutations: &[Mutation],
        authorizations: &Authorizations,
    ) -> Result<(), Self::Error>;

    /// Make all applied mutations durable and visible to later reads
    fn flush(&self) -> Result<(), Self::Error>;
}

/// Trait for publishing downstream re-index notifications
///
/// Fire-and-forget from the caller's perspective: retries, if any, are the
/// queue's business.
pub trait WorkQueue {
    /// Error type for publish failures
    type Error: std::fmt::Display;

    /// Enqueue one event
    fn publish(&self, event: GraphPropertyEvent) -> Result<(), Self::Error>;
}

/// Trait for cleaning evidence snippets before they leave the index
pub trait SnippetSanitizer {
    /// Return a display-safe version of `snippet`
    fn sanitize(&self, snippet: &str) -> String;
}
