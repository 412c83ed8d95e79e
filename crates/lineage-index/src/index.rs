//! The provenance index handle
//!
//! Operations are split by concern across sibling modules, each adding an
//! `impl` block to [`ProvenanceIndex`].

use crate::config::IndexConfig;
use crate::metrics::IndexMetrics;
use crate::sanitize::HtmlSnippetSanitizer;
use crate::ProvenanceError;
use lineage_domain::mention::props;
use lineage_domain::traits::{GraphStore, SnippetSanitizer, WorkQueue};
use lineage_domain::{Authorizations, Element, ProvenanceRecord, Vertex, VisibilityAlgebra};
use std::sync::{Arc, Mutex};

/// Creates, queries, relabels and retracts provenance records
///
/// Callers pass their own authorizations; every operation widens them with
/// the provenance marker before touching the store.
///
/// # Examples
///
/// ```
/// use lineage_domain::traits::GraphStore;
/// use lineage_domain::{Authorizations, Evidence, MentionFor, Mutation, Visibility};
/// use lineage_graph::MemoryGraph;
/// use lineage_index::{ChannelWorkQueue, IndexConfig, ProvenanceIndex};
/// use std::sync::Arc;
///
/// let graph = Arc::new(MemoryGraph::new());
/// let auths = Authorizations::empty();
/// for id in ["v1", "v2"] {
///     graph.apply(&[Mutation::PutVertex {
///         id: id.to_string(),
///         visibility: Visibility::empty(),
///         properties: vec![],
///     }], &auths).unwrap();
/// }
///
/// let (queue, _events) = ChannelWorkQueue::new();
/// let index = ProvenanceIndex::new(graph, Arc::new(queue), IndexConfig::default()).unwrap();
///
/// let evidence = Evidence::new("v2", "", Some("http://visallo.org#text"), 10, 25)
///     .with_snippet("Acme Corp");
/// index.attach("v1", MentionFor::vertex("v1"), None, &evidence, &Visibility::empty(), &auths)
///     .unwrap();
///
/// assert_eq!(index.for_vertex_justification("v1", &auths).unwrap().len(), 1);
/// ```
pub struct ProvenanceIndex<S, Q> {
    pub(crate) store: Arc<S>,
    pub(crate) queue: Arc<Q>,
    pub(crate) algebra: VisibilityAlgebra,
    pub(crate) config: IndexConfig,
    pub(crate) sanitizer: Box<dyn SnippetSanitizer + Send + Sync>,
    metrics: Mutex<IndexMetrics>,
}

impl<S, Q> ProvenanceIndex<S, Q>
where
    S: GraphStore,
    Q: WorkQueue,
{
    /// Create an index over `store`, publishing downstream events to `queue`
    ///
    /// # Errors
    ///
    /// Returns `ProvenanceError::Config` if the configuration is invalid.
    pub fn new(store: Arc<S>, queue: Arc<Q>, config: IndexConfig) -> Result<Self, ProvenanceError> {
        config
            .validate()
            .map_err(|e| ProvenanceError::Config(e.to_string()))?;
        let sanitizer =
            HtmlSnippetSanitizer::new().map_err(|e| ProvenanceError::Config(e.to_string()))?;

        Ok(Self {
            store,
            queue,
            algebra: VisibilityAlgebra::new(config.marker.clone()),
            config,
            sanitizer: Box::new(sanitizer),
            metrics: Mutex::new(IndexMetrics::new()),
        })
    }

    /// Replace the snippet sanitizer
    pub fn with_sanitizer(mut self, sanitizer: impl SnippetSanitizer + Send + Sync + 'static) -> Self {
        self.sanitizer = Box::new(sanitizer);
        self
    }

    /// The visibility algebra in use
    pub fn algebra(&self) -> &VisibilityAlgebra {
        &self.algebra
    }

    /// The active configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// The underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Snapshot of the operation counters
    pub fn metrics(&self) -> IndexMetrics {
        self.metrics
            .lock()
            .map(|m| m.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub(crate) fn record_metric(&self, update: impl FnOnce(&mut IndexMetrics)) {
        match self.metrics.lock() {
            Ok(mut metrics) => update(&mut metrics),
            Err(poisoned) => update(&mut poisoned.into_inner()),
        }
    }

    pub(crate) fn widen(&self, authorizations: &Authorizations) -> Authorizations {
        self.algebra.widen(authorizations)
    }
}

/// Decode a vertex reached through a provenance edge
///
/// Vertices that are not records yield `None`; records that fail to decode
/// are corrupt.
pub(crate) fn decode(vertex: &Vertex) -> Result<Option<ProvenanceRecord>, ProvenanceError> {
    if vertex.property(props::FOR_TYPE).is_none() {
        return Ok(None);
    }
    ProvenanceRecord::from_vertex(vertex)
        .map(Some)
        .map_err(ProvenanceError::FatalData)
}

/// The only element of `items`
///
/// # Errors
///
/// Returns `FatalData` if there is more than one.
pub(crate) fn at_most_one<T>(mut items: Vec<T>, what: &str) -> Result<Option<T>, ProvenanceError> {
    match items.len() {
        0 | 1 => Ok(items.pop()),
        n => Err(ProvenanceError::FatalData(format!(
            "Expected at most one {}, found {}",
            what, n
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_at_most_one() {
        assert_eq!(at_most_one(Vec::<u8>::new(), "x").unwrap(), None);
        assert_eq!(at_most_one(vec![1], "x").unwrap(), Some(1));
        assert!(matches!(
            at_most_one(vec![1, 2], "record"),
            Err(ProvenanceError::FatalData(msg)) if msg.contains("record")
        ));
    }

    #[test]
    fn test_decode_skips_plain_vertices() {
        let vertex = Vertex {
            id: "plain".to_string(),
            visibility: Default::default(),
            properties: vec![],
        };
        assert!(decode(&vertex).unwrap().is_none());
    }
}
