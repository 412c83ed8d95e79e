//! Shared fixtures for index integration tests

#![allow(dead_code)]

use lineage_domain::traits::{GraphStore, WorkQueue};
use lineage_domain::{
    Authorizations, Direction, Edge, ElementRef, Evidence, GraphPropertyEvent, Mutation, Property,
    Vertex, Visibility,
};
use lineage_graph::MemoryGraph;
use lineage_index::{ChannelWorkQueue, IndexConfig, ProvenanceIndex};
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

pub const TEXT: &str = "http://visallo.org#text";

pub type MemoryIndex = ProvenanceIndex<MemoryGraph, ChannelWorkQueue>;

/// A queue whose consumer is gone
pub struct FailingQueue;

impl WorkQueue for FailingQueue {
    type Error = String;

    fn publish(&self, event: GraphPropertyEvent) -> Result<(), Self::Error> {
        Err(format!("queue unavailable for {}", event.element_id))
    }
}

/// A graph that refuses any batch re-labelling an edge
///
/// Other batches go straight to the wrapped graph.
pub struct EdgeLockedGraph(pub MemoryGraph);

impl GraphStore for EdgeLockedGraph {
    type Error = String;

    fn get_vertex(&self, id: &str, auths: &Authorizations) -> Result<Option<Vertex>, String> {
        self.0.get_vertex(id, auths).map_err(|e| e.to_string())
    }

    fn get_edge(&self, id: &str, auths: &Authorizations) -> Result<Option<Edge>, String> {
        self.0.get_edge(id, auths).map_err(|e| e.to_string())
    }

    fn edges(
        &self,
        vertex_id: &str,
        direction: Direction,
        labels: &[&str],
        auths: &Authorizations,
    ) -> Result<Vec<Edge>, String> {
        self.0
            .edges(vertex_id, direction, labels, auths)
            .map_err(|e| e.to_string())
    }

    fn apply(&self, mutations: &[Mutation], auths: &Authorizations) -> Result<(), String> {
        let touches_edge = mutations.iter().any(|m| {
            matches!(
                m,
                Mutation::AlterVisibility {
                    element: ElementRef::Edge(_),
                    ..
                }
            )
        });
        if touches_edge {
            return Err("edge visibility is locked".to_string());
        }
        self.0.apply(mutations, auths).map_err(|e| e.to_string())
    }

    fn flush(&self) -> Result<(), String> {
        self.0.flush().map_err(|e| e.to_string())
    }
}

pub fn put_vertex(id: &str) -> Mutation {
    Mutation::PutVertex {
        id: id.to_string(),
        visibility: Visibility::empty(),
        properties: vec![Property::new("", TEXT, "Acme Corp makes anvils", Visibility::empty())],
    }
}

pub fn seed<S: GraphStore>(store: &S, ids: &[&str])
where
    S::Error: Debug,
{
    let batch: Vec<Mutation> = ids.iter().map(|id| put_vertex(id)).collect();
    store.apply(&batch, &Authorizations::empty()).unwrap();
}

pub fn memory_index(
    ids: &[&str],
) -> (MemoryIndex, Arc<MemoryGraph>, UnboundedReceiver<GraphPropertyEvent>) {
    let graph = Arc::new(MemoryGraph::new());
    seed(graph.as_ref(), ids);
    let (queue, events) = ChannelWorkQueue::new();
    let index = ProvenanceIndex::new(graph.clone(), Arc::new(queue), IndexConfig::default()).unwrap();
    (index, graph, events)
}

pub fn acme(source: &str) -> Evidence {
    Evidence::new(source, "", Some(TEXT), 10, 25).with_snippet("Acme Corp")
}

pub fn no_auths() -> Authorizations {
    Authorizations::empty()
}
