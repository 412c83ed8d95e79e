//! In-memory graph backend

use crate::access::{is_readable, readable_properties};
use crate::batch::{check_batch, ElementLookup};
use crate::GraphError;
use lineage_domain::traits::GraphStore;
use lineage_domain::{
    Authorizations, Direction, Edge, ElementRef, Mutation, Property, Vertex, Visibility,
};
use std::collections::HashMap;
use std::sync::RwLock;

#[derive(Debug, Clone)]
struct StoredVertex {
    visibility: Visibility,
    properties: Vec<Property>,
    deleted: bool,
    hidden: Vec<Visibility>,
}

#[derive(Debug, Clone)]
struct StoredEdge {
    label: String,
    out_vertex_id: String,
    in_vertex_id: String,
    visibility: Visibility,
    properties: Vec<Property>,
    deleted: bool,
    hidden: Vec<Visibility>,
}

#[derive(Debug, Default)]
struct GraphState {
    vertices: HashMap<String, StoredVertex>,
    edges: HashMap<String, StoredEdge>,
    /// Edge ids per vertex, in insertion order
    adjacency: HashMap<String, Vec<String>>,
}

/// In-memory implementation of [`GraphStore`]
///
/// All state sits behind one `RwLock`; a batch holds the write lock for its
/// whole validate-then-write cycle, so batches are atomic with respect to
/// each other.
///
/// # Examples
///
/// ```
/// use lineage_domain::traits::GraphStore;
/// use lineage_domain::{Authorizations, Mutation, Visibility};
/// use lineage_graph::MemoryGraph;
///
/// let graph = MemoryGraph::new();
/// graph.apply(&[Mutation::PutVertex {
///     id: "v1".to_string(),
///     visibility: Visibility::empty(),
///     properties: vec![],
/// }], &Authorizations::empty()).unwrap();
///
/// assert!(graph.get_vertex("v1", &Authorizations::empty()).unwrap().is_some());
/// ```
#[derive(Debug, Default)]
pub struct MemoryGraph {
    state: RwLock<GraphState>,
}

impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an element exists with a tombstone
    ///
    /// Ignores authorizations; meant for tests and diagnostics.
    pub fn is_soft_deleted(&self, element: &ElementRef) -> Result<bool, GraphError> {
        let state = self.state.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(match element {
            ElementRef::Vertex(id) => state.vertices.get(id).is_some_and(|v| v.deleted),
            ElementRef::Edge(id) => state.edges.get(id).is_some_and(|e| e.deleted),
        })
    }
}

impl ElementLookup for GraphState {
    fn is_readable(
        &self,
        element: &ElementRef,
        authorizations: &Authorizations,
    ) -> Result<bool, GraphError> {
        Ok(match element {
            ElementRef::Vertex(id) => self.vertices.get(id).is_some_and(|v| {
                is_readable(&v.visibility, &v.hidden, v.deleted, authorizations)
            }),
            ElementRef::Edge(id) => self.edges.get(id).is_some_and(|e| {
                is_readable(&e.visibility, &e.hidden, e.deleted, authorizations)
            }),
        })
    }
}

impl GraphState {
    fn vertex(&self, id: &str, authorizations: &Authorizations) -> Option<Vertex> {
        let stored = self.vertices.get(id)?;
        if !is_readable(&stored.visibility, &stored.hidden, stored.deleted, authorizations) {
            return None;
        }
        Some(Vertex {
            id: id.to_string(),
            visibility: stored.visibility.clone(),
            properties: readable_properties(&stored.properties, authorizations),
        })
    }

    fn edge(&self, id: &str, authorizations: &Authorizations) -> Option<Edge> {
        let stored = self.edges.get(id)?;
        if !is_readable(&stored.visibility, &stored.hidden, stored.deleted, authorizations) {
            return None;
        }
        Some(Edge {
            id: id.to_string(),
            label: stored.label.clone(),
            out_vertex_id: stored.out_vertex_id.clone(),
            in_vertex_id: stored.in_vertex_id.clone(),
            visibility: stored.visibility.clone(),
            properties: readable_properties(&stored.properties, authorizations),
        })
    }

    fn properties_mut(&mut self, element: &ElementRef) -> Option<&mut Vec<Property>> {
        match element {
            ElementRef::Vertex(id) => self.vertices.get_mut(id).map(|v| &mut v.properties),
            ElementRef::Edge(id) => self.edges.get_mut(id).map(|e| &mut e.properties),
        }
    }

    fn link(&mut self, vertex_id: &str, edge_id: &str) {
        let edges = self.adjacency.entry(vertex_id.to_string()).or_default();
        if !edges.iter().any(|e| e == edge_id) {
            edges.push(edge_id.to_string());
        }
    }

    fn unlink(&mut self, vertex_id: &str, edge_id: &str) {
        if let Some(edges) = self.adjacency.get_mut(vertex_id) {
            edges.retain(|e| e != edge_id);
        }
    }

    fn write(&mut self, mutation: &Mutation) {
        match mutation {
            Mutation::PutVertex {
                id,
                visibility,
                properties,
            } => {
                let hidden = self
                    .vertices
                    .get(id)
                    .map(|v| v.hidden.clone())
                    .unwrap_or_default();
                self.vertices.insert(
                    id.clone(),
                    StoredVertex {
                        visibility: visibility.clone(),
                        properties: properties.clone(),
                        deleted: false,
                        hidden,
                    },
                );
            }
            Mutation::PutEdge {
                id,
                label,
                out_vertex_id,
                in_vertex_id,
                visibility,
                properties,
            } => {
                let previous = self.edges.get(id).cloned();
                if let Some(previous) = &previous {
                    if previous.out_vertex_id != *out_vertex_id {
                        self.unlink(&previous.out_vertex_id, id);
                    }
                    if previous.in_vertex_id != *in_vertex_id {
                        self.unlink(&previous.in_vertex_id, id);
                    }
                }
                self.edges.insert(
                    id.clone(),
                    StoredEdge {
                        label: label.clone(),
                        out_vertex_id: out_vertex_id.clone(),
                        in_vertex_id: in_vertex_id.clone(),
                        visibility: visibility.clone(),
                        properties: properties.clone(),
                        deleted: false,
                        hidden: previous.map(|e| e.hidden).unwrap_or_default(),
                    },
                );
                self.link(out_vertex_id, id);
                self.link(in_vertex_id, id);
            }
            Mutation::AlterVisibility {
                element,
                visibility,
            } => match element {
                ElementRef::Vertex(id) => {
                    if let Some(v) = self.vertices.get_mut(id) {
                        v.visibility = visibility.clone();
                    }
                }
                ElementRef::Edge(id) => {
                    if let Some(e) = self.edges.get_mut(id) {
                        e.visibility = visibility.clone();
                    }
                }
            },
            Mutation::AlterPropertyVisibility {
                element,
                key,
                name,
                visibility,
            } => {
                if let Some(properties) = self.properties_mut(element) {
                    for p in properties.iter_mut() {
                        if p.key == *key && p.name == *name {
                            p.visibility = visibility.clone();
                        }
                    }
                }
            }
            Mutation::SetProperty { element, property } => {
                if let Some(properties) = self.properties_mut(element) {
                    match properties
                        .iter_mut()
                        .find(|p| p.key == property.key && p.name == property.name)
                    {
                        Some(existing) => *existing = property.clone(),
                        None => properties.push(property.clone()),
                    }
                }
            }
            Mutation::RemoveProperty { element, key, name } => {
                if let Some(properties) = self.properties_mut(element) {
                    properties.retain(|p| !(p.key == *key && p.name == *name));
                }
            }
            Mutation::SoftDelete(element) => match element {
                ElementRef::Vertex(id) => {
                    if let Some(v) = self.vertices.get_mut(id) {
                        v.deleted = true;
                    }
                    let edge_ids = self.adjacency.get(id).cloned().unwrap_or_default();
                    for edge_id in edge_ids {
                        if let Some(e) = self.edges.get_mut(&edge_id) {
                            e.deleted = true;
                        }
                    }
                }
                ElementRef::Edge(id) => {
                    if let Some(e) = self.edges.get_mut(id) {
                        e.deleted = true;
                    }
                }
            },
            Mutation::MarkHidden {
                element,
                visibility,
            } => {
                let hidden = match element {
                    ElementRef::Vertex(id) => self.vertices.get_mut(id).map(|v| &mut v.hidden),
                    ElementRef::Edge(id) => self.edges.get_mut(id).map(|e| &mut e.hidden),
                };
                if let Some(hidden) = hidden {
                    if !hidden.contains(visibility) {
                        hidden.push(visibility.clone());
                    }
                }
            }
        }
    }
}

impl GraphStore for MemoryGraph {
    type Error = GraphError;

    fn get_vertex(
        &self,
        id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Vertex>, Self::Error> {
        let state = self.state.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(state.vertex(id, authorizations))
    }

    fn get_edge(
        &self,
        id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<Edge>, Self::Error> {
        let state = self.state.read().map_err(|_| GraphError::LockPoisoned)?;
        Ok(state.edge(id, authorizations))
    }

    fn edges(
        &self,
        vertex_id: &str,
        direction: Direction,
        labels: &[&str],
        authorizations: &Authorizations,
    ) -> Result<Vec<Edge>, Self::Error> {
        let state = self.state.read().map_err(|_| GraphError::LockPoisoned)?;
        if state.vertex(vertex_id, authorizations).is_none() {
            return Ok(Vec::new());
        }
        let Some(edge_ids) = state.adjacency.get(vertex_id) else {
            return Ok(Vec::new());
        };

        Ok(edge_ids
            .iter()
            .filter_map(|id| state.edge(id, authorizations))
            .filter(|edge| direction.matches(vertex_id, edge))
            .filter(|edge| labels.is_empty() || labels.contains(&edge.label.as_str()))
            .collect())
    }

    fn apply(
        &self,
        mutations: &[Mutation],
        authorizations: &Authorizations,
    ) -> Result<(), Self::Error> {
        let mut state = self.state.write().map_err(|_| GraphError::LockPoisoned)?;
        check_batch(&*state, mutations, authorizations)?;
        for mutation in mutations {
            state.write(mutation);
        }
        tracing::trace!("applied {} mutations", mutations.len());
        Ok(())
    }

    fn flush(&self) -> Result<(), Self::Error> {
        // Writes land under the lock in `apply`; there is nothing buffered.
        Ok(())
    }
}
