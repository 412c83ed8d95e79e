//! Graph element model shared by every store backend
//!
//! Vertices and edges carry a visibility and a list of properties; each
//! property has its own visibility. Writes are expressed as [`Mutation`]s and
//! applied in batches by a [`crate::traits::GraphStore`].

use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Edge direction relative to a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges leaving the vertex
    Out,

    /// Edges entering the vertex
    In,

    /// Either direction
    Both,
}

impl Direction {
    /// Whether an edge with the given endpoints matches this direction for `vertex_id`
    pub fn matches(&self, vertex_id: &str, edge: &Edge) -> bool {
        match self {
            Direction::Out => edge.out_vertex_id == vertex_id,
            Direction::In => edge.in_vertex_id == vertex_id,
            Direction::Both => edge.out_vertex_id == vertex_id || edge.in_vertex_id == vertex_id,
        }
    }
}

/// Reference to a vertex or an edge by id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    /// A vertex id
    Vertex(String),

    /// An edge id
    Edge(String),
}

impl ElementRef {
    /// The referenced id
    pub fn id(&self) -> &str {
        match self {
            ElementRef::Vertex(id) | ElementRef::Edge(id) => id,
        }
    }

    /// Short kind name, used as a storage discriminant
    pub fn kind(&self) -> &'static str {
        match self {
            ElementRef::Vertex(_) => "vertex",
            ElementRef::Edge(_) => "edge",
        }
    }
}

/// A single property instance
///
/// Properties are identified within their element by `(key, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Property key (distinguishes multiple values of one name)
    pub key: String,

    /// Property name
    pub name: String,

    /// Property value
    pub value: Value,

    /// Visibility of this property instance
    pub visibility: Visibility,
}

impl Property {
    /// Create a property
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<Value>,
        visibility: Visibility,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            value: value.into(),
            visibility,
        }
    }
}

/// Common read access for vertices and edges
pub trait Element {
    /// Element id
    fn id(&self) -> &str;

    /// Element-level visibility
    fn visibility(&self) -> &Visibility;

    /// Properties readable by the caller that loaded this element
    fn properties(&self) -> &[Property];

    /// First property with the given name
    fn property(&self, name: &str) -> Option<&Property> {
        self.properties().iter().find(|p| p.name == name)
    }

    /// String value of the first property with the given name
    fn str_value(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(|p| p.value.as_str())
    }

    /// Integer value of the first property with the given name
    fn i64_value(&self, name: &str) -> Option<i64> {
        self.property(name).and_then(|p| p.value.as_i64())
    }
}

/// A graph vertex as seen through a set of authorizations
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    /// Vertex id
    pub id: String,

    /// Element visibility
    pub visibility: Visibility,

    /// Readable properties
    pub properties: Vec<Property>,
}

impl Element for Vertex {
    fn id(&self) -> &str {
        &self.id
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// A directed, labelled graph edge as seen through a set of authorizations
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Edge id
    pub id: String,

    /// Edge label
    pub label: String,

    /// Tail vertex
    pub out_vertex_id: String,

    /// Head vertex
    pub in_vertex_id: String,

    /// Element visibility
    pub visibility: Visibility,

    /// Readable properties
    pub properties: Vec<Property>,
}

impl Edge {
    /// Endpoint on the given side; `Both` is treated as `In`
    pub fn vertex_id(&self, direction: Direction) -> &str {
        match direction {
            Direction::Out => &self.out_vertex_id,
            Direction::In | Direction::Both => &self.in_vertex_id,
        }
    }

    /// The endpoint opposite `vertex_id`
    pub fn other_vertex_id(&self, vertex_id: &str) -> &str {
        if self.out_vertex_id == vertex_id {
            &self.in_vertex_id
        } else {
            &self.out_vertex_id
        }
    }
}

impl Element for Edge {
    fn id(&self) -> &str {
        &self.id
    }

    fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    fn properties(&self) -> &[Property] {
        &self.properties
    }
}

/// A single write against the graph
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Create or overwrite a vertex, clearing any tombstone
    PutVertex {
        /// Vertex id
        id: String,
        /// Element visibility
        visibility: Visibility,
        /// Full property list
        properties: Vec<Property>,
    },

    /// Create or overwrite an edge, clearing any tombstone
    PutEdge {
        /// Edge id
        id: String,
        /// Edge label
        label: String,
        /// Tail vertex
        out_vertex_id: String,
        /// Head vertex
        in_vertex_id: String,
        /// Element visibility
        visibility: Visibility,
        /// Full property list
        properties: Vec<Property>,
    },

    /// Change an element's own visibility
    AlterVisibility {
        /// Target element
        element: ElementRef,
        /// New visibility
        visibility: Visibility,
    },

    /// Change the visibility of one property instance
    AlterPropertyVisibility {
        /// Target element
        element: ElementRef,
        /// Property key
        key: String,
        /// Property name
        name: String,
        /// New visibility
        visibility: Visibility,
    },

    /// Set (insert or replace) one property
    SetProperty {
        /// Target element
        element: ElementRef,
        /// The property
        property: Property,
    },

    /// Remove one property; removing an absent property is a no-op
    RemoveProperty {
        /// Target element
        element: ElementRef,
        /// Property key
        key: String,
        /// Property name
        name: String,
    },

    /// Tombstone an element (vertices also tombstone their edges)
    SoftDelete(ElementRef),

    /// Hide an element from callers who can read `visibility`
    MarkHidden {
        /// Target element
        element: ElementRef,
        /// Visibility scoping the hide
        visibility: Visibility,
    },
}

impl Mutation {
    /// The element this mutation writes to
    pub fn target(&self) -> ElementRef {
        match self {
            Mutation::PutVertex { id, .. } => ElementRef::Vertex(id.clone()),
            Mutation::PutEdge { id, .. } => ElementRef::Edge(id.clone()),
            Mutation::AlterVisibility { element, .. }
            | Mutation::AlterPropertyVisibility { element, .. }
            | Mutation::SetProperty { element, .. }
            | Mutation::RemoveProperty { element, .. }
            | Mutation::MarkHidden { element, .. }
            | Mutation::SoftDelete(element) => element.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> Edge {
        Edge {
            id: "e1".to_string(),
            label: "knows".to_string(),
            out_vertex_id: "a".to_string(),
            in_vertex_id: "b".to_string(),
            visibility: Visibility::empty(),
            properties: vec![Property::new("", "weight", 3, Visibility::empty())],
        }
    }

    #[test]
    fn test_direction_matches() {
        let e = edge();
        assert!(Direction::Out.matches("a", &e));
        assert!(!Direction::Out.matches("b", &e));
        assert!(Direction::In.matches("b", &e));
        assert!(Direction::Both.matches("a", &e));
        assert!(Direction::Both.matches("b", &e));
        assert!(!Direction::Both.matches("c", &e));
    }

    #[test]
    fn test_edge_endpoints() {
        let e = edge();
        assert_eq!(e.vertex_id(Direction::In), "b");
        assert_eq!(e.vertex_id(Direction::Out), "a");
        assert_eq!(e.other_vertex_id("a"), "b");
        assert_eq!(e.other_vertex_id("b"), "a");
    }

    #[test]
    fn test_property_accessors() {
        let e = edge();
        assert_eq!(e.i64_value("weight"), Some(3));
        assert_eq!(e.str_value("weight"), None);
        assert!(e.property("missing").is_none());
    }

    #[test]
    fn test_mutation_target() {
        let m = Mutation::SoftDelete(ElementRef::Vertex("v1".to_string()));
        assert_eq!(m.target(), ElementRef::Vertex("v1".to_string()));
        assert_eq!(m.target().kind(), "vertex");
    }
}
