//! Batch validation shared by every backend
//!
//! A batch is checked in full against the state before it, then written.
//! Elements created earlier in the same batch count as present.

use crate::GraphError;
use lineage_domain::{Authorizations, ElementRef, Mutation, Property, Visibility};
use std::collections::HashSet;

/// Looks up whether an element exists and is readable
pub(crate) trait ElementLookup {
    fn is_readable(
        &self,
        element: &ElementRef,
        authorizations: &Authorizations,
    ) -> Result<bool, GraphError>;
}

/// Validate every mutation before any is written
pub(crate) fn check_batch<L: ElementLookup>(
    lookup: &L,
    mutations: &[Mutation],
    authorizations: &Authorizations,
) -> Result<(), GraphError> {
    let mut created: HashSet<ElementRef> = HashSet::new();

    for mutation in mutations {
        match mutation {
            Mutation::PutVertex {
                id,
                visibility,
                properties,
            } => {
                check_labels(visibility, properties)?;
                created.insert(ElementRef::Vertex(id.clone()));
            }
            Mutation::PutEdge {
                id,
                out_vertex_id,
                in_vertex_id,
                visibility,
                properties,
                ..
            } => {
                check_labels(visibility, properties)?;
                for endpoint in [out_vertex_id, in_vertex_id] {
                    let vertex = ElementRef::Vertex(endpoint.clone());
                    require(lookup, &created, &vertex, authorizations)?;
                }
                created.insert(ElementRef::Edge(id.clone()));
            }
            Mutation::AlterVisibility {
                element,
                visibility,
            }
            | Mutation::AlterPropertyVisibility {
                element,
                visibility,
                ..
            }
            | Mutation::MarkHidden {
                element,
                visibility,
            } => {
                check_label(visibility)?;
                require(lookup, &created, element, authorizations)?;
            }
            Mutation::SetProperty { element, property } => {
                check_label(&property.visibility)?;
                require(lookup, &created, element, authorizations)?;
            }
            Mutation::RemoveProperty { element, .. } | Mutation::SoftDelete(element) => {
                require(lookup, &created, element, authorizations)?;
            }
        }
    }
    Ok(())
}

fn require<L: ElementLookup>(
    lookup: &L,
    created: &HashSet<ElementRef>,
    element: &ElementRef,
    authorizations: &Authorizations,
) -> Result<(), GraphError> {
    if created.contains(element) || lookup.is_readable(element, authorizations)? {
        Ok(())
    } else {
        Err(GraphError::NotFound(format!(
            "{} {}",
            element.kind(),
            element.id()
        )))
    }
}

fn check_labels(visibility: &Visibility, properties: &[Property]) -> Result<(), GraphError> {
    check_label(visibility)?;
    properties
        .iter()
        .try_for_each(|property| check_label(&property.visibility))
}

fn check_label(visibility: &Visibility) -> Result<(), GraphError> {
    visibility
        .validate()
        .map_err(|e| GraphError::InvalidData(format!("Visibility '{}': {}", visibility, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OnlyVertex(&'static str);

    impl ElementLookup for OnlyVertex {
        fn is_readable(
            &self,
            element: &ElementRef,
            _authorizations: &Authorizations,
        ) -> Result<bool, GraphError> {
            Ok(*element == ElementRef::Vertex(self.0.to_string()))
        }
    }

    fn put_edge(out: &str, into: &str) -> Mutation {
        Mutation::PutEdge {
            id: format!("{out}->{into}"),
            label: "l".to_string(),
            out_vertex_id: out.to_string(),
            in_vertex_id: into.to_string(),
            visibility: Visibility::empty(),
            properties: vec![],
        }
    }

    #[test]
    fn test_edge_to_vertex_created_in_batch() {
        let batch = vec![
            Mutation::PutVertex {
                id: "new".to_string(),
                visibility: Visibility::empty(),
                properties: vec![],
            },
            put_edge("a", "new"),
        ];
        assert!(check_batch(&OnlyVertex("a"), &batch, &Authorizations::empty()).is_ok());
    }

    #[test]
    fn test_edge_to_missing_vertex_rejected() {
        let err = check_batch(&OnlyVertex("a"), &[put_edge("a", "b")], &Authorizations::empty())
            .unwrap_err();
        assert!(matches!(err, GraphError::NotFound(_)));
    }

    #[test]
    fn test_malformed_visibility_rejected() {
        let batch = vec![Mutation::AlterVisibility {
            element: ElementRef::Vertex("a".to_string()),
            visibility: Visibility::new("a&"),
        }];
        let err = check_batch(&OnlyVertex("a"), &batch, &Authorizations::empty()).unwrap_err();
        assert!(matches!(err, GraphError::InvalidData(_)));
    }
}
