//! Propagating a vertex's new visibility source to the edges it justified

use crate::{ProvenanceError, ProvenanceIndex};
use lineage_domain::traits::{GraphStore, WorkQueue};
use lineage_domain::workspace::VISIBILITY_JSON_PROPERTY;
use lineage_domain::{
    Authorizations, ElementRef, GraphPropertyEvent, Mutation, Property, SandboxStatus, Visibility,
    VisibilityJson,
};

impl<S, Q> ProvenanceIndex<S, Q>
where
    S: GraphStore,
    Q: WorkQueue,
{
    /// Rewrite the visibility source of every edge justified through
    /// `target_vertex_id`
    ///
    /// Edges sandboxed to `workspace_id` stay sandboxed to it; public edges
    /// get the new source with no workspace. All edges are written in one
    /// batch, then one event per edge is published. Publish failures are
    /// logged and counted, never returned.
    ///
    /// Returns the ids of the rewritten edges.
    pub fn relabel_downstream_edges(
        &self,
        target_vertex_id: &str,
        new_visibility_source: &str,
        workspace_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<String>, ProvenanceError> {
        Visibility::new(new_visibility_source)
            .validate()
            .map_err(ProvenanceError::Validation)?;

        let mut edge_ids: Vec<String> = Vec::new();
        for record in self.for_vertex_justification(target_vertex_id, authorizations)? {
            if let Some(edge_id) = record.resolved_edge_id {
                if !edge_ids.contains(&edge_id) {
                    edge_ids.push(edge_id);
                }
            }
        }
        let edges = self
            .store
            .get_edges(&edge_ids, authorizations)
            .map_err(ProvenanceError::store)?;

        let mut batch = Vec::with_capacity(edges.len() * 2);
        let mut changes = Vec::with_capacity(edges.len());
        for edge in &edges {
            let current = VisibilityJson::from_element(edge)
                .map_err(ProvenanceError::FatalData)?
                .unwrap_or_default();
            let scope = match current.sandbox_status(workspace_id) {
                SandboxStatus::Private => Some(workspace_id),
                SandboxStatus::Public => None,
            };
            let updated = VisibilityJson::with_source_and_workspace(new_visibility_source, scope);

            let element = ElementRef::Edge(edge.id.clone());
            batch.push(Mutation::AlterVisibility {
                element: element.clone(),
                visibility: updated.to_visibility(),
            });
            batch.push(Mutation::SetProperty {
                element,
                property: Property::new(
                    "",
                    VISIBILITY_JSON_PROPERTY,
                    updated.to_value().map_err(|e| ProvenanceError::FatalData(e.to_string()))?,
                    Visibility::empty(),
                ),
            });
            changes.push(edge.id.clone());
        }

        if batch.is_empty() {
            return Ok(changes);
        }
        self.commit(&batch, authorizations)?;
        self.record_metric(|m| m.record_downstream(changes.len()));
        tracing::info!(
            "Relabelled {} downstream edges of {} in workspace {}",
            changes.len(),
            target_vertex_id,
            workspace_id
        );

        for edge_id in &changes {
            let event = GraphPropertyEvent {
                element_id: edge_id.clone(),
                property_key: None,
                property_name: VISIBILITY_JSON_PROPERTY.to_string(),
                workspace_id: Some(workspace_id.to_string()),
                visibility_source: Some(new_visibility_source.to_string()),
                priority: self.config.notification_priority,
            };
            let delivered = match self.queue.publish(event) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Failed to publish visibility change for {}: {}", edge_id, e);
                    false
                }
            };
            self.record_metric(|m| m.record_notification(delivered));
        }

        Ok(changes)
    }
}
