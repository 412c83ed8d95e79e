//! Projecting records into external-facing [`SourceInfo`]

use crate::index::at_most_one;
use crate::predicate::{Direct, RecordPredicate};
use crate::{ProvenanceError, ProvenanceIndex};
use lineage_domain::traits::{GraphStore, WorkQueue};
use lineage_domain::{Authorizations, Edge, ProvenanceRecord, SourceInfo, Visibility};

impl<S, Q> ProvenanceIndex<S, Q>
where
    S: GraphStore,
    Q: WorkQueue,
{
    /// Describe where `record`'s evidence lives, with a sanitized snippet
    ///
    /// # Errors
    ///
    /// Returns `FatalData` if the record's source cannot be resolved to
    /// exactly one vertex.
    pub fn project(
        &self,
        record: Option<&ProvenanceRecord>,
        authorizations: &Authorizations,
    ) -> Result<Option<SourceInfo>, ProvenanceError> {
        let Some(record) = record else {
            return Ok(None);
        };
        let source_element_id = self.resolve_source_element(record, authorizations)?;
        Ok(Some(SourceInfo {
            source_element_id,
            text_property_key: record.text_property_key.clone(),
            text_property_name: record.text_property_name.clone(),
            start_offset: record.start_offset,
            end_offset: record.end_offset,
            snippet: record.snippet.as_deref().map(|s| self.sanitizer.sanitize(s)),
        }))
    }

    fn project_single(
        &self,
        records: Vec<ProvenanceRecord>,
        what: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<SourceInfo>, ProvenanceError> {
        let record = at_most_one(records, what)?;
        self.project(record.as_ref(), authorizations)
    }

    /// Source info justifying the vertex `vertex_id`
    ///
    /// Records attached through an edge are not the vertex's own
    /// justification and are skipped.
    pub fn source_info_for_vertex(
        &self,
        vertex_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<SourceInfo>, ProvenanceError> {
        let records: Vec<_> = self
            .for_vertex_justification(vertex_id, authorizations)?
            .into_iter()
            .filter(|r| Direct.matches(r))
            .collect();
        self.project_single(records, &format!("justification of vertex {}", vertex_id), authorizations)
    }

    /// Source info justifying `edge`
    pub fn source_info_for_edge(
        &self,
        edge: &Edge,
        authorizations: &Authorizations,
    ) -> Result<Option<SourceInfo>, ProvenanceError> {
        let records = self.for_edge_justification(edge, authorizations)?;
        self.project_single(records, &format!("justification of edge {}", edge.id), authorizations)
    }

    /// Source info justifying one property instance of `vertex_id`
    pub fn source_info_for_vertex_property(
        &self,
        vertex_id: &str,
        property_key: &str,
        property_name: &str,
        property_visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<Option<SourceInfo>, ProvenanceError> {
        let records = self.for_property_justification(
            vertex_id,
            property_key,
            property_name,
            property_visibility,
            authorizations,
        )?;
        self.project_single(
            records,
            &format!("justification of {}:{} on {}", property_key, property_name, vertex_id),
            authorizations,
        )
    }

    /// Source info justifying one property instance of `edge`
    pub fn source_info_for_edge_property(
        &self,
        edge: &Edge,
        property_key: &str,
        property_name: &str,
        property_visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<Option<SourceInfo>, ProvenanceError> {
        let records = self.for_edge_property_justification(
            edge,
            property_key,
            property_name,
            property_visibility,
            authorizations,
        )?;
        self.project_single(
            records,
            &format!("justification of {}:{} on {}", property_key, property_name, edge.id),
            authorizations,
        )
    }
}
