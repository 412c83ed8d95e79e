//! Query layer: traversal plus predicate filtering

use crate::index::{at_most_one, decode};
use crate::predicate::{
    ElementLevel, FromTextProperty, JustifiesElement, JustifiesProperty, MentionFilter,
    RecordPredicate, RefersToProperty, ResolvedEdge,
};
use crate::{ProvenanceError, ProvenanceIndex};
use lineage_domain::traits::{GraphStore, WorkQueue};
use lineage_domain::{
    Authorizations, Direction, Edge, ForType, ProvenanceRecord, Visibility, HAS_MENTION_LABEL,
    RESOLVED_TO_LABEL,
};
use std::collections::HashSet;

impl<S, Q> ProvenanceIndex<S, Q>
where
    S: GraphStore,
    Q: WorkQueue,
{
    /// Records linked to `vertex_id` over `labels`, first occurrence order
    fn neighbours(
        &self,
        vertex_id: &str,
        direction: Direction,
        labels: &[&str],
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let ids = self
            .store
            .traverse(vertex_id, direction, labels, authorizations)
            .map_err(ProvenanceError::store)?;
        self.load(ids, authorizations)
    }

    fn load(
        &self,
        ids: impl IntoIterator<Item = String>,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let mut seen = HashSet::new();
        let mut records = Vec::new();
        for id in ids {
            if !seen.insert(id.clone()) {
                continue;
            }
            let vertex = self
                .store
                .get_vertex(&id, authorizations)
                .map_err(ProvenanceError::store)?;
            if let Some(record) = vertex.as_ref().map(decode).transpose()?.flatten() {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn filtered(
        records: Vec<ProvenanceRecord>,
        predicate: impl RecordPredicate,
    ) -> Vec<ProvenanceRecord> {
        records.into_iter().filter(|r| predicate.matches(r)).collect()
    }

    /// Look up a record by id
    pub fn find_by_id(
        &self,
        record_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<ProvenanceRecord>, ProvenanceError> {
        let widened = self.widen(authorizations);
        Ok(self.load([record_id.to_string()], &widened)?.pop())
    }

    /// Records whose evidence comes from `source_id`
    pub fn by_has_mention_source(
        &self,
        source_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let widened = self.widen(authorizations);
        self.neighbours(source_id, Direction::Out, &[HAS_MENTION_LABEL], &widened)
    }

    /// Records whose evidence comes from one text property of `source_id`
    ///
    /// Records stored without a text property name match when
    /// `property_name` is the configured default text property.
    pub fn by_has_mention_source_and_property(
        &self,
        source_id: &str,
        property_key: &str,
        property_name: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.by_has_mention_source(source_id, authorizations)?;
        Ok(Self::filtered(
            records,
            FromTextProperty {
                key: property_key,
                name: property_name,
                default_name: &self.config.default_text_property_name,
            },
        ))
    }

    /// Records from `source_id` that were attached through `edge_id`
    pub fn by_resolved_edge(
        &self,
        source_id: &str,
        edge_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.by_has_mention_source(source_id, authorizations)?;
        Ok(Self::filtered(records, ResolvedEdge(edge_id)))
    }

    /// Records adjacent to `target_id` over either provenance label, in
    /// either direction
    pub fn by_target(
        &self,
        target_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let widened = self.widen(authorizations);
        self.neighbours(
            target_id,
            Direction::Both,
            &[HAS_MENTION_LABEL, RESOLVED_TO_LABEL],
            &widened,
        )
    }

    /// Union of [`Self::by_target`] over both endpoints of `edge`
    pub fn by_target_edge(
        &self,
        edge: &Edge,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let mut records = self.by_target(&edge.out_vertex_id, authorizations)?;
        let seen: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
        records.extend(
            self.by_target(&edge.in_vertex_id, authorizations)?
                .into_iter()
                .filter(|r| !seen.contains(&r.id)),
        );
        Ok(records)
    }

    /// Records with a `RESOLVED_TO` edge into `target_vertex_id`
    pub fn resolved_to(
        &self,
        target_vertex_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let widened = self.widen(authorizations);
        self.neighbours(target_vertex_id, Direction::In, &[RESOLVED_TO_LABEL], &widened)
    }

    /// [`Self::resolved_to`] restricted to one referenced property
    pub fn resolved_to_for_ref(
        &self,
        target_vertex_id: &str,
        property_key: &str,
        property_name: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.resolved_to(target_vertex_id, authorizations)?;
        Ok(Self::filtered(
            records,
            RefersToProperty {
                key: property_key,
                name: property_name,
            },
        ))
    }

    /// [`Self::resolved_to`] restricted to element-level records
    pub fn resolved_to_for_element(
        &self,
        target_vertex_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.resolved_to(target_vertex_id, authorizations)?;
        Ok(Self::filtered(records, ElementLevel))
    }

    /// Records justifying the vertex `target_id` itself
    pub fn for_vertex_justification(
        &self,
        target_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.by_target(target_id, authorizations)?;
        Ok(Self::filtered(
            records,
            JustifiesElement {
                for_type: ForType::Vertex,
                element_id: target_id,
            },
        ))
    }

    /// Records justifying `edge` itself
    pub fn for_edge_justification(
        &self,
        edge: &Edge,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.by_target_edge(edge, authorizations)?;
        Ok(Self::filtered(
            records,
            JustifiesElement {
                for_type: ForType::Edge,
                element_id: &edge.id,
            },
        ))
    }

    /// Records justifying one property instance of the vertex `target_id`
    pub fn for_property_justification(
        &self,
        target_id: &str,
        property_key: &str,
        property_name: &str,
        property_visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.by_target(target_id, authorizations)?;
        Ok(Self::filtered(
            records,
            JustifiesElement {
                for_type: ForType::Property,
                element_id: target_id,
            }
            .and(JustifiesProperty {
                key: property_key,
                name: property_name,
                visibility: property_visibility,
            }),
        ))
    }

    /// Records justifying one property instance of `edge`
    pub fn for_edge_property_justification(
        &self,
        edge: &Edge,
        property_key: &str,
        property_name: &str,
        property_visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<Vec<ProvenanceRecord>, ProvenanceError> {
        let records = self.by_target_edge(edge, authorizations)?;
        Ok(Self::filtered(
            records,
            JustifiesElement {
                for_type: ForType::Property,
                element_id: &edge.id,
            }
            .and(JustifiesProperty {
                key: property_key,
                name: property_name,
                visibility: property_visibility,
            }),
        ))
    }

    /// The single record resolved to `target_id` that passes `filter`
    ///
    /// # Errors
    ///
    /// Returns `FatalData` if more than one record matches.
    pub fn find_exact(
        &self,
        target_id: &str,
        filter: &MentionFilter,
        authorizations: &Authorizations,
    ) -> Result<Option<ProvenanceRecord>, ProvenanceError> {
        let mut matches = Vec::new();
        for record in self.resolved_to(target_id, authorizations)? {
            if !filter.matches(&record) {
                continue;
            }
            if let Some(source_id) = &filter.source_id {
                if self.resolve_source_element(&record, authorizations)? != *source_id {
                    continue;
                }
            }
            matches.push(record);
        }
        at_most_one(matches, &format!("provenance record resolved to {}", target_id))
    }

    /// Id of the vertex the record's evidence comes from
    ///
    /// # Errors
    ///
    /// Returns `FatalData` unless exactly one `HAS_MENTION` edge leads to
    /// the record.
    pub fn resolve_source_element(
        &self,
        record: &ProvenanceRecord,
        authorizations: &Authorizations,
    ) -> Result<String, ProvenanceError> {
        let widened = self.widen(authorizations);
        let sources = self
            .store
            .traverse(&record.id, Direction::In, &[HAS_MENTION_LABEL], &widened)
            .map_err(ProvenanceError::store)?;
        at_most_one(sources, &format!("source of {}", record.id))?.ok_or_else(|| {
            ProvenanceError::FatalData(format!("Provenance record {} has no source", record.id))
        })
    }
}
