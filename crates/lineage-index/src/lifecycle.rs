//! Creating, relabelling and removing provenance records

use crate::predicate::MentionFilter;
use crate::{ProvenanceError, ProvenanceIndex};
use lineage_domain::identity::{has_mention_edge_id, resolved_to_edge_id};
use lineage_domain::mention::props;
use lineage_domain::traits::{GraphStore, WorkQueue};
use lineage_domain::{
    Authorizations, Direction, Edge, ElementRef, Evidence, IdentityBuilder, MentionFor, Mutation,
    Property, PropertyRef, ProvenanceRecord, Visibility, HAS_MENTION_LABEL, RESOLVED_TO_LABEL,
};

impl<S, Q> ProvenanceIndex<S, Q>
where
    S: GraphStore,
    Q: WorkQueue,
{
    /// Create or overwrite the record linking `evidence` to `mention_for`
    ///
    /// The record resolves to `target_vertex_id`; when the justified thing
    /// was reached through an edge, pass that edge as `resolved_edge_id`.
    /// Attaching the same evidence again rewrites the same record.
    ///
    /// # Errors
    ///
    /// - `Validation` if the evidence or visibility is malformed
    /// - `NotFound` if the target or source vertex is not readable
    /// - `Store` if the batch is rejected
    pub fn attach(
        &self,
        target_vertex_id: &str,
        mention_for: MentionFor,
        resolved_edge_id: Option<&str>,
        evidence: &Evidence,
        visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<ProvenanceRecord, ProvenanceError> {
        let (record, batch) = self.prepare_attach(
            target_vertex_id,
            mention_for,
            resolved_edge_id,
            evidence,
            visibility,
            authorizations,
        )?;
        self.commit(&batch, &self.widen(authorizations))?;
        self.attached(&record, evidence);
        Ok(record)
    }

    /// Validate an attachment and build its batch without writing it
    pub(crate) fn prepare_attach(
        &self,
        target_vertex_id: &str,
        mention_for: MentionFor,
        resolved_edge_id: Option<&str>,
        evidence: &Evidence,
        visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<(ProvenanceRecord, Vec<Mutation>), ProvenanceError> {
        evidence.validate().map_err(ProvenanceError::Validation)?;
        visibility.validate().map_err(ProvenanceError::Validation)?;
        if let Some(property) = mention_for.property_ref() {
            Visibility::new(property.visibility.as_str())
                .validate()
                .map_err(ProvenanceError::Validation)?;
        }

        let widened = self.widen(authorizations);
        for vertex_id in [target_vertex_id, evidence.source_id.as_str()] {
            self.require_vertex(vertex_id, &widened)?;
        }

        let property = mention_for.property_ref();
        let id = IdentityBuilder::new(target_vertex_id, evidence.source_id.as_str())
            .property_key(property.map(|p| p.key.as_str()))
            .property_name(property.map(|p| p.name.as_str()))
            .property_visibility(property.map(|p| p.visibility.as_str()))
            .structural_edge_id(resolved_edge_id)
            .build();

        let combined = self.algebra.combine(visibility);
        let record = ProvenanceRecord::new(
            id,
            combined.clone(),
            mention_for,
            resolved_edge_id.map(str::to_string),
            evidence,
        );

        let batch = vec![
            Mutation::PutVertex {
                id: record.id.clone(),
                visibility: combined.clone(),
                properties: record.to_properties(&combined),
            },
            Mutation::PutEdge {
                id: has_mention_edge_id(&record.id),
                label: HAS_MENTION_LABEL.to_string(),
                out_vertex_id: evidence.source_id.clone(),
                in_vertex_id: record.id.clone(),
                visibility: combined.clone(),
                properties: vec![],
            },
            Mutation::PutEdge {
                id: resolved_to_edge_id(&record.id),
                label: RESOLVED_TO_LABEL.to_string(),
                out_vertex_id: record.id.clone(),
                in_vertex_id: target_vertex_id.to_string(),
                visibility: combined,
                properties: vec![],
            },
        ];
        Ok((record, batch))
    }

    /// Log and count a committed attachment
    pub(crate) fn attached(&self, record: &ProvenanceRecord, evidence: &Evidence) {
        if record.text_property_name.is_none() {
            tracing::warn!(
                "Provenance record {} attached without a text property name",
                record.id
            );
        }
        tracing::debug!(
            "Attached provenance {} ({} {}) from {}",
            record.id,
            record.for_type(),
            record.for_element_id(),
            evidence.source_id
        );
        self.record_metric(|m| m.record_attach());
    }

    /// Attach evidence for `edge`, or for one of its properties
    ///
    /// The record resolves to the edge's in-vertex and carries the edge id.
    pub fn attach_to_edge(
        &self,
        edge: &Edge,
        property: Option<PropertyRef>,
        evidence: &Evidence,
        visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<ProvenanceRecord, ProvenanceError> {
        let mention_for = match property {
            Some(property) => MentionFor::property(edge.id.as_str(), property),
            None => MentionFor::edge(edge.id.as_str()),
        };
        self.attach(
            &edge.in_vertex_id,
            mention_for,
            Some(&edge.id),
            evidence,
            visibility,
            authorizations,
        )
    }

    /// Soft-delete the record from `source_id` justifying `target_id`
    ///
    /// Only records attached directly match; with no property key or name,
    /// only element-level ones. Returns the id of the retracted record; a miss is not an error.
    pub fn retract(
        &self,
        target_id: &str,
        source_id: &str,
        property_key: Option<&str>,
        property_name: Option<&str>,
        authorizations: &Authorizations,
    ) -> Result<Option<String>, ProvenanceError> {
        let filter = MentionFilter::for_element(target_id)
            .from_source(source_id)
            .direct()
            .with_property(property_key, property_name);
        self.retract_matching(target_id, &filter, authorizations)
    }

    /// Soft-delete the record from `source_id` justifying `edge`
    pub fn retract_from_edge(
        &self,
        edge: &Edge,
        source_id: &str,
        property_key: Option<&str>,
        property_name: Option<&str>,
        authorizations: &Authorizations,
    ) -> Result<Option<String>, ProvenanceError> {
        let filter = MentionFilter::for_element(edge.id.as_str())
            .from_source(source_id)
            .through_edge(edge.id.as_str())
            .with_property(property_key, property_name);
        self.retract_matching(&edge.in_vertex_id, &filter, authorizations)
    }

    fn retract_matching(
        &self,
        target_vertex_id: &str,
        filter: &MentionFilter,
        authorizations: &Authorizations,
    ) -> Result<Option<String>, ProvenanceError> {
        let Some(record) = self.find_exact(target_vertex_id, filter, authorizations)? else {
            tracing::debug!("Nothing to retract for {}", target_vertex_id);
            return Ok(None);
        };

        let widened = self.widen(authorizations);
        self.commit(&[Mutation::SoftDelete(ElementRef::Vertex(record.id.clone()))], &widened)?;
        tracing::debug!("Retracted provenance {}", record.id);
        self.record_metric(|m| m.record_retract());
        Ok(Some(record.id))
    }

    /// Move a record, its properties and its structural edges to
    /// `combine(new_visibility)`
    ///
    /// A property reference's stored visibility becomes the plain
    /// `new_visibility`. Everything is written in one batch, so a rejected
    /// edge leaves the record untouched.
    pub fn relabel(
        &self,
        record: &ProvenanceRecord,
        new_visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<ProvenanceRecord, ProvenanceError> {
        new_visibility.validate().map_err(ProvenanceError::Validation)?;

        let widened = self.widen(authorizations);
        let vertex = self
            .store
            .get_vertex(&record.id, &widened)
            .map_err(ProvenanceError::store)?
            .ok_or_else(|| ProvenanceError::NotFound(format!("provenance record {}", record.id)))?;
        let combined = self.algebra.combine(new_visibility);

        let mut batch = Vec::new();
        let element = ElementRef::Vertex(vertex.id.clone());
        batch.push(Mutation::AlterVisibility {
            element: element.clone(),
            visibility: combined.clone(),
        });
        for property in &vertex.properties {
            if property.name == props::REF_PROPERTY_VISIBILITY {
                batch.push(Mutation::SetProperty {
                    element: element.clone(),
                    property: Property::new(
                        property.key.as_str(),
                        property.name.as_str(),
                        new_visibility.as_str(),
                        combined.clone(),
                    ),
                });
            } else {
                batch.push(relabel_property(&element, property, &combined));
            }
        }

        let edges = self
            .store
            .edges(&record.id, Direction::Both, &[], &widened)
            .map_err(ProvenanceError::store)?;
        for edge in &edges {
            let element = ElementRef::Edge(edge.id.clone());
            batch.push(Mutation::AlterVisibility {
                element: element.clone(),
                visibility: combined.clone(),
            });
            batch.extend(
                edge.properties
                    .iter()
                    .map(|property| relabel_property(&element, property, &combined)),
            );
        }

        self.commit(&batch, &widened)?;
        tracing::debug!(
            "Relabelled provenance {} and {} edges to {}",
            record.id,
            edges.len(),
            combined
        );
        self.record_metric(|m| m.record_relabel());

        let mut updated = record.clone();
        updated.visibility = combined;
        if let MentionFor::Property { property, .. } = &mut updated.target {
            property.visibility = new_visibility.as_str().to_string();
        }
        Ok(updated)
    }

    /// Soft-delete a record; its structural edges go with it
    pub fn delete(
        &self,
        record: &ProvenanceRecord,
        authorizations: &Authorizations,
    ) -> Result<(), ProvenanceError> {
        let widened = self.widen(authorizations);
        self.require_vertex(&record.id, &widened)?;
        self.commit(&[Mutation::SoftDelete(ElementRef::Vertex(record.id.clone()))], &widened)?;
        tracing::debug!("Deleted provenance {}", record.id);
        self.record_metric(|m| m.record_delete());
        Ok(())
    }

    /// Hide a record and its structural edges from callers who can read
    /// `hidden_visibility`
    pub fn hide(
        &self,
        record: &ProvenanceRecord,
        hidden_visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<(), ProvenanceError> {
        hidden_visibility.validate().map_err(ProvenanceError::Validation)?;

        let widened = self.widen(authorizations);
        self.require_vertex(&record.id, &widened)?;
        let edges = self
            .store
            .edges(
                &record.id,
                Direction::Both,
                &[HAS_MENTION_LABEL, RESOLVED_TO_LABEL],
                &widened,
            )
            .map_err(ProvenanceError::store)?;

        let batch: Vec<Mutation> = std::iter::once(ElementRef::Vertex(record.id.clone()))
            .chain(edges.into_iter().map(|edge| ElementRef::Edge(edge.id)))
            .map(|element| Mutation::MarkHidden {
                element,
                visibility: hidden_visibility.clone(),
            })
            .collect();
        self.commit(&batch, &widened)?;
        tracing::debug!("Hid provenance {} under {}", record.id, hidden_visibility);
        self.record_metric(|m| m.record_hide());
        Ok(())
    }

    pub(crate) fn require_vertex(
        &self,
        vertex_id: &str,
        authorizations: &Authorizations,
    ) -> Result<(), ProvenanceError> {
        match self
            .store
            .get_vertex(vertex_id, authorizations)
            .map_err(ProvenanceError::store)?
        {
            Some(_) => Ok(()),
            None => Err(ProvenanceError::NotFound(format!("vertex {}", vertex_id))),
        }
    }

    /// Apply a batch and flush it
    pub(crate) fn commit(
        &self,
        batch: &[Mutation],
        authorizations: &Authorizations,
    ) -> Result<(), ProvenanceError> {
        self.store
            .apply(batch, authorizations)
            .map_err(ProvenanceError::store)?;
        self.store.flush().map_err(ProvenanceError::store)
    }
}

fn relabel_property(element: &ElementRef, property: &Property, visibility: &Visibility) -> Mutation {
    Mutation::AlterPropertyVisibility {
        element: element.clone(),
        key: property.key.clone(),
        name: property.name.clone(),
        visibility: visibility.clone(),
    }
}
