//! Free-text versus structured justification
//!
//! An element is justified either by a free-text property or by structured
//! provenance records, never both. Setting one mode clears the other.

use crate::predicate::{Direct, RecordPredicate};
use crate::{ProvenanceError, ProvenanceIndex};
use lineage_domain::traits::{GraphStore, WorkQueue};
use lineage_domain::{
    Authorizations, Element, ElementRef, MentionFor, Mutation, Property, ProvenanceRecord,
    SourceInfo, Visibility,
};

/// Property holding an element's free-text justification
pub const JUSTIFICATION_PROPERTY: &str = "http://visallo.org#justification";

const JUSTIFICATION_TEXT: &str = "justificationText";

/// How a caller justifies an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Justification {
    /// A sentence typed by the user
    FreeText(String),

    /// A pointer into a source document
    Structured(SourceInfo),
}

impl<S, Q> ProvenanceIndex<S, Q>
where
    S: GraphStore,
    Q: WorkQueue,
{
    /// Set either kind of justification on `target_id`
    ///
    /// Returns the attached record for structured justification.
    pub fn add_justification(
        &self,
        target_id: &str,
        justification: &Justification,
        visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<Option<ProvenanceRecord>, ProvenanceError> {
        match justification {
            Justification::FreeText(text) => {
                self.set_free_text(target_id, text, visibility, authorizations)?;
                Ok(None)
            }
            Justification::Structured(source_info) => self
                .set_structured(target_id, source_info, visibility, authorizations)
                .map(Some),
        }
    }

    /// Justify `target_id` with free text, dropping its structured
    /// self-justification
    pub fn set_free_text(
        &self,
        target_id: &str,
        text: &str,
        visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<(), ProvenanceError> {
        visibility.validate().map_err(ProvenanceError::Validation)?;
        let widened = self.widen(authorizations);
        self.require_vertex(target_id, &widened)?;

        let element = ElementRef::Vertex(target_id.to_string());
        let mut batch = self.self_justification_removals(target_id, authorizations)?;
        let superseded = batch.len();
        batch.push(Mutation::SetProperty {
            element,
            property: Property::new(
                "",
                JUSTIFICATION_PROPERTY,
                serde_json::json!({ JUSTIFICATION_TEXT: text }),
                visibility.clone(),
            ),
        });
        self.commit(&batch, &widened)?;

        if superseded > 0 {
            tracing::debug!(
                "Free text on {} superseded {} provenance records",
                target_id,
                superseded
            );
            self.record_metric(|m| m.deleted += superseded);
        }
        Ok(())
    }

    /// Justify `target_id` with a pointer into a source document, dropping
    /// its free-text justification and any other self-justification
    pub fn set_structured(
        &self,
        target_id: &str,
        source_info: &SourceInfo,
        visibility: &Visibility,
        authorizations: &Authorizations,
    ) -> Result<ProvenanceRecord, ProvenanceError> {
        let evidence = source_info.to_evidence();
        let (record, attach_batch) = self.prepare_attach(
            target_id,
            MentionFor::vertex(target_id),
            None,
            &evidence,
            visibility,
            authorizations,
        )?;

        // Re-attaching the same evidence rewrites the record in place
        let mut batch: Vec<Mutation> = self
            .self_justification_removals(target_id, authorizations)?
            .into_iter()
            .filter(|m| m.target() != ElementRef::Vertex(record.id.clone()))
            .collect();
        let superseded = batch.len();
        batch.push(Mutation::RemoveProperty {
            element: ElementRef::Vertex(target_id.to_string()),
            key: String::new(),
            name: JUSTIFICATION_PROPERTY.to_string(),
        });
        batch.extend(attach_batch);
        self.commit(&batch, &self.widen(authorizations))?;

        self.attached(&record, &evidence);
        if superseded > 0 {
            self.record_metric(|m| m.deleted += superseded);
        }
        Ok(record)
    }

    /// The free-text justification of `target_id`, if any
    pub fn justification_text(
        &self,
        target_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Option<String>, ProvenanceError> {
        let vertex = self
            .store
            .get_vertex(target_id, authorizations)
            .map_err(ProvenanceError::store)?;
        Ok(vertex.and_then(|v| {
            v.property(JUSTIFICATION_PROPERTY)
                .and_then(|p| p.value.get(JUSTIFICATION_TEXT))
                .and_then(|t| t.as_str())
                .map(str::to_string)
        }))
    }

    /// Soft deletes for every record directly justifying `target_id`
    fn self_justification_removals(
        &self,
        target_id: &str,
        authorizations: &Authorizations,
    ) -> Result<Vec<Mutation>, ProvenanceError> {
        Ok(self
            .for_vertex_justification(target_id, authorizations)?
            .into_iter()
            .filter(|r| Direct.matches(r))
            .map(|r| Mutation::SoftDelete(ElementRef::Vertex(r.id)))
            .collect())
    }
}
