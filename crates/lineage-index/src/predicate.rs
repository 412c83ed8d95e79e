//! Composable filters over provenance records
//!
//! Every query in the index is one traversal followed by one of these
//! predicates. Predicates combine with [`RecordPredicate::and`].

use lineage_domain::{ForType, ProvenanceRecord, Visibility};

/// A test over a decoded record
pub trait RecordPredicate {
    /// Whether `record` passes
    fn matches(&self, record: &ProvenanceRecord) -> bool;

    /// Both predicates must pass
    fn and<P: RecordPredicate>(self, other: P) -> And<Self, P>
    where
        Self: Sized,
    {
        And(self, other)
    }
}

impl<F> RecordPredicate for F
where
    F: Fn(&ProvenanceRecord) -> bool,
{
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        self(record)
    }
}

/// Conjunction of two predicates
#[derive(Debug, Clone)]
pub struct And<A, B>(A, B);

impl<A: RecordPredicate, B: RecordPredicate> RecordPredicate for And<A, B> {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        self.0.matches(record) && self.1.matches(record)
    }
}

/// Record justifies the given element with the given type
#[derive(Debug, Clone)]
pub struct JustifiesElement<'a> {
    /// Expected discriminant
    pub for_type: ForType,
    /// Expected justified element id
    pub element_id: &'a str,
}

impl RecordPredicate for JustifiesElement<'_> {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        record.for_type() == self.for_type && record.for_element_id() == self.element_id
    }
}

/// Record justifies exactly this property instance
///
/// The visibility is compared as its string form.
#[derive(Debug, Clone)]
pub struct JustifiesProperty<'a> {
    /// Property key
    pub key: &'a str,
    /// Property name
    pub name: &'a str,
    /// Property visibility
    pub visibility: &'a Visibility,
}

impl RecordPredicate for JustifiesProperty<'_> {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        record.target.property_ref().is_some_and(|p| {
            p.key == self.key && p.name == self.name && p.visibility == self.visibility.as_str()
        })
    }
}

/// Record references a property with this key and name, any visibility
#[derive(Debug, Clone)]
pub struct RefersToProperty<'a> {
    /// Property key
    pub key: &'a str,
    /// Property name
    pub name: &'a str,
}

impl RecordPredicate for RefersToProperty<'_> {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        record
            .target
            .property_ref()
            .is_some_and(|p| p.key == self.key && p.name == self.name)
    }
}

/// Record justifies a whole element rather than one of its properties
#[derive(Debug, Clone, Copy)]
pub struct ElementLevel;

impl RecordPredicate for ElementLevel {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        record.target.property_ref().is_none()
    }
}

/// Record was attached directly, not through an edge
#[derive(Debug, Clone, Copy)]
pub struct Direct;

impl RecordPredicate for Direct {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        record.resolved_edge_id.is_none()
    }
}

/// Record carries this resolved edge id
#[derive(Debug, Clone)]
pub struct ResolvedEdge<'a>(pub &'a str);

impl RecordPredicate for ResolvedEdge<'_> {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        record.resolved_edge_id.as_deref() == Some(self.0)
    }
}

/// Evidence came from this text property
///
/// Records written before property names were tracked have none; they match
/// only when the queried name is the default text property.
#[derive(Debug, Clone)]
pub struct FromTextProperty<'a> {
    /// Text property key
    pub key: &'a str,
    /// Text property name
    pub name: &'a str,
    /// Name assumed for legacy records
    pub default_name: &'a str,
}

impl RecordPredicate for FromTextProperty<'_> {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        if record.text_property_key != self.key {
            return false;
        }
        match &record.text_property_name {
            Some(name) => name == self.name,
            None => self.name == self.default_name,
        }
    }
}

/// Route by which a record was attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Attachment {
    /// Either route
    #[default]
    Any,
    /// Directly, with no resolved edge
    Direct,
    /// Through the given edge
    Through(String),
}

/// Field filter for single-record lookups; `None` fields match anything
///
/// The source id is not stored on the record, so it is checked by the
/// query layer against the reverse `HAS_MENTION` edge rather than here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionFilter {
    /// Justified element id
    pub for_element_id: Option<String>,
    /// Source vertex id
    pub source_id: Option<String>,
    /// Referenced property key
    pub property_key: Option<String>,
    /// Referenced property name
    pub property_name: Option<String>,
    /// Referenced property visibility
    pub property_visibility: Option<String>,
    /// Only records without a property reference
    pub element_only: bool,
    /// Route the record was attached by
    pub attachment: Attachment,
}

impl MentionFilter {
    /// Filter for the record justifying `for_element_id`
    pub fn for_element(for_element_id: impl Into<String>) -> Self {
        Self {
            for_element_id: Some(for_element_id.into()),
            ..Default::default()
        }
    }

    /// Restrict to evidence from `source_id`
    pub fn from_source(mut self, source_id: impl Into<String>) -> Self {
        self.source_id = Some(source_id.into());
        self
    }

    /// Restrict to a referenced property; with neither key nor name, to
    /// element-level records
    pub fn with_property(mut self, key: Option<&str>, name: Option<&str>) -> Self {
        self.property_key = key.map(str::to_string);
        self.property_name = name.map(str::to_string);
        self.element_only = key.is_none() && name.is_none();
        self
    }

    /// Restrict to records attached directly
    pub fn direct(mut self) -> Self {
        self.attachment = Attachment::Direct;
        self
    }

    /// Restrict to records attached through `edge_id`
    pub fn through_edge(mut self, edge_id: impl Into<String>) -> Self {
        self.attachment = Attachment::Through(edge_id.into());
        self
    }

    /// Restrict to a referenced property visibility
    pub fn with_property_visibility(mut self, visibility: &Visibility) -> Self {
        self.property_visibility = Some(visibility.as_str().to_string());
        self
    }
}

impl RecordPredicate for MentionFilter {
    fn matches(&self, record: &ProvenanceRecord) -> bool {
        fn field(filter: &Option<String>, value: Option<&str>) -> bool {
            match filter {
                None => true,
                Some(expected) => value == Some(expected.as_str()),
            }
        }

        let property = record.target.property_ref();
        if self.element_only && property.is_some() {
            return false;
        }
        let routed = match &self.attachment {
            Attachment::Any => true,
            Attachment::Direct => Direct.matches(record),
            Attachment::Through(edge_id) => ResolvedEdge(edge_id).matches(record),
        };
        if !routed {
            return false;
        }
        field(&self.for_element_id, Some(record.for_element_id()))
            && field(&self.property_key, property.map(|p| p.key.as_str()))
            && field(&self.property_name, property.map(|p| p.name.as_str()))
            && field(&self.property_visibility, property.map(|p| p.visibility.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_domain::{Evidence, MentionFor, PropertyRef};

    fn record(target: MentionFor, text_name: Option<&str>) -> ProvenanceRecord {
        let evidence = Evidence::new("src", "k", text_name, 0, 1);
        ProvenanceRecord::new("id", Visibility::empty(), target, None, &evidence)
    }

    fn property_record() -> ProvenanceRecord {
        record(
            MentionFor::property("v1", PropertyRef::new("pk", "pn", "secret")),
            Some("text"),
        )
    }

    #[test]
    fn test_justifies_element() {
        let r = record(MentionFor::vertex("v1"), None);
        let vertex = JustifiesElement {
            for_type: ForType::Vertex,
            element_id: "v1",
        };
        assert!(vertex.matches(&r));
        assert!(!JustifiesElement {
            for_type: ForType::Edge,
            element_id: "v1"
        }
        .matches(&r));
    }

    #[test]
    fn test_property_predicates() {
        let r = property_record();
        let secret = Visibility::new("secret");
        assert!(JustifiesProperty {
            key: "pk",
            name: "pn",
            visibility: &secret
        }
        .matches(&r));
        assert!(!JustifiesProperty {
            key: "pk",
            name: "pn",
            visibility: &Visibility::empty()
        }
        .matches(&r));
        assert!(RefersToProperty { key: "pk", name: "pn" }.matches(&r));
        assert!(!ElementLevel.matches(&r));
    }

    #[test]
    fn test_legacy_text_property_fallback() {
        let legacy = record(MentionFor::vertex("v1"), None);
        let default = FromTextProperty {
            key: "k",
            name: "default",
            default_name: "default",
        };
        let other = FromTextProperty {
            key: "k",
            name: "other",
            default_name: "default",
        };
        assert!(default.matches(&legacy));
        assert!(!other.matches(&legacy));

        let named = record(MentionFor::vertex("v1"), Some("other"));
        assert!(other.matches(&named));
        assert!(!default.matches(&named));
    }

    #[test]
    fn test_and_combinator_with_closure() {
        let r = record(MentionFor::vertex("v1"), None);
        let p = ElementLevel.and(|r: &ProvenanceRecord| r.start_offset == 0);
        assert!(p.matches(&r));
        let q = ElementLevel.and(|r: &ProvenanceRecord| r.start_offset == 5);
        assert!(!q.matches(&r));
    }

    #[test]
    fn test_mention_filter_wildcards() {
        let r = property_record();
        assert!(MentionFilter::default().matches(&r));
        assert!(MentionFilter::for_element("v1").matches(&r));
        assert!(!MentionFilter::for_element("v2").matches(&r));

        let exact = MentionFilter::for_element("v1")
            .with_property(Some("pk"), Some("pn"))
            .with_property_visibility(&Visibility::new("secret"));
        assert!(exact.matches(&r));

        let element_only = MentionFilter::for_element("v1").with_property(None, None);
        assert!(!element_only.matches(&r));
        assert!(element_only.matches(&record(MentionFor::vertex("v1"), None)));
    }

    #[test]
    fn test_mention_filter_attachment_route() {
        let direct = record(MentionFor::vertex("v1"), None);
        let evidence = Evidence::new("src", "k", None, 0, 1);
        let through = ProvenanceRecord::new(
            "id2",
            Visibility::empty(),
            MentionFor::vertex("v1"),
            Some("e1".to_string()),
            &evidence,
        );

        let only_direct = MentionFilter::for_element("v1").direct();
        assert!(only_direct.matches(&direct));
        assert!(!only_direct.matches(&through));

        let via_e1 = MentionFilter::for_element("v1").through_edge("e1");
        assert!(via_e1.matches(&through));
        assert!(!via_e1.matches(&direct));
        assert!(!MentionFilter::for_element("v1").through_edge("e2").matches(&through));
    }
}
