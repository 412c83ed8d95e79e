//! Provenance records and what they justify

use crate::element::{Element, Property, Vertex};
use crate::visibility::Visibility;
use std::fmt;
use std::str::FromStr;

/// Property names used on provenance record vertices
pub mod props {
    /// Key shared by every single-valued record property
    pub const RECORD_PROPERTY_KEY: &str = "";
    /// Id of the justified element
    pub const FOR_ELEMENT_ID: &str = "http://visallo.org/termMention#forElementId";
    /// `VERTEX`, `EDGE` or `PROPERTY`
    pub const FOR_TYPE: &str = "http://visallo.org/termMention#forType";
    /// Key of the justified property
    pub const REF_PROPERTY_KEY: &str = "http://visallo.org/termMention#refPropertyKey";
    /// Name of the justified property
    pub const REF_PROPERTY_NAME: &str = "http://visallo.org/termMention#refPropertyName";
    /// Visibility string of the justified property
    pub const REF_PROPERTY_VISIBILITY: &str =
        "http://visallo.org/termMention#refPropertyVisibility";
    /// Edge the record was attached through
    pub const RESOLVED_EDGE_ID: &str = "http://visallo.org/termMention#resolvedEdgeId";
    /// Evidence snippet
    pub const SNIPPET: &str = "http://visallo.org/termMention#snippet";
    /// Key of the text property holding the evidence
    pub const TEXT_PROPERTY_KEY: &str = "http://visallo.org/termMention#propertyKey";
    /// Name of the text property holding the evidence
    pub const TEXT_PROPERTY_NAME: &str = "http://visallo.org/termMention#propertyName";
    /// Evidence span start
    pub const START_OFFSET: &str = "http://visallo.org/termMention#startOffset";
    /// Evidence span end
    pub const END_OFFSET: &str = "http://visallo.org/termMention#endOffset";
}

/// Discriminant of what a record justifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForType {
    /// A vertex
    Vertex,

    /// An edge
    Edge,

    /// One property instance of a vertex or edge
    Property,
}

impl ForType {
    /// Stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            ForType::Vertex => "VERTEX",
            ForType::Edge => "EDGE",
            ForType::Property => "PROPERTY",
        }
    }
}

impl FromStr for ForType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "VERTEX" => Ok(ForType::Vertex),
            "EDGE" => Ok(ForType::Edge),
            "PROPERTY" => Ok(ForType::Property),
            _ => Err(format!("Invalid mention type: {}", s)),
        }
    }
}

impl fmt::Display for ForType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one property instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PropertyRef {
    /// Property key
    pub key: String,

    /// Property name
    pub name: String,

    /// Visibility string of the instance
    pub visibility: String,
}

impl PropertyRef {
    /// Create a property reference
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        visibility: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            visibility: visibility.into(),
        }
    }
}

/// The element a provenance record justifies
///
/// Property references exist only on the `Property` variant, so a vertex or
/// edge justification can never carry half a property reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MentionFor {
    /// Justifies a vertex
    Vertex(String),

    /// Justifies an edge
    Edge(String),

    /// Justifies one property of a vertex or edge
    Property {
        /// Id of the element owning the property
        element_id: String,
        /// The property instance
        property: PropertyRef,
    },
}

impl MentionFor {
    /// Justification of a vertex
    pub fn vertex(id: impl Into<String>) -> Self {
        MentionFor::Vertex(id.into())
    }

    /// Justification of an edge
    pub fn edge(id: impl Into<String>) -> Self {
        MentionFor::Edge(id.into())
    }

    /// Justification of a property instance
    pub fn property(element_id: impl Into<String>, property: PropertyRef) -> Self {
        MentionFor::Property {
            element_id: element_id.into(),
            property,
        }
    }

    /// Build from loose, optional parts
    ///
    /// # Errors
    ///
    /// Returns an error when `for_type` is `Property` and any of the three
    /// property fields is missing, when it is not `Property` and any is
    /// present, or when `element_id` is empty.
    pub fn from_parts(
        for_type: ForType,
        element_id: &str,
        property_key: Option<&str>,
        property_name: Option<&str>,
        property_visibility: Option<&str>,
    ) -> Result<Self, String> {
        if element_id.is_empty() {
            return Err("Mention element id cannot be empty".to_string());
        }
        match (for_type, property_key, property_name, property_visibility) {
            (ForType::Property, Some(key), Some(name), Some(visibility)) => Ok(
                MentionFor::property(element_id, PropertyRef::new(key, name, visibility)),
            ),
            (ForType::Property, ..) => Err(format!(
                "PROPERTY mention of {} requires property key, name and visibility",
                element_id
            )),
            (_, None, None, None) if for_type == ForType::Vertex => {
                Ok(MentionFor::vertex(element_id))
            }
            (_, None, None, None) => Ok(MentionFor::edge(element_id)),
            (other, ..) => Err(format!(
                "{} mention of {} cannot carry property fields",
                other, element_id
            )),
        }
    }

    /// Discriminant
    pub fn for_type(&self) -> ForType {
        match self {
            MentionFor::Vertex(_) => ForType::Vertex,
            MentionFor::Edge(_) => ForType::Edge,
            MentionFor::Property { .. } => ForType::Property,
        }
    }

    /// Id of the justified element (the owner, for properties)
    pub fn element_id(&self) -> &str {
        match self {
            MentionFor::Vertex(id) | MentionFor::Edge(id) => id,
            MentionFor::Property { element_id, .. } => element_id,
        }
    }

    /// The property reference, for property justifications
    pub fn property_ref(&self) -> Option<&PropertyRef> {
        match self {
            MentionFor::Property { property, .. } => Some(property),
            _ => None,
        }
    }
}

/// The evidentiary text span inside a source vertex
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// Vertex holding the text
    pub source_id: String,

    /// Excerpt shown to users
    pub snippet: Option<String>,

    /// Key of the text property
    pub text_property_key: String,

    /// Name of the text property; `None` is the deprecated legacy form
    pub text_property_name: Option<String>,

    /// Span start (inclusive)
    pub start_offset: i64,

    /// Span end (exclusive)
    pub end_offset: i64,
}

impl Evidence {
    /// Evidence from `source_id` over `[start_offset, end_offset)`
    pub fn new(
        source_id: impl Into<String>,
        text_property_key: impl Into<String>,
        text_property_name: Option<&str>,
        start_offset: i64,
        end_offset: i64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            snippet: None,
            text_property_key: text_property_key.into(),
            text_property_name: text_property_name.map(str::to_string),
            start_offset,
            end_offset,
        }
    }

    /// Attach a snippet
    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }

    /// Check the span and source
    pub fn validate(&self) -> Result<(), String> {
        if self.source_id.is_empty() {
            return Err("Evidence source id cannot be empty".to_string());
        }
        if self.start_offset < 0 || self.end_offset < self.start_offset {
            return Err(format!(
                "Invalid evidence span [{}, {})",
                self.start_offset, self.end_offset
            ));
        }
        Ok(())
    }
}

/// One unit of evidence, decoded from a record vertex
#[derive(Debug, Clone, PartialEq)]
pub struct ProvenanceRecord {
    /// Record (vertex) id
    pub id: String,

    /// Element visibility, always including the provenance marker
    pub visibility: Visibility,

    /// What this record justifies
    pub target: MentionFor,

    /// Edge the record was attached through, if any
    pub resolved_edge_id: Option<String>,

    /// Evidence snippet as stored (unsanitized)
    pub snippet: Option<String>,

    /// Key of the text property in the source vertex
    pub text_property_key: String,

    /// Name of the text property; `None` for legacy records
    pub text_property_name: Option<String>,

    /// Span start
    pub start_offset: i64,

    /// Span end
    pub end_offset: i64,
}

impl ProvenanceRecord {
    /// Assemble a record from its parts
    pub fn new(
        id: impl Into<String>,
        visibility: Visibility,
        target: MentionFor,
        resolved_edge_id: Option<String>,
        evidence: &Evidence,
    ) -> Self {
        Self {
            id: id.into(),
            visibility,
            target,
            resolved_edge_id,
            snippet: evidence.snippet.clone(),
            text_property_key: evidence.text_property_key.clone(),
            text_property_name: evidence.text_property_name.clone(),
            start_offset: evidence.start_offset,
            end_offset: evidence.end_offset,
        }
    }

    /// Discriminant of the justified element
    pub fn for_type(&self) -> ForType {
        self.target.for_type()
    }

    /// Id of the justified element
    pub fn for_element_id(&self) -> &str {
        self.target.element_id()
    }

    /// Decode a record vertex
    ///
    /// # Errors
    ///
    /// Returns an error if a required attribute is missing or the property
    /// reference is inconsistent with the stored type.
    pub fn from_vertex(vertex: &Vertex) -> Result<Self, String> {
        let required = |name: &str| {
            vertex
                .str_value(name)
                .ok_or_else(|| format!("Mention {} is missing {}", vertex.id, name))
        };
        let for_type: ForType = required(props::FOR_TYPE)?.parse()?;
        let target = MentionFor::from_parts(
            for_type,
            required(props::FOR_ELEMENT_ID)?,
            vertex.str_value(props::REF_PROPERTY_KEY),
            vertex.str_value(props::REF_PROPERTY_NAME),
            vertex.str_value(props::REF_PROPERTY_VISIBILITY),
        )
        .map_err(|e| format!("Mention {}: {}", vertex.id, e))?;

        let offset = |name: &str| {
            vertex
                .i64_value(name)
                .ok_or_else(|| format!("Mention {} is missing {}", vertex.id, name))
        };

        Ok(Self {
            id: vertex.id.clone(),
            visibility: vertex.visibility.clone(),
            target,
            resolved_edge_id: vertex.str_value(props::RESOLVED_EDGE_ID).map(str::to_string),
            snippet: vertex.str_value(props::SNIPPET).map(str::to_string),
            text_property_key: required(props::TEXT_PROPERTY_KEY)?.to_string(),
            text_property_name: vertex.str_value(props::TEXT_PROPERTY_NAME).map(str::to_string),
            start_offset: offset(props::START_OFFSET)?,
            end_offset: offset(props::END_OFFSET)?,
        })
    }

    /// Encode as vertex properties, each carrying `visibility`
    pub fn to_properties(&self, visibility: &Visibility) -> Vec<Property> {
        let prop = |name: &str, value: serde_json::Value| {
            Property::new(props::RECORD_PROPERTY_KEY, name, value, visibility.clone())
        };

        let mut properties = vec![
            prop(props::FOR_ELEMENT_ID, self.for_element_id().into()),
            prop(props::FOR_TYPE, self.for_type().as_str().into()),
        ];
        if let Some(property) = self.target.property_ref() {
            properties.push(prop(props::REF_PROPERTY_KEY, property.key.as_str().into()));
            properties.push(prop(props::REF_PROPERTY_NAME, property.name.as_str().into()));
            properties.push(prop(
                props::REF_PROPERTY_VISIBILITY,
                property.visibility.as_str().into(),
            ));
        }
        if let Some(edge_id) = &self.resolved_edge_id {
            properties.push(prop(props::RESOLVED_EDGE_ID, edge_id.as_str().into()));
        }
        if let Some(snippet) = &self.snippet {
            properties.push(prop(props::SNIPPET, snippet.as_str().into()));
        }
        properties.push(prop(props::TEXT_PROPERTY_KEY, self.text_property_key.as_str().into()));
        if let Some(name) = &self.text_property_name {
            properties.push(prop(props::TEXT_PROPERTY_NAME, name.as_str().into()));
        }
        properties.push(prop(props::START_OFFSET, self.start_offset.into()));
        properties.push(prop(props::END_OFFSET, self.end_offset.into()));
        properties
    }
}
