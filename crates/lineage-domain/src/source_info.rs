//! External-facing justification descriptor

use crate::mention::Evidence;
use serde::{Deserialize, Serialize};

/// Where a justification's evidence lives
///
/// Produced by projecting a provenance record; also accepted as input when a
/// caller attaches structured justification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceInfo {
    /// Vertex holding the evidence text
    pub source_element_id: String,

    /// Key of the text property
    pub text_property_key: String,

    /// Name of the text property
    pub text_property_name: Option<String>,

    /// Span start
    pub start_offset: i64,

    /// Span end
    pub end_offset: i64,

    /// Sanitized excerpt
    pub snippet: Option<String>,
}

impl SourceInfo {
    /// The evidence this descriptor points at
    pub fn to_evidence(&self) -> Evidence {
        Evidence {
            source_id: self.source_element_id.clone(),
            snippet: self.snippet.clone(),
            text_property_key: self.text_property_key.clone(),
            text_property_name: self.text_property_name.clone(),
            start_offset: self.start_offset,
            end_offset: self.end_offset,
        }
    }
}
