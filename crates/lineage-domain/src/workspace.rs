//! Workspace sandboxing of visibility

use crate::element::Element;
use crate::visibility::Visibility;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Property holding an element's [`VisibilityJson`]
pub const VISIBILITY_JSON_PROPERTY: &str = "http://visallo.org#visibilityJson";

/// Whether an element is a draft in a workspace or generally visible
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SandboxStatus {
    /// Published
    Public,

    /// Scoped to the workspace in question
    Private,
}

/// User-facing visibility source plus the workspaces an element is sandboxed to
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibilityJson {
    /// Visibility expression chosen by the user
    #[serde(default)]
    pub source: String,

    /// Workspaces the element is sandboxed to
    #[serde(default)]
    pub workspaces: BTreeSet<String>,
}

impl VisibilityJson {
    /// A public visibility with the given source
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            workspaces: BTreeSet::new(),
        }
    }

    /// Replace the source and, if given, sandbox to `workspace_id`
    pub fn with_source_and_workspace(source: &str, workspace_id: Option<&str>) -> Self {
        let mut json = Self::new(source);
        if let Some(workspace_id) = workspace_id {
            json.workspaces.insert(workspace_id.to_string());
        }
        json
    }

    /// Read the visibility JSON stored on an element
    ///
    /// Returns `Ok(None)` when the element has none.
    pub fn from_element<E: Element>(element: &E) -> Result<Option<Self>, String> {
        match element.property(VISIBILITY_JSON_PROPERTY) {
            None => Ok(None),
            Some(property) => serde_json::from_value(property.value.clone())
                .map(Some)
                .map_err(|e| format!("Invalid visibility JSON on {}: {}", element.id(), e)),
        }
    }

    /// Sandbox status relative to `workspace_id`
    pub fn sandbox_status(&self, workspace_id: &str) -> SandboxStatus {
        if self.workspaces.contains(workspace_id) {
            SandboxStatus::Private
        } else {
            SandboxStatus::Public
        }
    }

    /// Translate to an element visibility: `(source)&(ws1|ws2...)`
    pub fn to_visibility(&self) -> Visibility {
        let mut parts = Vec::new();
        if !self.source.trim().is_empty() {
            parts.push(format!("({})", self.source.trim()));
        }
        if !self.workspaces.is_empty() {
            let workspaces: Vec<&str> = self.workspaces.iter().map(String::as_str).collect();
            parts.push(format!("({})", workspaces.join("|")));
        }
        Visibility::new(parts.join("&"))
    }

    /// Serialized form for storage as a property value
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
