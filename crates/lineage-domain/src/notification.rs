//! Downstream notification events

use serde::{Deserialize, Serialize};

/// Work-queue priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Background re-indexing
    Low,

    /// Default priority
    #[default]
    Normal,

    /// User-visible changes
    High,
}

/// A visibility change that other subsystems must re-index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphPropertyEvent {
    /// Changed element
    pub element_id: String,

    /// Changed property key, if a single instance changed
    pub property_key: Option<String>,

    /// Changed property name
    pub property_name: String,

    /// Workspace the change happened in
    pub workspace_id: Option<String>,

    /// New visibility source
    pub visibility_source: Option<String>,

    /// Queue priority
    pub priority: Priority,
}
