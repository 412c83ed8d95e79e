//! Lineage Domain Layer
//!
//! Value types and trait seams for the term-mention provenance index. Nothing
//! in this crate touches storage; backends and services live in other crates.
//!
//! ## Key Concepts
//!
//! - **Provenance record**: a graph vertex linking a justified element to the
//!   source vertex whose text supports it
//! - **Visibility**: a boolean label expression evaluated against
//!   [`Authorizations`]
//! - **Mention target**: what a record justifies (a vertex, an edge, or one
//!   property instance), modelled as a tagged enum
//! - **Identity**: a deterministic id derived from the logical fact, so
//!   repeated attachment overwrites instead of duplicating
//!
//! ## Architecture
//!
//! - [`traits::GraphStore`] is the only way the core reads or writes the graph
//! - [`traits::WorkQueue`] carries downstream re-index notifications
//! - [`traits::SnippetSanitizer`] cleans evidence snippets before they leave
//!   the index

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod element;
pub mod identity;
pub mod mention;
pub mod notification;
pub mod source_info;
pub mod traits;
pub mod visibility;
pub mod workspace;

// Re-exports for convenience
pub use element::{Direction, Edge, Element, ElementRef, Mutation, Property, Vertex};
pub use identity::{IdentityBuilder, HAS_MENTION_LABEL, RESOLVED_TO_LABEL};
pub use mention::{Evidence, ForType, MentionFor, PropertyRef, ProvenanceRecord};
pub use notification::{GraphPropertyEvent, Priority};
pub use source_info::SourceInfo;
pub use visibility::{Authorizations, Visibility, VisibilityAlgebra};
pub use workspace::{SandboxStatus, VisibilityJson};
