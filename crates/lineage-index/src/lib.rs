//! Lineage Provenance Index
//!
//! Records why the graph believes what it believes. Every derived vertex,
//! edge or property can be linked to the text span that supports it through
//! a provenance record:
//!
//! ```text
//! source vertex --HAS_MENTION--> record --RESOLVED_TO--> target vertex
//! ```
//!
//! # Overview
//!
//! - **Store operations**: attach, retract, relabel, delete, hide
//! - **Queries**: from the source side, the target side, or an edge
//! - **Downstream relabel**: push a vertex's new visibility source onto the
//!   edges it justified, then notify re-indexers through a [`WorkQueue`]
//! - **Justification**: free text or structured, never both
//! - **Projection**: records to [`SourceInfo`] with sanitized snippets
//!
//! Records are labelled `(visibility)&(marker)`. Callers never supply the
//! marker; the index adds it to their authorizations on every call.
//!
//! [`WorkQueue`]: lineage_domain::traits::WorkQueue
//! [`SourceInfo`]: lineage_domain::SourceInfo

#![warn(missing_docs)]

mod config;
mod downstream;
mod error;
mod index;
mod justification;
mod lifecycle;
mod metrics;
pub mod predicate;
mod projector;
mod query;
mod queue;
mod sanitize;

pub use config::{ConfigError, IndexConfig};
pub use error::ProvenanceError;
pub use index::ProvenanceIndex;
pub use justification::{Justification, JUSTIFICATION_PROPERTY};
pub use metrics::IndexMetrics;
pub use predicate::MentionFilter;
pub use queue::{ChannelWorkQueue, QueueClosed};
pub use sanitize::HtmlSnippetSanitizer;
