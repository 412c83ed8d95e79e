//! Command implementations.
//!
//! Each command runs against an open index and returns the text to print.

pub mod attach;
pub mod config;
pub mod downstream;
pub mod graph;
pub mod list;
pub mod records;
pub mod retract;
pub mod show;

pub use self::attach::execute_attach;
pub use self::config::execute_config;
pub use self::downstream::execute_downstream;
pub use self::graph::{execute_edge, execute_vertex};
pub use self::list::execute_list;
pub use self::records::{execute_delete, execute_hide, execute_relabel};
pub use self::retract::execute_retract;
pub use self::show::execute_show;

use crate::cli::IndexCommand;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use lineage_domain::traits::GraphStore;
use lineage_domain::{Authorizations, Edge, GraphPropertyEvent, ProvenanceRecord};
use lineage_graph::SqliteGraph;
use lineage_index::{ChannelWorkQueue, IndexConfig, ProvenanceIndex};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;

/// Index type the CLI works with.
pub type CliIndex = ProvenanceIndex<SqliteGraph, ChannelWorkQueue>;

/// Open the graph file and build an index over it.
///
/// The receiver collects re-index events published while the command runs.
pub fn open_index(
    db: &Path,
    config: IndexConfig,
) -> Result<(CliIndex, UnboundedReceiver<GraphPropertyEvent>)> {
    config.validate()?;
    let graph = Arc::new(SqliteGraph::new(db)?);
    let (queue, events) = ChannelWorkQueue::new();
    let index = ProvenanceIndex::new(graph, Arc::new(queue), config)?;
    tracing::debug!("Opened provenance index at {}", db.display());
    Ok((index, events))
}

/// Run one command against the index.
pub fn execute(
    command: IndexCommand,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    match command {
        IndexCommand::Vertex(args) => execute_vertex(args, index, authorizations, formatter),
        IndexCommand::Edge(args) => execute_edge(args, index, authorizations, formatter),
        IndexCommand::Attach(args) => execute_attach(args, index, authorizations, formatter),
        IndexCommand::Retract(args) => execute_retract(args, index, authorizations, formatter),
        IndexCommand::List(args) => execute_list(args, index, authorizations, formatter),
        IndexCommand::Show(args) => execute_show(args, index, authorizations, formatter),
        IndexCommand::Relabel(args) => execute_relabel(args, index, authorizations, formatter),
        IndexCommand::Hide(args) => execute_hide(args, index, authorizations, formatter),
        IndexCommand::Delete(args) => execute_delete(args, index, authorizations, formatter),
        IndexCommand::Downstream(args) => {
            execute_downstream(args, index, authorizations, formatter)
        }
    }
}

/// Look up a record the caller can read.
pub(crate) fn require_record(
    index: &CliIndex,
    record_id: &str,
    authorizations: &Authorizations,
) -> Result<ProvenanceRecord> {
    index
        .find_by_id(record_id, authorizations)?
        .ok_or_else(|| CliError::NotFound(format!("provenance record {}", record_id)))
}

/// Look up an edge the caller can read.
pub(crate) fn require_edge(
    index: &CliIndex,
    edge_id: &str,
    authorizations: &Authorizations,
) -> Result<Edge> {
    index
        .store()
        .get_edge(edge_id, authorizations)?
        .ok_or_else(|| CliError::NotFound(format!("edge {}", edge_id)))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::cli::{CliFormat, VertexArgs};
    use tempfile::TempDir;

    pub fn open(dir: &TempDir) -> CliIndex {
        let (index, _events) = open_index(&dir.path().join("lineage.db"), IndexConfig::default())
            .unwrap();
        index
    }

    pub fn quiet() -> Formatter {
        Formatter::new(CliFormat::Quiet, false)
    }

    pub fn add_vertex(index: &CliIndex, id: &str) {
        let args = VertexArgs {
            id: id.to_string(),
            text: Some("Acme Corp makes anvils".to_string()),
            visibility: String::new(),
        };
        execute_vertex(args, index, &Authorizations::empty(), &quiet()).unwrap();
    }
}
