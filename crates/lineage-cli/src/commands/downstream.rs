//! Downstream command implementation.

use crate::cli::DownstreamArgs;
use crate::commands::CliIndex;
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::Authorizations;

/// Execute the downstream command.
///
/// Returns the ids of the edges that were rewritten.
pub fn execute_downstream(
    args: DownstreamArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let edge_ids = index.relabel_downstream_edges(
        &args.vertex,
        &args.source,
        &args.workspace,
        authorizations,
    )?;
    formatter.format_ids("edge(s)", &edge_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::EdgeArgs;
    use crate::commands::execute_edge;
    use crate::commands::test_support::{add_vertex, open, quiet};
    use lineage_domain::traits::GraphStore;
    use lineage_domain::{Evidence, MentionFor, Visibility};
    use tempfile::TempDir;

    #[test]
    fn test_downstream_relabels_justified_edge() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        for id in ["v1", "v2", "v3"] {
            add_vertex(&index, id);
        }
        let auths = Authorizations::empty();
        let edge = EdgeArgs {
            id: "e1".to_string(),
            out_vertex: "v1".to_string(),
            in_vertex: "v3".to_string(),
            label: "worksFor".to_string(),
            visibility: String::new(),
            workspace: None,
        };
        execute_edge(edge, &index, &auths, &quiet()).unwrap();

        let evidence = Evidence::new("v2", "", Some("http://visallo.org#text"), 10, 25);
        index
            .attach("v1", MentionFor::vertex("v1"), Some("e1"), &evidence, &Visibility::empty(), &auths)
            .unwrap();

        let args = DownstreamArgs {
            vertex: "v1".to_string(),
            source: "secret".to_string(),
            workspace: "ws1".to_string(),
        };
        let output = execute_downstream(args, &index, &auths, &quiet()).unwrap();
        assert_eq!(output, "e1");

        assert!(index.store().get_edge("e1", &auths).unwrap().is_none());
        let secret = Authorizations::new(["secret"]);
        let edge = index.store().get_edge("e1", &secret).unwrap().unwrap();
        assert_eq!(edge.visibility.as_str(), "(secret)");
    }
}
