//! List command implementation.

use crate::cli::{ListArgs, ListBy};
use crate::commands::CliIndex;
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::Authorizations;

/// Execute the list command.
pub fn execute_list(
    args: ListArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let records = match args.by {
        ListBy::Target => index.by_target(&args.vertex, authorizations)?,
        ListBy::Source => index.by_has_mention_source(&args.vertex, authorizations)?,
        ListBy::Resolved => index.resolved_to(&args.vertex, authorizations)?,
        ListBy::Justification => index.for_vertex_justification(&args.vertex, authorizations)?,
    };
    formatter.format_records(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{add_vertex, open, quiet};
    use lineage_domain::{Evidence, MentionFor, Visibility};
    use tempfile::TempDir;

    #[test]
    fn test_list_by_relation() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        for id in ["v1", "v2", "v3"] {
            add_vertex(&index, id);
        }
        let auths = Authorizations::empty();
        let evidence = Evidence::new("v2", "", Some("http://visallo.org#text"), 0, 4);
        let record = index
            .attach("v1", MentionFor::vertex("v1"), None, &evidence, &Visibility::empty(), &auths)
            .unwrap();

        let list = |vertex: &str, by| {
            let args = ListArgs {
                vertex: vertex.to_string(),
                by,
            };
            execute_list(args, &index, &auths, &quiet()).unwrap()
        };
        assert_eq!(list("v1", ListBy::Target), record.id);
        assert_eq!(list("v2", ListBy::Source), record.id);
        assert_eq!(list("v1", ListBy::Resolved), record.id);
        assert_eq!(list("v1", ListBy::Justification), record.id);
        assert!(list("v3", ListBy::Target).is_empty());
    }
}
