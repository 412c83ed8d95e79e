//! Commands acting on one stored record: relabel, hide, delete.

use crate::cli::{parse_visibility, DeleteArgs, HideArgs, RelabelArgs};
use crate::commands::{require_record, CliIndex};
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::Authorizations;

/// Execute the relabel command.
pub fn execute_relabel(
    args: RelabelArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let visibility = parse_visibility(&args.visibility)?;
    let record = require_record(index, &args.record, authorizations)?;
    let updated = index.relabel(&record, &visibility, authorizations)?;
    formatter.format_record(&updated)
}

/// Execute the hide command.
pub fn execute_hide(
    args: HideArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let hidden = parse_visibility(&args.hidden_visibility)?;
    let record = require_record(index, &args.record, authorizations)?;
    index.hide(&record, &hidden, authorizations)?;
    Ok(done(formatter, "Hidden", &record.id))
}

/// Execute the delete command.
pub fn execute_delete(
    args: DeleteArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let record = require_record(index, &args.record, authorizations)?;
    index.delete(&record, authorizations)?;
    Ok(done(formatter, "Deleted", &record.id))
}

fn done(formatter: &Formatter, action: &str, id: &str) -> String {
    match formatter.format() {
        crate::cli::CliFormat::Table => formatter.success(&format!("{} {}", action, id)),
        _ => id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{add_vertex, open, quiet};
    use crate::error::CliError;
    use lineage_domain::{Evidence, MentionFor, ProvenanceRecord, Visibility};
    use tempfile::TempDir;

    fn attached(index: &CliIndex, visibility: &str) -> ProvenanceRecord {
        add_vertex(index, "v1");
        add_vertex(index, "v2");
        let evidence = Evidence::new("v2", "", Some("http://visallo.org#text"), 10, 25);
        index
            .attach(
                "v1",
                MentionFor::vertex("v1"),
                None,
                &evidence,
                &Visibility::new(visibility),
                &Authorizations::new(["a", "b"]),
            )
            .unwrap()
    }

    #[test]
    fn test_relabel_moves_record() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let record = attached(&index, "a");

        let args = RelabelArgs {
            record: record.id.clone(),
            visibility: "b".to_string(),
        };
        let output = execute_relabel(args, &index, &Authorizations::new(["a", "b"]), &quiet()).unwrap();
        assert_eq!(output, record.id);

        assert!(index.find_by_id(&record.id, &Authorizations::new(["a"])).unwrap().is_none());
        assert!(index.find_by_id(&record.id, &Authorizations::new(["b"])).unwrap().is_some());
    }

    #[test]
    fn test_relabel_unknown_record() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let args = RelabelArgs {
            record: "missing".to_string(),
            visibility: "b".to_string(),
        };
        let err = execute_relabel(args, &index, &Authorizations::empty(), &quiet()).unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));
    }

    #[test]
    fn test_hide_and_delete() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        let record = attached(&index, "");
        let auths = Authorizations::new(["ws1"]);

        let args = HideArgs {
            record: record.id.clone(),
            hidden_visibility: "ws1".to_string(),
        };
        execute_hide(args, &index, &auths, &quiet()).unwrap();
        assert!(index.find_by_id(&record.id, &auths).unwrap().is_none());
        assert!(index.find_by_id(&record.id, &Authorizations::empty()).unwrap().is_some());

        let args = DeleteArgs {
            record: record.id.clone(),
        };
        execute_delete(args, &index, &Authorizations::empty(), &quiet()).unwrap();
        assert!(index.find_by_id(&record.id, &Authorizations::empty()).unwrap().is_none());
    }
}
