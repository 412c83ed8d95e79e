//! Retract command implementation.

use crate::cli::RetractArgs;
use crate::commands::{require_edge, CliIndex};
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::Authorizations;

/// Execute the retract command.
///
/// Retracting evidence that was never attached is not an error.
pub fn execute_retract(
    args: RetractArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let key = args.property_key.as_deref();
    let name = args.property_name.as_deref();

    let retracted = if args.edge {
        let edge = require_edge(index, &args.target, authorizations)?;
        index.retract_from_edge(&edge, &args.source, key, name, authorizations)?
    } else {
        index.retract(&args.target, &args.source, key, name, authorizations)?
    };

    Ok(match (retracted, formatter.format()) {
        (Some(id), crate::cli::CliFormat::Table) => formatter.success(&format!("Retracted {}", id)),
        (Some(id), _) => id,
        (None, crate::cli::CliFormat::Table) => formatter.warning(&format!(
            "No evidence from {} for {}",
            args.source, args.target
        )),
        (None, _) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{add_vertex, open, quiet};
    use lineage_domain::{Evidence, MentionFor, Visibility};
    use tempfile::TempDir;

    fn retract_args(target: &str, source: &str) -> RetractArgs {
        RetractArgs {
            target: target.to_string(),
            source: source.to_string(),
            edge: false,
            property_key: None,
            property_name: None,
        }
    }

    #[test]
    fn test_retract_then_miss() {
        let dir = TempDir::new().unwrap();
        let index = open(&dir);
        add_vertex(&index, "v1");
        add_vertex(&index, "v2");
        let auths = Authorizations::empty();

        let evidence = Evidence::new("v2", "", Some("http://visallo.org#text"), 10, 25);
        let record = index
            .attach("v1", MentionFor::vertex("v1"), None, &evidence, &Visibility::empty(), &auths)
            .unwrap();

        let output = execute_retract(retract_args("v1", "v2"), &index, &auths, &quiet()).unwrap();
        assert_eq!(output, record.id);
        assert!(index.for_vertex_justification("v1", &auths).unwrap().is_empty());

        let again = execute_retract(retract_args("v1", "v2"), &index, &auths, &quiet()).unwrap();
        assert!(again.is_empty());
    }
}
