//! Attach command implementation.

use crate::cli::{parse_visibility, AttachArgs};
use crate::commands::{require_edge, CliIndex};
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::{Authorizations, MentionFor};

/// Execute the attach command.
pub fn execute_attach(
    args: AttachArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let visibility = parse_visibility(&args.visibility)?;
    let evidence = args.evidence(&index.config().default_text_property_name);
    let property = args.property.property_ref();

    let record = match &args.edge {
        Some(edge_id) => {
            let edge = require_edge(index, edge_id, authorizations)?;
            index.attach_to_edge(&edge, property, &evidence, &visibility, authorizations)?
        }
        None => {
            let mention_for = match property {
                Some(property) => MentionFor::property(args.target.as_str(), property),
                None => MentionFor::vertex(args.target.as_str()),
            };
            index.attach(
                &args.target,
                mention_for,
                args.through.as_deref(),
                &evidence,
                &visibility,
                authorizations,
            )?
        }
    };

    formatter.format_record(&record)
}
