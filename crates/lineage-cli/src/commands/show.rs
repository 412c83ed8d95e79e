//! Show command implementation.

use crate::cli::{parse_visibility, ShowArgs};
use crate::commands::{require_edge, CliIndex};
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::Authorizations;

/// Execute the show command.
///
/// Projects the single justification of a vertex, an edge, or one of their
/// properties.
pub fn execute_show(
    args: ShowArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let property_visibility = parse_visibility(&args.property.property_visibility)?;
    let key = args.property.property_key.as_deref().unwrap_or_default();

    let info = match (args.edge, args.property.property_name.as_deref()) {
        (false, None) => index.source_info_for_vertex(&args.element, authorizations)?,
        (false, Some(name)) => index.source_info_for_vertex_property(
            &args.element,
            key,
            name,
            &property_visibility,
            authorizations,
        )?,
        (true, property) => {
            let edge = require_edge(index, &args.element, authorizations)?;
            match property {
                None => index.source_info_for_edge(&edge, authorizations)?,
                Some(name) => index.source_info_for_edge_property(
                    &edge,
                    key,
                    name,
                    &property_visibility,
                    authorizations,
                )?,
            }
        }
    };

    formatter.format_source_info(info.as_ref())
}
