//! Vertex and edge commands.
//!
//! Provenance can only be attached between elements that exist, so the CLI
//! carries just enough graph editing to set them up.

use crate::cli::{parse_visibility, EdgeArgs, VertexArgs};
use crate::commands::CliIndex;
use crate::error::Result;
use crate::output::Formatter;
use lineage_domain::traits::GraphStore;
use lineage_domain::workspace::VISIBILITY_JSON_PROPERTY;
use lineage_domain::{Authorizations, Mutation, Property, Visibility, VisibilityJson};

/// Execute the vertex command.
pub fn execute_vertex(
    args: VertexArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    let visibility = parse_visibility(&args.visibility)?;
    let properties = args
        .text
        .map(|text| {
            Property::new(
                "",
                index.config().default_text_property_name.as_str(),
                text,
                visibility.clone(),
            )
        })
        .into_iter()
        .collect();

    apply(
        index,
        Mutation::PutVertex {
            id: args.id.clone(),
            visibility,
            properties,
        },
        authorizations,
    )?;
    Ok(written(formatter, "Vertex", &args.id))
}

/// Execute the edge command.
///
/// The edge's visibility is derived from its visibility JSON, so a
/// workspace draft is readable only inside that workspace.
pub fn execute_edge(
    args: EdgeArgs,
    index: &CliIndex,
    authorizations: &Authorizations,
    formatter: &Formatter,
) -> Result<String> {
    parse_visibility(&args.visibility)?;
    let json = VisibilityJson::with_source_and_workspace(&args.visibility, args.workspace.as_deref());

    apply(
        index,
        Mutation::PutEdge {
            id: args.id.clone(),
            label: args.label,
            out_vertex_id: args.out_vertex,
            in_vertex_id: args.in_vertex,
            visibility: json.to_visibility(),
            properties: vec![Property::new(
                "",
                VISIBILITY_JSON_PROPERTY,
                json.to_value()?,
                Visibility::empty(),
            )],
        },
        authorizations,
    )?;
    Ok(written(formatter, "Edge", &args.id))
}

fn apply(index: &CliIndex, mutation: Mutation, authorizations: &Authorizations) -> Result<()> {
    index.store().apply(&[mutation], authorizations)?;
    index.store().flush()?;
    Ok(())
}

fn written(formatter: &Formatter, kind: &str, id: &str) -> String {
    match formatter.format() {
        crate::cli::CliFormat::Table => formatter.success(&format!("{} written: {}", kind, id)),
        _ => id.to_string(),
    }
}
