//! CLI command definitions and argument parsing.

use clap::{Args, Parser, Subcommand};
use lineage_domain::{Authorizations, Evidence, PropertyRef, Visibility};
use std::path::PathBuf;

/// Lineage CLI - Record and query where graph facts came from.
#[derive(Debug, Parser)]
#[command(name = "lineage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value = "table")]
    pub format: CliFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Index configuration file (TOML)
    #[arg(short, long, global = true, env = "LINEAGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// SQLite graph file
    #[arg(long, global = true, env = "LINEAGE_DB", default_value = "lineage.db")]
    pub db: PathBuf,

    /// Caller authorizations (comma separated)
    #[arg(short, long, global = true, value_delimiter = ',')]
    pub auths: Vec<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Caller authorizations as given on the command line
    pub fn authorizations(&self) -> Authorizations {
        Authorizations::new(self.auths.iter().map(String::as_str).filter(|a| !a.is_empty()))
    }
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (IDs only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Index(IndexCommand),

    /// Print the effective index configuration
    Config,
}

/// Commands that run against the graph file.
#[derive(Debug, Subcommand)]
pub enum IndexCommand {
    /// Add or replace a vertex
    Vertex(VertexArgs),

    /// Add or replace an edge
    Edge(EdgeArgs),

    /// Attach evidence justifying a vertex, edge or property
    Attach(AttachArgs),

    /// Retract the evidence one source gave for an element
    Retract(RetractArgs),

    /// List provenance records around a vertex
    List(ListArgs),

    /// Show where an element's justification comes from
    Show(ShowArgs),

    /// Move a record to a new visibility
    Relabel(RelabelArgs),

    /// Hide a record from readers of a visibility
    Hide(HideArgs),

    /// Delete a record
    Delete(DeleteArgs),

    /// Push a vertex's new visibility source onto the edges it justified
    Downstream(DownstreamArgs),
}

/// Arguments for the vertex command.
#[derive(Debug, Args)]
pub struct VertexArgs {
    /// Vertex ID
    pub id: String,

    /// Text to store under the default text property
    #[arg(short, long)]
    pub text: Option<String>,

    /// Vertex visibility
    #[arg(long, default_value = "")]
    pub visibility: String,
}

/// Arguments for the edge command.
#[derive(Debug, Args)]
pub struct EdgeArgs {
    /// Edge ID
    pub id: String,

    /// Outgoing vertex ID
    pub out_vertex: String,

    /// Incoming vertex ID
    pub in_vertex: String,

    /// Edge label
    #[arg(short, long, default_value = "related")]
    pub label: String,

    /// Edge visibility
    #[arg(long, default_value = "")]
    pub visibility: String,

    /// Workspace holding the edge as a draft
    #[arg(short, long)]
    pub workspace: Option<String>,
}

/// Property instance named on the command line.
#[derive(Debug, Args)]
pub struct PropertyArgs {
    /// Justified property key
    #[arg(long, requires = "property_name")]
    pub property_key: Option<String>,

    /// Justified property name
    #[arg(long)]
    pub property_name: Option<String>,

    /// Justified property visibility
    #[arg(long, default_value = "")]
    pub property_visibility: String,
}

impl PropertyArgs {
    /// The property reference, when a property name was given
    pub fn property_ref(&self) -> Option<PropertyRef> {
        self.property_name.as_deref().map(|name| {
            PropertyRef::new(
                self.property_key.as_deref().unwrap_or_default(),
                name,
                self.property_visibility.as_str(),
            )
        })
    }
}

/// Arguments for the attach command.
#[derive(Debug, Args)]
pub struct AttachArgs {
    /// Vertex the evidence is about (ignored with --edge)
    pub target: String,

    /// Vertex holding the evidence text
    pub source: String,

    /// Span start
    #[arg(long)]
    pub start: i64,

    /// Span end
    #[arg(long)]
    pub end: i64,

    /// Evidence snippet
    #[arg(short, long)]
    pub snippet: Option<String>,

    /// Key of the source's text property
    #[arg(long, default_value = "")]
    pub text_key: String,

    /// Name of the source's text property (defaults to the configured one)
    #[arg(long)]
    pub text_name: Option<String>,

    /// Justify this edge instead of the target vertex
    #[arg(short, long)]
    pub edge: Option<String>,

    /// Edge the target vertex was reached through
    #[arg(long, conflicts_with = "edge")]
    pub through: Option<String>,

    #[command(flatten)]
    pub property: PropertyArgs,

    /// Record visibility
    #[arg(long, default_value = "")]
    pub visibility: String,
}

impl AttachArgs {
    /// Evidence described by the arguments
    pub fn evidence(&self, default_text_name: &str) -> Evidence {
        let name = self.text_name.as_deref().unwrap_or(default_text_name);
        let evidence = Evidence::new(
            self.source.as_str(),
            self.text_key.as_str(),
            Some(name),
            self.start,
            self.end,
        );
        match &self.snippet {
            Some(snippet) => evidence.with_snippet(snippet.as_str()),
            None => evidence,
        }
    }
}

/// Arguments for the retract command.
#[derive(Debug, Args)]
pub struct RetractArgs {
    /// Justified vertex or edge ID
    pub target: String,

    /// Source vertex ID
    pub source: String,

    /// Target is an edge ID
    #[arg(short, long)]
    pub edge: bool,

    /// Justified property key
    #[arg(long)]
    pub property_key: Option<String>,

    /// Justified property name
    #[arg(long)]
    pub property_name: Option<String>,
}

/// Which records to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ListBy {
    /// Records adjacent to the vertex either way
    Target,
    /// Records whose evidence lives in the vertex
    Source,
    /// Records resolving to the vertex
    Resolved,
    /// The vertex's own justifications
    Justification,
}

/// Arguments for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Vertex ID
    pub vertex: String,

    /// Relation to the vertex
    #[arg(short, long, value_enum, default_value = "target")]
    pub by: ListBy,
}

/// Arguments for the show command.
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Vertex or edge ID
    pub element: String,

    /// Element is an edge ID
    #[arg(short, long)]
    pub edge: bool,

    #[command(flatten)]
    pub property: PropertyArgs,
}

/// Arguments for the relabel command.
#[derive(Debug, Args)]
pub struct RelabelArgs {
    /// Record ID
    pub record: String,

    /// New visibility
    pub visibility: String,
}

/// Arguments for the hide command.
#[derive(Debug, Args)]
pub struct HideArgs {
    /// Record ID
    pub record: String,

    /// Visibility whose readers stop seeing the record
    pub hidden_visibility: String,
}

/// Arguments for the delete command.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Record ID
    pub record: String,
}

/// Arguments for the downstream command.
#[derive(Debug, Args)]
pub struct DownstreamArgs {
    /// Vertex whose justifications point at the edges
    pub vertex: String,

    /// New visibility source
    pub source: String,

    /// Workspace the change is made in
    #[arg(short, long)]
    pub workspace: String,
}

/// Parse a visibility argument, rejecting malformed expressions early
pub fn parse_visibility(expression: &str) -> crate::Result<Visibility> {
    let visibility = Visibility::new(expression);
    visibility
        .validate()
        .map_err(crate::CliError::InvalidInput)?;
    Ok(visibility)
}
