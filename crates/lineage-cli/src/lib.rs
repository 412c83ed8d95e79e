//! Lineage CLI library.
//!
//! Command-line access to a provenance index stored in a SQLite graph file:
//! argument parsing, command execution and output formatting.

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;

pub use cli::{Cli, Command, IndexCommand};
pub use commands::{execute, execute_config, open_index, CliIndex};
pub use error::{CliError, Result};
pub use output::Formatter;
