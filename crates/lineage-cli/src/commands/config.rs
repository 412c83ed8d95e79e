//! Config command implementation.

use crate::error::Result;
use lineage_index::IndexConfig;

/// Execute the config command.
///
/// Prints the configuration the other commands would run with, as TOML.
pub fn execute_config(config: &IndexConfig) -> Result<String> {
    config.validate()?;
    Ok(toml::to_string_pretty(config)?)
}
