//! Output formatting for the CLI.

use crate::cli::CliFormat;
use crate::error::Result;
use colored::*;
use lineage_domain::{ProvenanceRecord, SourceInfo};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: CliFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: CliFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Format provenance records.
    pub fn format_records(&self, records: &[ProvenanceRecord]) -> Result<String> {
        match self.format {
            CliFormat::Json => self.format_records_json(records),
            CliFormat::Table => Ok(self.format_records_table(records)),
            CliFormat::Quiet => Ok(records
                .iter()
                .map(|r| r.id.as_str())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }

    /// Format a single record.
    pub fn format_record(&self, record: &ProvenanceRecord) -> Result<String> {
        self.format_records(std::slice::from_ref(record))
    }

    fn format_records_json(&self, records: &[ProvenanceRecord]) -> Result<String> {
        let json_records: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                let property = r.target.property_ref().map(|p| {
                    serde_json::json!({
                        "key": p.key,
                        "name": p.name,
                        "visibility": p.visibility
                    })
                });
                serde_json::json!({
                    "id": r.id,
                    "for_type": r.for_type().as_str(),
                    "element_id": r.for_element_id(),
                    "property": property,
                    "resolved_edge_id": r.resolved_edge_id,
                    "text_property_key": r.text_property_key,
                    "text_property_name": r.text_property_name,
                    "start_offset": r.start_offset,
                    "end_offset": r.end_offset,
                    "snippet": r.snippet,
                    "visibility": r.visibility.as_str()
                })
            })
            .collect();

        Ok(serde_json::to_string_pretty(&json_records)?)
    }

    fn format_records_table(&self, records: &[ProvenanceRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No provenance records found.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["ID", "For", "Element", "Property", "Span", "Snippet", "Visibility"]);

        for record in records {
            let property = record
                .target
                .property_ref()
                .map(|p| format!("{}:{}", p.key, p.name))
                .unwrap_or_default();
            let span = format!("[{}, {})", record.start_offset, record.end_offset);
            builder.push_record([
                record.id.as_str(),
                record.for_type().as_str(),
                record.for_element_id(),
                property.as_str(),
                span.as_str(),
                record.snippet.as_deref().unwrap_or(""),
                record.visibility.as_str(),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format projected source info.
    pub fn format_source_info(&self, info: Option<&SourceInfo>) -> Result<String> {
        let Some(info) = info else {
            return Ok(match self.format {
                CliFormat::Json => "null".to_string(),
                CliFormat::Quiet => String::new(),
                CliFormat::Table => self.colorize("No justification found.", "yellow"),
            });
        };

        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(info)?),
            CliFormat::Quiet => Ok(info.source_element_id.clone()),
            CliFormat::Table => {
                let span = format!("[{}, {})", info.start_offset, info.end_offset);
                let mut builder = Builder::default();
                builder.push_record(["Source", info.source_element_id.as_str()]);
                builder.push_record(["Text key", info.text_property_key.as_str()]);
                builder.push_record([
                    "Text name",
                    info.text_property_name.as_deref().unwrap_or("(legacy)"),
                ]);
                builder.push_record(["Span", span.as_str()]);
                builder.push_record(["Snippet", info.snippet.as_deref().unwrap_or("")]);

                let mut table = builder.build();
                table.with(Style::rounded());
                Ok(table.to_string())
            }
        }
    }

    /// Format a list of element IDs.
    pub fn format_ids(&self, label: &str, ids: &[String]) -> Result<String> {
        match self.format {
            CliFormat::Json => Ok(serde_json::to_string_pretty(ids)?),
            CliFormat::Quiet => Ok(ids.join("\n")),
            CliFormat::Table if ids.is_empty() => Ok(self.info(&format!("No {} changed", label))),
            CliFormat::Table => Ok(self.bulk_result(&format!("Relabelled {}", ids.len()), label)),
        }
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format bulk operation result.
    pub fn bulk_result(&self, operation: &str, what: &str) -> String {
        self.success(&format!("{} {}", operation, what))
    }

    /// Output format in use.
    pub fn format(&self) -> CliFormat {
        self.format
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            _ => text.to_string(),
        }
    }
}
