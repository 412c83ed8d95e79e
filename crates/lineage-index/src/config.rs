//! Configuration for the provenance index
//!
//! Loaded from TOML. Every field has a default, so an empty file is valid.

use lineage_domain::visibility::{is_valid_token, DEFAULT_MARKER};
use lineage_domain::Priority;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Index configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration field {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Provenance index configuration
///
/// # Examples
///
/// ```
/// use lineage_index::IndexConfig;
///
/// let config = IndexConfig::from_str("marker = \"mention\"").unwrap();
/// assert_eq!(config.marker, "mention");
/// assert_eq!(config.default_text_property_name, "http://visallo.org#text");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Reserved visibility token carried by every provenance record
    /// Default: "termMention"
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Text property assumed for records stored without a property name
    /// Default: "http://visallo.org#text"
    #[serde(default = "default_text_property_name")]
    pub default_text_property_name: String,

    /// Priority of downstream re-index events
    /// Default: high
    #[serde(default = "default_notification_priority")]
    pub notification_priority: Priority,
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

fn default_text_property_name() -> String {
    "http://visallo.org#text".to_string()
}

fn default_notification_priority() -> Priority {
    Priority::High
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            default_text_property_name: default_text_property_name(),
            notification_priority: default_notification_priority(),
        }
    }
}

impl IndexConfig {
    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_str(&contents)
    }

    /// Parse and validate configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let config: IndexConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_token(&self.marker) {
            return Err(ConfigError::Invalid {
                field: "marker",
                reason: format!("'{}' is not a bare visibility token", self.marker),
            });
        }
        if self.default_text_property_name.is_empty() {
            return Err(ConfigError::Invalid {
                field: "default_text_property_name",
                reason: "cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IndexConfig::default();
        assert_eq!(config.marker, "termMention");
        assert_eq!(config.notification_priority, Priority::High);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(IndexConfig::from_str("").unwrap(), IndexConfig::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let config = IndexConfig::from_str(
            r#"
            marker = "provenance"
            default_text_property_name = "body"
            notification_priority = "low"
            "#,
        )
        .unwrap();
        assert_eq!(config.marker, "provenance");
        assert_eq!(config.default_text_property_name, "body");
        assert_eq!(config.notification_priority, Priority::Low);
    }

    #[test]
    fn test_rejects_bad_marker() {
        for marker in ["", "a&b", "has space"] {
            let config = IndexConfig {
                marker: marker.to_string(),
                ..IndexConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::Invalid { field: "marker", .. })));
        }
    }

    #[test]
    fn test_rejects_malformed_toml() {
        assert!(matches!(
            IndexConfig::from_str("marker = "),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineage.toml");
        std::fs::write(&path, "notification_priority = \"normal\"\n").unwrap();
        let config = IndexConfig::from_file(&path).unwrap();
        assert_eq!(config.notification_priority, Priority::Normal);

        assert!(matches!(
            IndexConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileRead(_))
        ));
    }
}
