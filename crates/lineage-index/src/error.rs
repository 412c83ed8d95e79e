//! Error types for provenance operations

use thiserror::Error;

/// Errors that can occur during provenance operations
///
/// Lookups that find nothing are not errors; they return `None` or an empty
/// list. `NotFound` is reserved for mutations that address something absent.
#[derive(Error, Debug)]
pub enum ProvenanceError {
    /// Required identity components are missing or inconsistent
    #[error("Validation error: {0}")]
    Validation(String),

    /// An index invariant is broken (e.g. two records where one was expected)
    #[error("Fatal data error: {0}")]
    FatalData(String),

    /// Graph store failure
    #[error("Store error: {0}")]
    Store(String),

    /// A mutation addressed an element that does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProvenanceError {
    /// Wrap a backend error
    pub(crate) fn store(e: impl std::fmt::Display) -> Self {
        ProvenanceError::Store(e.to_string())
    }
}
