//! Error types for merge and diff operations.

use thiserror::Error;

/// Result type alias for config-template operations.
pub type Result<T> = std::result::Result<T, ConfigTemplateError>;

/// Errors that can occur while merging overrides into a document.
///
/// Every error is raised before any output is assembled, so a failed merge
/// never yields a partially written document.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigTemplateError {
    /// The format selector is not one of `ini`, `json` or `yaml`.
    #[error("No valid config type was provided: '{name}'. Valid options are ini, yaml, or json.")]
    UnknownFormat { name: String },

    /// An override addressed a section that the document does not have.
    #[error(
        "Section '{section}' not found. Try being more explicit with your override data; section names are case-sensitive."
    )]
    MissingSection { section: String },

    /// A prefix lookup matched more than one stored key.
    #[error("Index search for '{prefix}' returned {matches} entries, expected at most one")]
    AmbiguousKey { prefix: String, matches: usize },

    /// The underlying JSON or YAML decoder rejected the document.
    #[error("Failed to parse {format} document: {message}")]
    MalformedInput { format: String, message: String },

    /// A positional insert was given a position outside the map.
    #[error("Index {index} is out of range for a map with {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// An override tag could not be interpreted.
    #[error("Invalid tag '!{tag}': {message}")]
    InvalidTag { tag: String, message: String },

    /// Serializing the merged tree failed.
    #[error("Failed to serialize {format} document: {message}")]
    Emit { format: String, message: String },
}

impl ConfigTemplateError {
    pub(crate) fn malformed(format: &str, message: impl ToString) -> Self {
        ConfigTemplateError::MalformedInput {
            format: format.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn emit(format: &str, message: impl ToString) -> Self {
        ConfigTemplateError::Emit {
            format: format.to_string(),
            message: message.to_string(),
        }
    }
}
