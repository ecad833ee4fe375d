//! Error types for YAML loading and emission.

use thiserror::Error;

/// Result type alias for config-template-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or emitting YAML.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// YAML syntax error reported by the scanner.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The document parsed but its shape is unusable.
    #[error("Invalid YAML structure: {0}")]
    InvalidStructure(String),

    /// The emitter failed to write the document.
    #[error("Emit error: {0}")]
    Emit(String),
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<yaml_rust2::EmitError> for Error {
    fn from(err: yaml_rust2::EmitError) -> Self {
        Error::Emit(err.to_string())
    }
}
