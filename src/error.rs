//! Import error types

use thiserror::Error;

/// Errors raised while importing a collections document.
///
/// Every variant is reported to the user and leaves stored state untouched.
#[derive(Debug, Error)]
pub enum ImportError {
    /// The selected file could not be read.
    #[error("Failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// The file is not valid JSON.
    #[error("Failed to import collections: {0}")]
    Parse(#[source] serde_json::Error),

    /// Valid JSON, but neither a collections list nor a Postman collection.
    #[error("Invalid format: Expected a list of collections or a Postman collection.")]
    Format(#[source] serde_json::Error),
}
