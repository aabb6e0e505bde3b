//! Error type for malformed or missing input data.
//!
//! Construction of the hierarchy, overlap matrix, and assignment constraints
//! propagates `DataError` to the caller. The schedule verifier never does:
//! it downgrades bad references to findings (see [`crate::verifier`]).

use std::path::PathBuf;

use crate::validation::ValidationError;

/// Malformed or missing required input.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Group records failed structural validation.
    #[error("invalid group data: {}", join_messages(.0))]
    Validation(Vec<ValidationError>),

    /// A query or record referenced a group id that was never declared.
    #[error("unknown student group: {0}")]
    UnknownGroup(String),

    /// A declared parallel pair names a group that does not exist.
    #[error("parallel pair ({first}, {second}) references an unknown group")]
    UnknownParallelPair { first: String, second: String },

    /// Reading or writing a data file failed.
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed or produced.
    #[error("invalid JSON in {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
