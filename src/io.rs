//! JSON file access.
//!
//! Every input and output of the pipeline is a JSON document on disk.
//! These helpers attach the file path to I/O and parse failures.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::DataError;

/// Reads and parses a JSON file.
pub fn load_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, DataError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), bytes = text.len(), "Loaded JSON");

    serde_json::from_str(&text).map_err(|source| DataError::Json {
        context: path.display().to_string(),
        source,
    })
}

/// Writes a value as indented JSON, replacing any existing file.
pub fn write_json_pretty<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), DataError> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(value).map_err(|source| DataError::Json {
        context: path.display().to_string(),
        source,
    })?;
    fs::write(path, text).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })
}
