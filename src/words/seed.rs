//! Startup seeding from a JSON file
//!
//! The file holds an array of word documents:
//!
//! ```json
//! [
//!   {"name": "get", "value": 120, "python_value": 70, "java_value": 50},
//!   {"id": "set", "name": "set", "value": 80}
//! ]
//! ```
//!
//! `id` is optional and defaults to `name`. Documents are written with
//! overwrite semantics in a single batch.

use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::backend::{BackendError, CollectionHandle, CommitResult, Fields};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read seed file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse seed file: {0}")]
    Parse(String),

    #[error("Seed entry {index}: {reason}")]
    InvalidEntry { index: usize, reason: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Parse seed documents from JSON text into `(id, fields)` pairs
pub fn parse_seed(content: &str) -> Result<Vec<(String, Fields)>, SeedError> {
    let entries: Vec<Value> =
        serde_json::from_str(content).map_err(|e| SeedError::Parse(e.to_string()))?;

    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let Value::Object(mut fields) = entry else {
                return Err(SeedError::InvalidEntry {
                    index,
                    reason: "expected an object".to_string(),
                });
            };

            let id = match fields.remove("id") {
                Some(Value::String(id)) => id,
                Some(_) => {
                    return Err(SeedError::InvalidEntry {
                        index,
                        reason: "id must be a string".to_string(),
                    })
                }
                None => fields
                    .get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| SeedError::InvalidEntry {
                        index,
                        reason: "missing id and name".to_string(),
                    })?,
            };

            Ok((id, fields))
        })
        .collect()
}

/// Load `path` and write its documents into `words`
pub fn seed_from_file(words: &CollectionHandle, path: &Path) -> Result<CommitResult, SeedError> {
    let content = std::fs::read_to_string(path).map_err(|e| SeedError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let docs = parse_seed(&content)?;
    let count = docs.len();

    let mut batch = words.batch();
    for (id, fields) in docs {
        batch.set(words, id, fields);
    }
    let result = batch.commit()?;

    tracing::info!(path = ?path, documents = count, "Seeded words collection");
    Ok(result)
}
