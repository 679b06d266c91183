//! Atomic write batches
//!
//! A `WriteBatch` collects writes against one or more collections and commits
//! them as a single change: listeners see one snapshot per commit, never an
//! intermediate state.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::error::BackendResult;
use super::store::DocumentStore;
use super::types::{FieldValue, Fields};
use super::CollectionHandle;

/// A single staged write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Create or replace the whole document
    Set {
        collection: String,
        id: String,
        fields: Fields,
    },
    /// Create the document if needed and write only the named fields
    Merge {
        collection: String,
        id: String,
        fields: Vec<(String, FieldValue)>,
    },
    /// Write the named fields of an existing document
    Update {
        collection: String,
        id: String,
        fields: Vec<(String, FieldValue)>,
    },
    /// Remove the document if present
    Delete { collection: String, id: String },
}

impl WriteOp {
    pub fn collection(&self) -> &str {
        match self {
            WriteOp::Set { collection, .. }
            | WriteOp::Merge { collection, .. }
            | WriteOp::Update { collection, .. }
            | WriteOp::Delete { collection, .. } => collection,
        }
    }
}

/// Outcome of a committed batch
#[derive(Debug, Clone, Serialize)]
pub struct CommitResult {
    /// Number of writes applied
    pub writes: usize,
    /// Number of listeners that received a new snapshot
    pub notified: usize,
    pub commit_time: DateTime<Utc>,
}

/// Collects writes and commits them atomically
pub struct WriteBatch {
    store: Arc<DocumentStore>,
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub(crate) fn new(store: Arc<DocumentStore>) -> Self {
        Self {
            store,
            ops: Vec::new(),
        }
    }

    pub fn set(&mut self, target: &CollectionHandle, id: impl Into<String>, fields: Fields) -> &mut Self {
        self.ops.push(WriteOp::Set {
            collection: target.name().to_string(),
            id: id.into(),
            fields,
        });
        self
    }

    pub fn set_merge<I, K>(&mut self, target: &CollectionHandle, id: impl Into<String>, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.ops.push(WriteOp::Merge {
            collection: target.name().to_string(),
            id: id.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        });
        self
    }

    pub fn update<I, K>(&mut self, target: &CollectionHandle, id: impl Into<String>, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, FieldValue)>,
        K: Into<String>,
    {
        self.ops.push(WriteOp::Update {
            collection: target.name().to_string(),
            id: id.into(),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        });
        self
    }

    pub fn delete(&mut self, target: &CollectionHandle, id: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete {
            collection: target.name().to_string(),
            id: id.into(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Apply every staged write, or none of them
    pub fn commit(self) -> BackendResult<CommitResult> {
        self.store.commit(self.ops)
    }
}
