//! Backend error types
//!
//! Defines all errors that can occur between the client and the document store.

use thiserror::Error;

/// Errors that can occur in the backend client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Connection parameters are missing or malformed
    #[error("Configuration error: {field}: {reason}")]
    Configuration { field: &'static str, reason: String },

    /// The live connection to the store was lost
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    /// Query parameters are out of range
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Document identifier is empty or contains a path separator
    #[error("Invalid document id: {0:?}")]
    InvalidDocumentId(String),

    /// Update targeted a document that does not exist
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The client has been terminated
    #[error("Backend client terminated")]
    Terminated,

    /// Store lock was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),
}

impl BackendError {
    /// Build a configuration error for a named field
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        BackendError::Configuration {
            field,
            reason: reason.into(),
        }
    }

    /// Whether this error is transient and handled by the client layer
    pub fn is_transient(&self) -> bool {
        matches!(self, BackendError::Connectivity(_))
    }
}

/// Result type alias for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BackendError::config("project_id", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Configuration error: project_id: must not be empty"
        );

        let err = BackendError::NotFound {
            collection: "words".to_string(),
            id: "get".to_string(),
        };
        assert_eq!(err.to_string(), "Document not found: words/get");
    }

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::Connectivity("closed".to_string()).is_transient());
        assert!(!BackendError::Terminated.is_transient());
        assert!(!BackendError::config("app_id", "missing").is_transient());
    }
}
