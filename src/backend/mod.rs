//! Document Backend
//!
//! A schemaless document store with live queries, behind a client surface:
//!
//! - **client**: connection parameters, process-wide initialization, handles
//! - **store**: collections, query evaluation and listener fan-out
//! - **batch**: atomic multi-document writes with field increments
//! - **types**: snapshots, queries and field writes
//! - **error**: error types
//!
//! # Example
//!
//! ```rust,no_run
//! use wordboard::backend::{initialize, BackendConfig, Direction, Query};
//!
//! # fn main() -> Result<(), wordboard::backend::BackendError> {
//! let config = BackendConfig {
//!     api_key: std::env::var("WORDBOARD_API_KEY").unwrap_or_default(),
//!     auth_domain: "my-project.firebaseapp.com".into(),
//!     project_id: "my-project".into(),
//!     storage_bucket: "my-project.appspot.com".into(),
//!     messaging_sender_id: "1234567890".into(),
//!     app_id: "1:1234567890:web:abc123".into(),
//! };
//!
//! let words = initialize(&config)?;
//! let top = words.query(&Query::order_by("value", Direction::Descending).limit(36))?;
//! println!("{} words", top.len());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod client;
pub mod error;
pub mod store;
pub mod types;

pub use batch::{CommitResult, WriteBatch, WriteOp};
pub use client::{
    initialize, initialize_client, BackendClient, BackendConfig, CollectionHandle,
    WORDS_COLLECTION,
};
pub use error::{BackendError, BackendResult};
pub use store::{DocumentStore, ListenerId, StoreStats};
pub use types::{
    Direction, DocumentSnapshot, FieldValue, Fields, MissingField, Query, QuerySnapshot,
};
