//! Backend client adapter
//!
//! Validates connection parameters, owns the shared document store and hands
//! out collection handles. `initialize` establishes one client per process;
//! `BackendClient::connect` builds an independent client for callers that
//! manage the lifetime themselves.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt;
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

use super::batch::{CommitResult, WriteBatch};
use super::error::{BackendError, BackendResult};
use super::store::{DocumentStore, ListenerId, StoreStats};
use super::types::{DocumentSnapshot, Fields, Query, QuerySnapshot};
use tokio::sync::mpsc;

/// Name of the collection the dashboard reads
pub const WORDS_COLLECTION: &str = "words";

/// Connection parameters identifying the backend project
#[derive(Clone, Default, Deserialize, PartialEq)]
pub struct BackendConfig {
    #[serde(default, alias = "apiKey")]
    pub api_key: String,

    #[serde(default, alias = "authDomain")]
    pub auth_domain: String,

    #[serde(default, alias = "projectId")]
    pub project_id: String,

    #[serde(default, alias = "storageBucket")]
    pub storage_bucket: String,

    #[serde(default, alias = "messagingSenderId")]
    pub messaging_sender_id: String,

    #[serde(default, alias = "appId")]
    pub app_id: String,
}

impl fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"<redacted>")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("messaging_sender_id", &self.messaging_sender_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

impl BackendConfig {
    /// Check every field is present and well-formed
    pub fn validate(&self) -> BackendResult<()> {
        let fields: [(&'static str, &str); 6] = [
            ("api_key", self.api_key.as_str()),
            ("auth_domain", self.auth_domain.as_str()),
            ("project_id", self.project_id.as_str()),
            ("storage_bucket", self.storage_bucket.as_str()),
            ("messaging_sender_id", self.messaging_sender_id.as_str()),
            ("app_id", self.app_id.as_str()),
        ];

        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(BackendError::config(name, "is required"));
            }
            if value.chars().any(char::is_whitespace) {
                return Err(BackendError::config(name, "must not contain whitespace"));
            }
        }

        if !self
            .project_id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(BackendError::config(
                "project_id",
                "may only contain lowercase letters, digits and '-'",
            ));
        }

        if !self.auth_domain.contains('.') {
            return Err(BackendError::config("auth_domain", "must be a domain name"));
        }

        if !self.storage_bucket.contains('.') {
            return Err(BackendError::config("storage_bucket", "must be a bucket host name"));
        }

        if !self.messaging_sender_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(BackendError::config(
                "messaging_sender_id",
                "must be numeric",
            ));
        }

        if self.app_id.split(':').filter(|part| !part.is_empty()).count() < 3 {
            return Err(BackendError::config(
                "app_id",
                "must look like <version>:<sender>:<platform>:<hash>",
            ));
        }

        Ok(())
    }
}

struct ClientInner {
    config: BackendConfig,
    store: Arc<DocumentStore>,
    connected_at: DateTime<Utc>,
}

/// Client for one backend project
///
/// Cheap to clone; all clones share the same store.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<ClientInner>,
}

impl fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendClient")
            .field("project_id", &self.inner.config.project_id)
            .field("connected_at", &self.inner.connected_at)
            .finish()
    }
}

impl BackendClient {
    /// Build a client from validated connection parameters.
    ///
    /// Does not touch any document; connectivity problems surface later
    /// through subscriptions.
    pub fn connect(config: BackendConfig) -> BackendResult<Self> {
        config.validate()?;

        tracing::info!(
            project_id = %config.project_id,
            auth_domain = %config.auth_domain,
            "Backend client initialized"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                store: Arc::new(DocumentStore::new()),
                connected_at: Utc::now(),
            }),
        })
    }

    /// Handle to a named collection
    pub fn collection(&self, name: &str) -> CollectionHandle {
        CollectionHandle::new(name, Arc::clone(&self.inner.store))
    }

    /// Handle to the `"words"` collection
    pub fn words(&self) -> CollectionHandle {
        self.collection(WORDS_COLLECTION)
    }

    pub fn batch(&self) -> WriteBatch {
        WriteBatch::new(Arc::clone(&self.inner.store))
    }

    pub fn project_id(&self) -> &str {
        &self.inner.config.project_id
    }

    pub fn connected_at(&self) -> DateTime<Utc> {
        self.inner.connected_at
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.store.stats()
    }

    /// Close every live listener and reject further reads and writes.
    ///
    /// Subscribers observe a `Connectivity` error.
    pub fn terminate(&self) {
        let closed = self.inner.store.terminate();
        tracing::info!(
            project_id = %self.inner.config.project_id,
            listeners_closed = closed,
            "Backend client terminated"
        );
    }

    pub fn is_terminated(&self) -> bool {
        self.inner.store.is_terminated()
    }

    pub fn same_client(&self, other: &BackendClient) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

static CLIENT: OnceLock<BackendClient> = OnceLock::new();

/// Return the process-wide client, creating it on first use.
///
/// Later calls return the existing client; a differing `config` is logged
/// and ignored.
pub fn initialize_client(config: &BackendConfig) -> BackendResult<BackendClient> {
    if let Some(client) = CLIENT.get() {
        if client.inner.config != *config {
            tracing::warn!(
                project_id = %client.project_id(),
                "Backend already initialized; ignoring new configuration"
            );
        }
        return Ok(client.clone());
    }

    let client = BackendClient::connect(config.clone())?;
    // A concurrent initializer may have won; its client is the one kept
    Ok(CLIENT.get_or_init(|| client).clone())
}

/// Return a handle to the `"words"` collection of the process-wide client
pub fn initialize(config: &BackendConfig) -> BackendResult<CollectionHandle> {
    Ok(initialize_client(config)?.words())
}

/// Handle to one collection of a client
#[derive(Clone)]
pub struct CollectionHandle {
    name: Arc<str>,
    store: Arc<DocumentStore>,
}

impl fmt::Debug for CollectionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionHandle")
            .field("name", &self.name)
            .finish()
    }
}

impl CollectionHandle {
    pub(crate) fn new(name: &str, store: Arc<DocumentStore>) -> Self {
        Self {
            name: Arc::from(name),
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether both handles address the same collection of the same client
    pub fn same_collection(&self, other: &CollectionHandle) -> bool {
        Arc::ptr_eq(&self.store, &other.store) && self.name == other.name
    }

    pub fn get(&self, id: &str) -> BackendResult<Option<DocumentSnapshot>> {
        self.store.get(&self.name, id)
    }

    /// Evaluate `query` once
    pub fn query(&self, query: &Query) -> BackendResult<QuerySnapshot> {
        self.store.query(&self.name, query)
    }

    /// Create or replace one document
    pub fn set(&self, id: impl Into<String>, fields: Fields) -> BackendResult<CommitResult> {
        let mut batch = self.batch();
        batch.set(self, id, fields);
        batch.commit()
    }

    /// Create a document with a generated id
    pub fn add(&self, fields: Fields) -> BackendResult<String> {
        let id = Uuid::new_v4().simple().to_string();
        self.set(id.clone(), fields)?;
        Ok(id)
    }

    pub fn batch(&self) -> WriteBatch {
        WriteBatch::new(Arc::clone(&self.store))
    }

    pub fn len(&self) -> usize {
        self.store.document_count(&self.name)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn listen(
        &self,
        query: Query,
    ) -> BackendResult<(ListenerId, mpsc::UnboundedReceiver<QuerySnapshot>)> {
        self.store.listen(&self.name, query)
    }

    pub(crate) fn unlisten(&self, id: ListenerId) -> bool {
        self.store.unlisten(id)
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.store.listener_count()
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> BackendConfig {
    BackendConfig {
        api_key: "AIzaSyTestKey123".to_string(),
        auth_domain: "wordboard-test.firebaseapp.com".to_string(),
        project_id: "wordboard-test".to_string(),
        storage_bucket: "wordboard-test.appspot.com".to_string(),
        messaging_sender_id: "123456789".to_string(),
        app_id: "1:123456789:web:abcdef".to_string(),
    }
}
