//! In-process document store
//!
//! Holds schemaless documents grouped by collection and keeps the set of live
//! query listeners. Every committed batch re-evaluates the listeners of the
//! collections it touched and pushes a fresh snapshot to each listener whose
//! result changed.
//!
//! ```text
//! Write Path:
//!   WriteBatch → stage (clone touched collections) → apply ops → swap in
//!             → re-evaluate listeners → push QuerySnapshot (mpsc)
//! ```

use chrono::Utc;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

use super::batch::{CommitResult, WriteOp};
use super::error::{BackendError, BackendResult};
use super::types::{
    validate_document_id, Direction, DocumentSnapshot, Fields, MissingField, Query,
    QuerySnapshot,
};

/// Identifier of a registered listener
pub type ListenerId = u64;

type Collection = BTreeMap<String, Fields>;

/// Shared document store
pub struct DocumentStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    collections: HashMap<String, Collection>,
    listeners: HashMap<ListenerId, Listener>,
    next_listener: ListenerId,
    commits: u64,
    terminated: bool,
}

struct Listener {
    collection: String,
    query: Query,
    last: Vec<DocumentSnapshot>,
    sequence: u64,
    sender: mpsc::UnboundedSender<QuerySnapshot>,
}

impl Listener {
    /// Push `docs` if they differ from the last delivered result.
    ///
    /// Returns false once the receiving side is gone.
    fn offer(&mut self, docs: Vec<DocumentSnapshot>) -> bool {
        if self.sequence > 0 && docs == self.last {
            return true;
        }
        self.sequence += 1;
        self.last = docs.clone();
        let snapshot = QuerySnapshot {
            docs,
            sequence: self.sequence,
            read_time: Utc::now(),
        };
        self.sender.send(snapshot).is_ok()
    }
}

/// Store statistics
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub collections: usize,
    pub documents: usize,
    pub listeners: usize,
    pub commits: u64,
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                next_listener: 1,
                ..Default::default()
            }),
        }
    }

    fn lock(&self) -> BackendResult<MutexGuard<'_, StoreInner>> {
        self.inner
            .lock()
            .map_err(|e| BackendError::Lock(e.to_string()))
    }

    fn lock_open(&self) -> BackendResult<MutexGuard<'_, StoreInner>> {
        let inner = self.lock()?;
        if inner.terminated {
            return Err(BackendError::Terminated);
        }
        Ok(inner)
    }

    /// Read one document
    pub fn get(&self, collection: &str, id: &str) -> BackendResult<Option<DocumentSnapshot>> {
        let inner = self.lock_open()?;
        Ok(inner
            .collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| DocumentSnapshot::new(id, fields.clone())))
    }

    /// Evaluate a query once, without registering a listener
    pub fn query(&self, collection: &str, query: &Query) -> BackendResult<QuerySnapshot> {
        query.validate()?;
        let inner = self.lock_open()?;
        let docs = inner
            .collections
            .get(collection)
            .map(|docs| evaluate(docs, query))
            .unwrap_or_default();

        Ok(QuerySnapshot {
            docs,
            sequence: 0,
            read_time: Utc::now(),
        })
    }

    /// Register a live query listener.
    ///
    /// The current result is queued on the returned receiver before this
    /// returns, so the first receive always yields the initial snapshot.
    pub fn listen(
        &self,
        collection: &str,
        query: Query,
    ) -> BackendResult<(ListenerId, mpsc::UnboundedReceiver<QuerySnapshot>)> {
        query.validate()?;
        let mut inner = self.lock_open()?;

        let (sender, receiver) = mpsc::unbounded_channel();
        let docs = inner
            .collections
            .get(collection)
            .map(|docs| evaluate(docs, &query))
            .unwrap_or_default();

        let mut listener = Listener {
            collection: collection.to_string(),
            query,
            last: Vec::new(),
            sequence: 0,
            sender,
        };
        listener.offer(docs);

        let id = inner.next_listener;
        inner.next_listener += 1;
        inner.listeners.insert(id, listener);

        tracing::debug!(listener_id = id, collection = %collection, "Listener registered");
        Ok((id, receiver))
    }

    /// Remove a listener. Returns true if it was registered.
    ///
    /// Never fails: a poisoned lock is recovered so release paths (`Drop`)
    /// always detach.
    pub fn unlisten(&self, id: ListenerId) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let removed = inner.listeners.remove(&id).is_some();
        if removed {
            tracing::debug!(listener_id = id, "Listener removed");
        }
        removed
    }

    /// Apply a batch of writes atomically and notify affected listeners
    pub fn commit(&self, ops: Vec<WriteOp>) -> BackendResult<CommitResult> {
        let mut inner = self.lock_open()?;

        // Stage every touched collection so a failing op leaves no trace
        let touched: HashSet<String> = ops.iter().map(|op| op.collection().to_string()).collect();
        let mut staged: HashMap<String, Collection> = touched
            .iter()
            .map(|name| {
                let docs = inner.collections.get(name).cloned().unwrap_or_default();
                (name.clone(), docs)
            })
            .collect();

        let writes = ops.len();
        for op in ops {
            let docs = staged
                .get_mut(op.collection())
                .ok_or_else(|| BackendError::Lock("staging lost a collection".to_string()))?;
            apply(docs, op)?;
        }

        for (name, docs) in staged {
            inner.collections.insert(name, docs);
        }
        inner.commits += 1;

        let notified = notify(&mut inner, &touched);

        tracing::trace!(writes, notified, "Batch committed");
        Ok(CommitResult {
            writes,
            notified,
            commit_time: Utc::now(),
        })
    }

    /// Close every listener and reject further use
    pub fn terminate(&self) -> usize {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.terminated = true;
        let closed = inner.listeners.len();
        // Dropping the senders closes each listener's stream
        inner.listeners.clear();
        closed
    }

    pub fn is_terminated(&self) -> bool {
        self.inner
            .lock()
            .map(|inner| inner.terminated)
            .unwrap_or(true)
    }

    pub fn listener_count(&self) -> usize {
        self.lock().map(|inner| inner.listeners.len()).unwrap_or(0)
    }

    pub fn document_count(&self, collection: &str) -> usize {
        self.lock()
            .map(|inner| inner.collections.get(collection).map_or(0, |docs| docs.len()))
            .unwrap_or(0)
    }

    pub fn stats(&self) -> StoreStats {
        match self.lock() {
            Ok(inner) => StoreStats {
                collections: inner.collections.len(),
                documents: inner.collections.values().map(|docs| docs.len()).sum(),
                listeners: inner.listeners.len(),
                commits: inner.commits,
            },
            Err(_) => StoreStats::default(),
        }
    }
}

/// Re-evaluate listeners on touched collections, dropping dead ones
fn notify(inner: &mut StoreInner, touched: &HashSet<String>) -> usize {
    let StoreInner {
        collections,
        listeners,
        ..
    } = inner;

    let mut dead = Vec::new();
    let mut notified = 0;

    for (id, listener) in listeners.iter_mut() {
        if !touched.contains(&listener.collection) {
            continue;
        }
        let docs = collections
            .get(&listener.collection)
            .map(|docs| evaluate(docs, &listener.query))
            .unwrap_or_default();

        let before = listener.sequence;
        if !listener.offer(docs) {
            dead.push(*id);
        } else if listener.sequence != before {
            notified += 1;
        }
    }

    for id in dead {
        listeners.remove(&id);
        tracing::debug!(listener_id = id, "Dropped listener with closed receiver");
    }

    notified
}

fn apply(docs: &mut Collection, op: WriteOp) -> BackendResult<()> {
    match op {
        WriteOp::Set { id, fields, .. } => {
            validate_document_id(&id)?;
            docs.insert(id, fields);
        }
        WriteOp::Merge { id, fields, .. } => {
            validate_document_id(&id)?;
            let doc = docs.entry(id).or_default();
            for (name, value) in &fields {
                value.apply(doc, name);
            }
        }
        WriteOp::Update {
            collection,
            id,
            fields,
        } => {
            validate_document_id(&id)?;
            let doc = docs
                .get_mut(&id)
                .ok_or(BackendError::NotFound { collection, id })?;
            for (name, value) in &fields {
                value.apply(doc, name);
            }
        }
        WriteOp::Delete { id, .. } => {
            validate_document_id(&id)?;
            docs.remove(&id);
        }
    }
    Ok(())
}

/// Compute the ordered, limited result of `query` over one collection
fn evaluate(docs: &Collection, query: &Query) -> Vec<DocumentSnapshot> {
    let mut ranked: Vec<(Option<f64>, &String, &Fields)> = docs
        .iter()
        .map(|(id, fields)| (fields.get(&query.order_by).and_then(Value::as_f64), id, fields))
        .filter(|(key, _, _)| key.is_some() || query.missing == MissingField::SortLast)
        .collect();

    ranked.sort_by(|a, b| compare((a.0, a.1), (b.0, b.1), query.direction));

    ranked
        .into_iter()
        .take(query.limit)
        .map(|(_, id, fields)| DocumentSnapshot::new(id.clone(), fields.clone()))
        .collect()
}

/// Order by key in `direction`, ties by id in the same direction; keyless
/// documents always come last
fn compare(a: (Option<f64>, &String), b: (Option<f64>, &String), direction: Direction) -> Ordering {
    let ord = match (a.0, b.0) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let ord = ord.then_with(|| a.1.cmp(b.1));
    match direction {
        Direction::Ascending => ord,
        Direction::Descending => ord.reverse(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::FieldValue;
    use serde_json::json;

    fn word(value: Value) -> Fields {
        let mut fields = Fields::new();
        fields.insert("value".to_string(), value);
        fields
    }

    fn set(id: &str, value: Value) -> WriteOp {
        WriteOp::Set {
            collection: "words".to_string(),
            id: id.to_string(),
            fields: word(value),
        }
    }

    fn ids(snapshot: &QuerySnapshot) -> Vec<&str> {
        snapshot.docs.iter().map(|d| d.id.as_str()).collect()
    }

    fn top(limit: usize) -> Query {
        Query::order_by("value", Direction::Descending).limit(limit)
    }

    #[test]
    fn test_query_orders_descending_with_limit() {
        let store = DocumentStore::new();
        store
            .commit(vec![
                set("a", json!(5)),
                set("b", json!(12)),
                set("c", json!(10)),
                set("d", json!(1)),
            ])
            .unwrap();

        let snapshot = store.query("words", &top(3)).unwrap();
        assert_eq!(ids(&snapshot), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_missing_field_sorts_last_in_both_directions() {
        let store = DocumentStore::new();
        let mut no_value = Fields::new();
        no_value.insert("name".to_string(), json!("orphan"));
        store
            .commit(vec![
                set("a", json!(3)),
                set("b", json!("not a number")),
                WriteOp::Set {
                    collection: "words".to_string(),
                    id: "c".to_string(),
                    fields: no_value,
                },
                set("d", json!(7)),
            ])
            .unwrap();

        let desc = store.query("words", &top(10)).unwrap();
        assert_eq!(ids(&desc), vec!["d", "a", "c", "b"]);

        let asc = store
            .query("words", &Query::order_by("value", Direction::Ascending).limit(10))
            .unwrap();
        assert_eq!(ids(&asc), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_missing_field_exclude_policy() {
        let store = DocumentStore::new();
        store
            .commit(vec![set("a", json!(3)), set("b", Value::Null)])
            .unwrap();

        let snapshot = store
            .query("words", &top(10).missing(MissingField::Exclude))
            .unwrap();
        assert_eq!(ids(&snapshot), vec!["a"]);
    }

    #[test]
    fn test_ties_broken_by_id() {
        let store = DocumentStore::new();
        store
            .commit(vec![set("x", json!(4)), set("m", json!(4)), set("a", json!(4))])
            .unwrap();

        let desc = store.query("words", &top(10)).unwrap();
        assert_eq!(ids(&desc), vec!["x", "m", "a"]);
    }

    #[test]
    fn test_failed_batch_leaves_store_untouched() {
        let store = DocumentStore::new();
        store.commit(vec![set("a", json!(1))]).unwrap();

        let result = store.commit(vec![
            set("b", json!(2)),
            WriteOp::Update {
                collection: "words".to_string(),
                id: "missing".to_string(),
                fields: vec![("value".to_string(), FieldValue::increment(1))],
            },
        ]);

        assert!(matches!(result, Err(BackendError::NotFound { .. })));
        assert_eq!(store.document_count("words"), 1);
        assert!(store.get("words", "b").unwrap().is_none());
    }

    #[test]
    fn test_merge_creates_and_increments() {
        let store = DocumentStore::new();
        let merge = |by: i64| WriteOp::Merge {
            collection: "words".to_string(),
            id: "get".to_string(),
            fields: vec![
                ("name".to_string(), FieldValue::from("get")),
                ("value".to_string(), FieldValue::increment(by)),
            ],
        };

        store.commit(vec![merge(3)]).unwrap();
        store.commit(vec![merge(4)]).unwrap();

        let doc = store.get("words", "get").unwrap().unwrap();
        assert_eq!(doc.fields["value"], json!(7));
        assert_eq!(doc.fields["name"], json!("get"));
    }

    #[tokio::test]
    async fn test_listener_receives_initial_and_changed_results_only() {
        let store = DocumentStore::new();
        store.commit(vec![set("a", json!(10))]).unwrap();

        let (_id, mut rx) = store.listen("words", top(1)).unwrap();
        let initial = rx.recv().await.unwrap();
        assert_eq!(initial.sequence, 1);
        assert_eq!(ids(&initial), vec!["a"]);

        // Outside the window: no push
        store.commit(vec![set("b", json!(2))]).unwrap();
        assert!(rx.try_recv().is_err());

        // Other collection: no push
        store
            .commit(vec![WriteOp::Delete {
                collection: "repos".to_string(),
                id: "x".to_string(),
            }])
            .unwrap();
        assert!(rx.try_recv().is_err());

        store.commit(vec![set("c", json!(11))]).unwrap();
        let next = rx.recv().await.unwrap();
        assert_eq!(next.sequence, 2);
        assert_eq!(ids(&next), vec!["c"]);
    }

    #[tokio::test]
    async fn test_one_push_per_batch() {
        let store = DocumentStore::new();
        let (_id, mut rx) = store.listen("words", top(10)).unwrap();
        assert!(rx.recv().await.unwrap().is_empty());

        store
            .commit(vec![set("a", json!(1)), set("b", json!(2)), set("c", json!(3))])
            .unwrap();

        let pushed = rx.recv().await.unwrap();
        assert_eq!(pushed.len(), 3);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unlisten_and_dead_listener_cleanup() {
        let store = DocumentStore::new();
        let (id, _rx) = store.listen("words", top(5)).unwrap();
        let (_other, rx2) = store.listen("words", top(5)).unwrap();
        assert_eq!(store.listener_count(), 2);

        assert!(store.unlisten(id));
        assert!(!store.unlisten(id));

        drop(rx2);
        store.commit(vec![set("a", json!(1))]).unwrap();
        assert_eq!(store.listener_count(), 0);
    }

    #[tokio::test]
    async fn test_terminate_closes_streams_and_rejects_writes() {
        let store = DocumentStore::new();
        let (_id, mut rx) = store.listen("words", top(5)).unwrap();
        rx.recv().await.unwrap();

        assert_eq!(store.terminate(), 1);
        assert!(rx.recv().await.is_none());
        assert!(store.is_terminated());
        assert!(matches!(
            store.commit(vec![set("a", json!(1))]),
            Err(BackendError::Terminated)
        ));
        assert!(matches!(
            store.listen("words", top(5)),
            Err(BackendError::Terminated)
        ));
    }

    #[test]
    fn test_invalid_document_id_rejected() {
        let store = DocumentStore::new();
        let result = store.commit(vec![set("a/b", json!(1))]);
        assert!(matches!(result, Err(BackendError::InvalidDocumentId(_))));
    }

    #[test]
    fn test_stats() {
        let store = DocumentStore::new();
        store
            .commit(vec![set("a", json!(1)), set("b", json!(2))])
            .unwrap();
        let stats = store.stats();
        assert_eq!(stats.collections, 1);
        assert_eq!(stats.documents, 2);
        assert_eq!(stats.commits, 1);
    }
}
