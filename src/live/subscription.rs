//! Live query subscriptions
//!
//! `subscribe` registers a listener on a collection and drives the caller's
//! callback from a dedicated tokio task, one invocation per pushed snapshot,
//! in the order the store emitted them.
//!
//! The returned `SubscriptionHandle` owns the listener. Dropping it (or
//! calling `unsubscribe`) removes the listener from the store and disables
//! the callback; no invocation starts after release returns.

use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;

use crate::backend::{BackendError, BackendResult, CollectionHandle, ListenerId, Query, QuerySnapshot};

type UpdateFn = Box<dyn FnMut(QuerySnapshot) + Send>;
type ErrorFn = Box<dyn FnOnce(BackendError) + Send>;

struct Callbacks {
    on_update: UpdateFn,
    on_error: Option<ErrorFn>,
}

type Slot = Arc<Mutex<Option<Callbacks>>>;

/// Subscribe to a live query.
///
/// `on_update` runs immediately with the current result, then once per
/// committed batch that changes the result. Must be called from within a
/// tokio runtime. Stream loss is logged.
pub fn subscribe<F>(
    collection: &CollectionHandle,
    query: Query,
    on_update: F,
) -> BackendResult<SubscriptionHandle>
where
    F: FnMut(QuerySnapshot) + Send + 'static,
{
    spawn_listener(
        collection,
        query,
        Callbacks {
            on_update: Box::new(on_update),
            on_error: None,
        },
    )
}

/// Like [`subscribe`], also calling `on_error` once if the backend closes the
/// stream while the subscription is still held.
pub fn subscribe_with_error<F, E>(
    collection: &CollectionHandle,
    query: Query,
    on_update: F,
    on_error: E,
) -> BackendResult<SubscriptionHandle>
where
    F: FnMut(QuerySnapshot) + Send + 'static,
    E: FnOnce(BackendError) + Send + 'static,
{
    spawn_listener(
        collection,
        query,
        Callbacks {
            on_update: Box::new(on_update),
            on_error: Some(Box::new(on_error)),
        },
    )
}

fn spawn_listener(
    collection: &CollectionHandle,
    query: Query,
    callbacks: Callbacks,
) -> BackendResult<SubscriptionHandle> {
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
        BackendError::Connectivity("live queries require a running tokio runtime".to_string())
    })?;

    let (id, mut receiver) = collection.listen(query.clone())?;
    let slot: Slot = Arc::new(Mutex::new(Some(callbacks)));

    let task_slot = Arc::clone(&slot);
    let name = collection.name().to_string();
    let task = runtime.spawn(async move {
        while let Some(snapshot) = receiver.recv().await {
            let mut guard = task_slot.lock().unwrap_or_else(PoisonError::into_inner);
            match guard.as_mut() {
                Some(callbacks) => (callbacks.on_update)(snapshot),
                None => return,
            }
        }

        // The store closed the stream while we were still subscribed
        let mut guard = task_slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(callbacks) = guard.take() {
            let err = BackendError::Connectivity(format!(
                "live query on '{}' closed by backend",
                name
            ));
            tracing::warn!(
                listener_id = id,
                collection = %name,
                error = %err,
                "Live query stream lost, results are stale"
            );
            if let Some(on_error) = callbacks.on_error {
                on_error(err);
            }
        }
    });

    tracing::debug!(
        listener_id = id,
        collection = %collection.name(),
        order_by = %query.order_by,
        limit = query.limit,
        "Subscribed to live query"
    );

    Ok(SubscriptionHandle {
        id,
        collection: collection.clone(),
        slot,
        task: Some(task),
    })
}

/// Scoped ownership of a live query listener
pub struct SubscriptionHandle {
    id: ListenerId,
    collection: CollectionHandle,
    slot: Slot,
    task: Option<JoinHandle<()>>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Whether the callback can still be invoked
    pub fn is_active(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Stop delivery and release the listener.
    ///
    /// Returns false if the stream had already been closed by the backend.
    /// Must not be called from inside the subscription's own callback.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return false;
        };

        self.collection.unlisten(self.id);
        // Waits for an in-flight callback, then disables the slot
        let callbacks = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        task.abort();

        tracing::debug!(
            listener_id = self.id,
            collection = %self.collection.name(),
            "Unsubscribed from live query"
        );
        callbacks.is_some()
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.release();
    }
}
