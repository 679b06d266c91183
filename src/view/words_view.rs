//! Words view: binds a live query to renderable state
//!
//! Each pushed snapshot is mapped to `Vec<WordRecord>` (order preserved, no
//! filtering) and replaces the view state in one assignment before the
//! render hook runs. The view owns its subscription; detaching or dropping
//! the view releases it.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};

use super::record::{WordRecord, VALUE_FIELD};
use crate::backend::{
    BackendError, BackendResult, CollectionHandle, Direction, MissingField, Query, QuerySnapshot,
};
use crate::live::{subscribe_with_error, SubscriptionHandle};

/// What the view queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewOptions {
    #[serde(default = "default_order_by")]
    pub order_by: String,

    #[serde(default)]
    pub direction: Direction,

    #[serde(default = "default_limit")]
    pub limit: usize,

    #[serde(default)]
    pub missing_field: MissingField,
}

fn default_order_by() -> String {
    VALUE_FIELD.to_string()
}

fn default_limit() -> usize {
    Query::DEFAULT_LIMIT
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            order_by: default_order_by(),
            direction: Direction::default(),
            limit: default_limit(),
            missing_field: MissingField::default(),
        }
    }
}

impl ViewOptions {
    pub fn query(&self) -> Query {
        Query::order_by(self.order_by.clone(), self.direction)
            .limit(self.limit)
            .missing(self.missing_field)
    }
}

/// State the renderer reads
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewState {
    /// Latest delivered result; `None` until the first push
    pub words: Option<Vec<WordRecord>>,
    /// Number of snapshots applied
    pub revision: u64,
    /// Set when the live stream was lost
    pub stale: bool,
}

/// Passed to the render hook after every state change
#[derive(Debug)]
pub enum RenderEvent<'a> {
    /// New words replaced the view state
    Words {
        revision: u64,
        words: &'a [WordRecord],
    },
    /// The live query was lost; the last words stay on screen but are stale
    Stale(&'a BackendError),
}

/// A live view of the top words
pub struct WordsView {
    state: Arc<Mutex<ViewState>>,
    subscription: SubscriptionHandle,
}

impl WordsView {
    /// Subscribe to `options.query()` on `collection` and start rendering.
    ///
    /// `render` must not detach this view.
    pub fn attach<R>(
        collection: &CollectionHandle,
        options: &ViewOptions,
        render: R,
    ) -> BackendResult<Self>
    where
        R: FnMut(RenderEvent<'_>) + Send + 'static,
    {
        let state = Arc::new(Mutex::new(ViewState::default()));
        let render = Arc::new(Mutex::new(render));

        let update_state = Arc::clone(&state);
        let update_render = Arc::clone(&render);
        let on_update = move |snapshot: QuerySnapshot| {
            let words: Vec<WordRecord> = snapshot.docs.iter().map(WordRecord::from_document).collect();

            let revision = {
                let mut state = update_state.lock().unwrap_or_else(PoisonError::into_inner);
                let revision = state.revision + 1;
                *state = ViewState {
                    words: Some(words.clone()),
                    revision,
                    stale: false,
                };
                revision
            };

            let mut render = update_render.lock().unwrap_or_else(PoisonError::into_inner);
            (*render)(RenderEvent::Words {
                revision,
                words: &words,
            });
        };

        let error_state = Arc::clone(&state);
        let on_error = move |err: BackendError| {
            error_state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .stale = true;

            let mut render = render.lock().unwrap_or_else(PoisonError::into_inner);
            (*render)(RenderEvent::Stale(&err));
        };

        let subscription = subscribe_with_error(collection, options.query(), on_update, on_error)?;

        tracing::debug!(
            listener_id = subscription.id(),
            limit = options.limit,
            "Words view attached"
        );

        Ok(Self {
            state,
            subscription,
        })
    }

    /// Latest words, `None` before the first push
    pub fn words(&self) -> Option<Vec<WordRecord>> {
        self.lock_state().words.clone()
    }

    pub fn revision(&self) -> u64 {
        self.lock_state().revision
    }

    pub fn is_stale(&self) -> bool {
        self.lock_state().stale
    }

    pub fn state(&self) -> ViewState {
        self.lock_state().clone()
    }

    /// Tear the view down, releasing its subscription, and return the final state
    pub fn detach(self) -> ViewState {
        let WordsView {
            state,
            subscription,
        } = self;
        let listener_id = subscription.id();
        subscription.unsubscribe();

        tracing::debug!(listener_id, "Words view detached");

        let guard = state.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
