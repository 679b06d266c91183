//! View Model Binding
//!
//! Turns pushed query snapshots into the state a chart renders:
//!
//! - **record**: `WordRecord`, the typed shape of a word document
//! - **words_view**: `WordsView`, which owns a live subscription and its `ViewState`

mod record;
mod words_view;

pub use record::{WordRecord, VALUE_FIELD};
pub use words_view::{RenderEvent, ViewOptions, ViewState, WordsView};
