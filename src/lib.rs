//! # Wordboard
//!
//! Live word-frequency dashboard. A collection of word documents is kept in a
//! document backend; a chart subscribes to the top 36 words by `value` and
//! re-renders whenever the result changes.
//!
//! ## Features
//!
//! - **Document backend**: collections, atomic write batches, live queries
//! - **Live subscriptions**: push-based results with scoped release
//! - **View binding**: snapshots mapped to typed `WordRecord`s for the chart
//! - **Word extraction**: snake_case and camelCase identifiers split into words
//! - **Real-time**: WebSocket stream per dashboard page
//!
//! ## Modules
//!
//! - [`backend`]: Client adapter and document store
//! - [`live`]: Live query subscriptions
//! - [`view`]: View-model binding
//! - [`words`]: Identifier splitting and tallies
//! - [`api`]: REST API and dashboard server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wordboard::backend::initialize;
//! use wordboard::config::Config;
//! use wordboard::view::{RenderEvent, ViewOptions, WordsView};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let words = initialize(&config.backend)?;
//!
//!     let view = WordsView::attach(&words, &ViewOptions::default(), |event| {
//!         if let RenderEvent::Words { revision, words } = event {
//!             println!("revision {}: {} words", revision, words.len());
//!         }
//!     })?;
//!
//!     tokio::signal::ctrl_c().await?;
//!     view.detach();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod backend;
pub mod config;
pub mod live;
pub mod view;
pub mod websocket;
pub mod words;

// Re-export top-level types for convenience
pub use backend::{
    initialize, initialize_client, BackendClient, BackendConfig, BackendError, BackendResult,
    CollectionHandle, Direction, DocumentSnapshot, MissingField, Query, QuerySnapshot,
};

pub use live::{subscribe, subscribe_with_error, SubscriptionHandle};

pub use view::{RenderEvent, ViewOptions, ViewState, WordRecord, WordsView};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{ClientMessage, ConnectionHub, HubConfig, HubError, ServerMessage};

pub use words::{record_tally, Language, WordTally};

pub use config::{ApiConfig, Config, ConfigError, LoggingConfig, StoreConfig};
