//! Live Query Subscriptions
//!
//! Push-based delivery of query results. A subscription receives the full
//! result set immediately and again after every change that affects it.
//!
//! ```text
//! WriteBatch::commit → DocumentStore (re-evaluate) → mpsc → listener task → on_update
//! ```

mod subscription;

pub use subscription::{subscribe, subscribe_with_error, SubscriptionHandle};
