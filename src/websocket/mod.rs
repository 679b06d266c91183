//! WebSocket Live Dashboard
//!
//! Streams the live top-words result to dashboard pages.
//!
//! ## Architecture
//!
//! - **ConnectionHub**: Tracks active connections and the connection limit
//! - **Handler**: Upgrades the request and binds a `WordsView` per connection
//! - **Messages**: Defines client and server message formats
//!
//! ## Protocol
//!
//! After `connected`, the server sends a `snapshot` with the full word list
//! whenever the result changes, and `stale` if the live query is lost.
//! Clients may send `{"type": "ping"}` and receive `pong`.
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:8086/ws');
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'snapshot') chart.update(msg.words);
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::websocket_handler;
pub use hub::{ConnectionHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage};
