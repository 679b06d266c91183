//! WebSocket Message Types
//!
//! Defines the JSON messages exchanged between the dashboard page and the
//! server.

use serde::{Deserialize, Serialize};

use crate::view::{RenderEvent, WordRecord};

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established
    Connected {
        /// Unique connection identifier
        connection_id: String,
    },
    /// Full replacement of the chart's words
    Snapshot {
        /// Increases by one per applied snapshot
        revision: u64,
        /// Words in query order
        words: Vec<WordRecord>,
    },
    /// The live query was lost; the last snapshot is stale
    Stale {
        /// Error description
        message: String,
    },
    /// Pong response to ping
    Pong,
    /// Error message
    Error {
        /// Error description
        message: String,
    },
}

impl From<RenderEvent<'_>> for ServerMessage {
    fn from(event: RenderEvent<'_>) -> Self {
        match event {
            RenderEvent::Words { revision, words } => ServerMessage::Snapshot {
                revision,
                words: words.to_vec(),
            },
            RenderEvent::Stale(err) => ServerMessage::Stale {
                message: err.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use serde_json::{json, Map, Value};

    #[test]
    fn test_client_message_deserialize_ping() {
        let json = r#"{"type": "ping"}"#;
        let msg: ClientMessage = serde_json::from_str(json).unwrap();
        assert!(matches!(msg, ClientMessage::Ping));
    }

    #[test]
    fn test_client_message_rejects_unknown() {
        let json = r#"{"type": "subscribe", "topics": ["metrics.*"]}"#;
        assert!(serde_json::from_str::<ClientMessage>(json).is_err());
    }

    #[test]
    fn test_server_message_serialize_connected() {
        let msg = ServerMessage::Connected {
            connection_id: "abc-123".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"connected\""));
        assert!(json.contains("\"connection_id\":\"abc-123\""));
    }

    #[test]
    fn test_snapshot_from_render_event() {
        let mut data = Map::new();
        data.insert("name".to_string(), json!("get"));
        let words = vec![WordRecord {
            id: "get".to_string(),
            value: Some(7.0),
            data,
        }];

        let msg = ServerMessage::from(RenderEvent::Words {
            revision: 3,
            words: &words,
        });
        let json: Value = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["revision"], 3);
        assert_eq!(json["words"][0]["id"], "get");
        assert_eq!(json["words"][0]["data"]["name"], "get");
        assert_eq!(json["words"][0]["value"], 7.0);
    }

    #[test]
    fn test_stale_from_render_event() {
        let err = BackendError::Connectivity("listener closed".to_string());
        let msg = ServerMessage::from(RenderEvent::Stale(&err));
        match msg {
            ServerMessage::Stale { message } => assert!(message.contains("listener closed")),
            other => panic!("Expected Stale, got {:?}", other),
        }
    }
}
