//! Protocol Messages
//!
//! Wire format for client-server communication over WebSocket.
//! All messages are JSON text frames.

use serde::{Deserialize, Serialize};

use crate::game::state::{Slot, StateSnapshot};

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start or restart the round.
    StartGame,

    /// Move the sender's paddle by one step.
    Movement {
        /// Key name as reported by the browser (`w`, `ArrowUp`, ...)
        key: String,
    },
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from server to client.
///
/// State broadcasts carry no `type` field; clients tell them apart from
/// control messages by shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    /// Typed control message.
    Control(ControlMessage),

    /// Full match state.
    State(StateSnapshot),
}

/// Typed server messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    /// Sent once after a connection gets a slot.
    Init {
        player_number: Slot,
    },
}

impl ServerMessage {
    /// Handshake for a newly registered connection.
    pub fn init(slot: Slot) -> Self {
        ServerMessage::Control(ControlMessage::Init { player_number: slot })
    }
}

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameState;

    #[test]
    fn test_parse_start_game() {
        let msg = ClientMessage::from_json(r#"{"type":"start_game"}"#).unwrap();
        assert_eq!(msg, ClientMessage::StartGame);
    }

    #[test]
    fn test_parse_movement() {
        let msg = ClientMessage::from_json(r#"{"type":"movement","key":"ArrowUp"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Movement { key: "ArrowUp".to_string() });
    }

    #[test]
    fn test_reject_malformed_client_messages() {
        for raw in [
            "not json",
            "{}",
            r#"{"key":"w"}"#,
            r#"{"type":"teleport"}"#,
            r#"{"type":"movement"}"#,
            r#"{"type":"movement","key":7}"#,
        ] {
            assert!(ClientMessage::from_json(raw).is_err(), "accepted {}", raw);
        }
    }

    #[test]
    fn test_init_wire_format() {
        let json = ServerMessage::init(Slot::Two).to_json().unwrap();
        assert_eq!(json, r#"{"type":"init","player_number":2}"#);
    }

    #[test]
    fn test_state_has_no_type_field() {
        let mut state = GameState::with_seed(4);
        state.start_game();
        let msg = ServerMessage::State(state.snapshot());

        let value: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert!(value.get("type").is_none());
        assert_eq!(value["running"], true);
        assert_eq!(value["player1Y"], 250.0);
    }

    #[test]
    fn test_server_messages_distinguished_by_shape() {
        let init = ServerMessage::from_json(r#"{"type":"init","player_number":1}"#).unwrap();
        assert_eq!(init, ServerMessage::init(Slot::One));

        let state = GameState::with_seed(4);
        let json = ServerMessage::State(state.snapshot()).to_json().unwrap();
        match ServerMessage::from_json(&json).unwrap() {
            ServerMessage::State(snapshot) => assert_eq!(snapshot, state.snapshot()),
            other => panic!("Wrong message type: {:?}", other),
        }
    }
}
