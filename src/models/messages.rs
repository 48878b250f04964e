use actix::Message;
use serde::{Deserialize, Serialize};

use crate::game::{Cell, Piece, CELL_COUNT};
use crate::models::{ConnectionId, RoomId};

/// Board snapshot as sent to clients
pub type GameStateSnapshot = [Cell; CELL_COUNT];

/// Message sent from client to server.
///
/// On the wire: `{"event": "<name>", "data": <payload>}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Ask the server to open a fresh room
    NewGame,
    /// Check that a room exists before navigating to it
    Joining { room: RoomId },
    /// Take a seat in a room
    NewRoomJoin {
        #[serde(default)]
        room: RoomId,
        #[serde(default)]
        name: String,
    },
    Move {
        room: RoomId,
        piece: Piece,
        index: usize,
    },
    /// Bare room id
    PlayAgainRequest(RoomId),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::NewGame => "newGame",
            ClientEvent::Joining { .. } => "joining",
            ClientEvent::NewRoomJoin { .. } => "newRoomJoin",
            ClientEvent::Move { .. } => "move",
            ClientEvent::PlayAgainRequest(_) => "playAgainRequest",
        }
    }
}

/// The `event` tag of a frame whose payload may not have parsed.
pub fn frame_event_name(text: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Frame {
        event: String,
    }

    serde_json::from_str::<Frame>(text).ok().map(|frame| frame.event)
}

/// Message sent from server to client(s)
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Message)]
#[rtype(result = "()")]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    NewGameCreated(RoomId),
    JoinConfirmed(RoomId),
    JoinError,
    Waiting,
    PieceAssignment {
        piece: Piece,
        id: ConnectionId,
    },
    Starting {
        game_state: GameStateSnapshot,
        /// `(connection id, display name)` in join order
        players: Vec<(ConnectionId, String)>,
        turn: Piece,
    },
    Update {
        game_state: GameStateSnapshot,
        turn: Piece,
    },
    Winner {
        game_state: GameStateSnapshot,
        id: ConnectionId,
    },
    Draw {
        game_state: GameStateSnapshot,
    },
    Restart {
        game_state: GameStateSnapshot,
        turn: Piece,
    },
    ErrorMessage(String),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewGameCreated(_) => "newGameCreated",
            ServerEvent::JoinConfirmed(_) => "joinConfirmed",
            ServerEvent::JoinError => "joinError",
            ServerEvent::Waiting => "waiting",
            ServerEvent::PieceAssignment { .. } => "pieceAssignment",
            ServerEvent::Starting { .. } => "starting",
            ServerEvent::Update { .. } => "update",
            ServerEvent::Winner { .. } => "winner",
            ServerEvent::Draw { .. } => "draw",
            ServerEvent::Restart { .. } => "restart",
            ServerEvent::ErrorMessage(_) => "errorMessage",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_payloadless_new_game() {
        let event: ClientEvent = serde_json::from_str(r#"{"event":"newGame"}"#).unwrap();
        assert_eq!(event, ClientEvent::NewGame);
    }

    #[test]
    fn parses_move() {
        let event: ClientEvent = serde_json::from_value(json!({
            "event": "move",
            "data": {"room": "abc", "piece": "O", "index": 7}
        }))
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::Move {
                room: "abc".to_string(),
                piece: Piece::O,
                index: 7
            }
        );
    }

    #[test]
    fn play_again_takes_bare_room_id() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "playAgainRequest", "data": "abc"})).unwrap();
        assert_eq!(event, ClientEvent::PlayAgainRequest("abc".to_string()));
    }

    #[test]
    fn missing_join_fields_default_to_empty() {
        let event: ClientEvent =
            serde_json::from_value(json!({"event": "newRoomJoin", "data": {"room": "abc"}}))
                .unwrap();
        assert_eq!(
            event,
            ClientEvent::NewRoomJoin {
                room: "abc".to_string(),
                name: String::new()
            }
        );
    }

    #[test]
    fn join_without_payload_is_rejected_but_still_named() {
        let text = r#"{"event":"newRoomJoin"}"#;
        assert!(serde_json::from_str::<ClientEvent>(text).is_err());
        assert_eq!(frame_event_name(text).as_deref(), Some("newRoomJoin"));
        assert_eq!(frame_event_name("{not json"), None);
    }

    #[test]
    fn rejects_unknown_event_and_negative_index() {
        assert!(serde_json::from_str::<ClientEvent>(r#"{"event":"resign"}"#).is_err());
        assert!(serde_json::from_value::<ClientEvent>(json!({
            "event": "move",
            "data": {"room": "abc", "piece": "X", "index": -1}
        }))
        .is_err());
    }

    #[test]
    fn server_events_use_camel_case_names_and_fields() {
        let mut game_state: GameStateSnapshot = [None; CELL_COUNT];
        game_state[4] = Some(Piece::X);
        let value = serde_json::to_value(ServerEvent::Update {
            game_state,
            turn: Piece::O,
        })
        .unwrap();
        assert_eq!(
            value,
            json!({
                "event": "update",
                "data": {
                    "gameState": [null, null, null, null, "X", null, null, null, null],
                    "turn": "O"
                }
            })
        );
    }

    #[test]
    fn starting_lists_players_as_pairs() {
        let value = serde_json::to_value(ServerEvent::Starting {
            game_state: [None; CELL_COUNT],
            players: vec![
                ("c1".to_string(), "ann".to_string()),
                ("c2".to_string(), "bob".to_string()),
            ],
            turn: Piece::X,
        })
        .unwrap();
        assert_eq!(value["event"], "starting");
        assert_eq!(value["data"]["players"], json!([["c1", "ann"], ["c2", "bob"]]));
    }

    #[test]
    fn unit_server_events_carry_no_data() {
        assert_eq!(
            serde_json::to_value(ServerEvent::Waiting).unwrap(),
            json!({"event": "waiting"})
        );
        assert_eq!(
            serde_json::to_value(ServerEvent::NewGameCreated("r1".to_string())).unwrap(),
            json!({"event": "newGameCreated", "data": "r1"})
        );
    }

    #[test]
    fn event_names_match_wire_tags() {
        let events = [
            ServerEvent::JoinError,
            ServerEvent::Waiting,
            ServerEvent::ErrorMessage("x".to_string()),
            ServerEvent::Draw {
                game_state: [None; CELL_COUNT],
            },
        ];
        for event in events {
            let value = serde_json::to_value(&event).unwrap();
            assert_eq!(value["event"], event.name());
        }
    }
}
