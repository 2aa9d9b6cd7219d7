//! The JSON messages exchanged between the match server and its clients.
//! They will be used consistent across the server and the client.
//!
//! Moves travel over the per match web socket as [`MoveRequest`], answers come back as
//! [`ServerMessage`] which is tagged by a `status` field. The remaining structs are the bodies of
//! the HTTP endpoints used to create, join and start matches.

use onitama_rules::{Color, MatchEngine, Position, Rank};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The buffer sizes for the outbound channel of every connection.
pub const CHANNEL_BUFFER_SIZE: usize = 256;

/// Identifies a match in the registry.
pub type MatchId = Uuid;
/// Identifies a joined player within a match.
pub type PlayerId = Uuid;

/// A move sent by a client: play `card_name` to move the piece on `(x, y)` to `(nx, ny)`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub card_name: String,
    pub x: i8,
    pub y: i8,
    pub nx: i8,
    pub ny: i8,
}

impl MoveRequest {
    pub fn source(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn destination(&self) -> Position {
        Position::new(self.nx, self.ny)
    }
}

/// The content of one occupied square.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PieceView {
    pub color: Color,
    pub rank: Rank,
}

/// Read only picture of a match. The board is indexed `[y][x]`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub board: Vec<Vec<Option<PieceView>>>,
    pub current_color: Color,
    pub host_hand: Vec<String>,
    pub guest_hand: Vec<String>,
    pub neutral_card: String,
}

impl MatchSnapshot {
    /// Captures the engine state. The hands are reported relative to the host's color.
    pub fn capture(engine: &MatchEngine, host_color: Color) -> Self {
        let board = engine
            .board()
            .rows()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        cell.map(|piece| PieceView {
                            color: piece.color,
                            rank: piece.rank,
                        })
                    })
                    .collect()
            })
            .collect();
        let hand_names = |color: Color| -> Vec<String> {
            engine
                .cards()
                .hand(color)
                .iter()
                .map(|card| card.name.to_string())
                .collect()
        };

        MatchSnapshot {
            board,
            current_color: engine.turn_owner(),
            host_hand: hand_names(host_color),
            guest_hand: hand_names(host_color.opponent()),
            neutral_card: engine.cards().neutral().name.to_string(),
        }
    }
}

/// Everything the server pushes over a match web socket.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// A rejected move or malformed message. Only the sender receives it.
    Error { message: String },
    /// The state after a successful move, sent to every connection of the match.
    Success {
        board: Vec<Vec<Option<PieceView>>>,
        host_hand: Vec<String>,
        guest_hand: Vec<String>,
        neutral_card: String,
        current_color: Color,
        winner: Option<Color>,
    },
    /// The host started the match and `current_player` moves first.
    Started {
        current_player: PlayerId,
        current_color: Color,
    },
    /// The match was torn down. No further messages follow.
    Closed { message: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
        }
    }

    /// Builds the broadcast after a successful move.
    pub fn success(snapshot: MatchSnapshot, winner: Option<Color>) -> Self {
        ServerMessage::Success {
            board: snapshot.board,
            host_hand: snapshot.host_hand,
            guest_hand: snapshot.guest_hand,
            neutral_card: snapshot.neutral_card,
            current_color: snapshot.current_color,
            winner,
        }
    }
}

/// Answer to creating or joining a match.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub match_id: MatchId,
    pub player_id: PlayerId,
    pub color: Color,
}

/// Body of the start request. Only the host may start.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub player_id: PlayerId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub current_player: PlayerId,
}

/// One line of the match listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub match_id: MatchId,
    pub players: usize,
    pub started: bool,
    pub connected_channels: usize,
}
