//! Snapshot and error payloads for the WebSocket protocol.
//!
//! A [`GameSnapshot`] is the single authoritative resync payload: late
//! joiners and reconnecting clients rebuild their view from it instead of
//! replaying a partial event stream. Secret roles never appear in it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use nightshade_domain::{Accusation, Game, GameResult, Mute, Phase};

/// Error classification carried by `ServerMessage::Error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed or out-of-phase request.
    InvalidRequest,
    /// Unknown game code or player.
    NotFound,
    /// The sender may not perform this action.
    Forbidden,
    /// The aggregate changed underneath the request; resubmit.
    Conflict,
    /// Engine-side failure; the client should wait for the next broadcast.
    Internal,
}

/// Public view of one seat. Roles are private and delivered separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInfo {
    pub username: String,
    pub alive: bool,
    pub muted: Mute,
    pub revealed: bool,
}

/// Full authoritative game state as visible to every lobby member.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub code: String,
    pub round: u32,
    pub phase: Phase,
    pub time_left: u32,
    pub players: Vec<PlayerInfo>,
    pub votes: HashMap<String, String>,
    pub accusation: Option<Accusation>,
    pub awaiting_testaments: Vec<String>,
    pub winner: Option<GameResult>,
}

impl GameSnapshot {
    pub fn from_game(game: &Game) -> Self {
        Self {
            code: game.code.as_str().to_string(),
            round: game.round,
            phase: game.phase,
            time_left: game.time_left,
            players: game
                .players
                .iter()
                .map(|p| PlayerInfo {
                    username: p.username.clone(),
                    alive: p.alive,
                    muted: p.muted,
                    revealed: p.revealed,
                })
                .collect(),
            votes: game.vote_state.votes.clone(),
            accusation: game.accusation.clone(),
            awaiting_testaments: game.awaiting_testaments.clone(),
            winner: game.winner.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_domain::{GameCode, Player, Role};

    #[test]
    fn snapshot_hides_roles() {
        let game = Game::new(
            GameCode::new("WXYZ"),
            vec![Player::new("alice", Role::Killer)],
        );
        let snapshot = GameSnapshot::from_game(&game);
        let json = serde_json::to_string(&snapshot).expect("serialize");
        assert!(!json.contains("killer"));
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.code, "WXYZ");
    }
}
