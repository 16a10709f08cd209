//! WebSocket message types for engine-client communication
//!
//! This module contains all message types exchanged over the WebSocket
//! connection. The engine receives `ClientMessage` and broadcasts
//! `ServerMessage` to every member of a lobby (or a single player for
//! private results such as investigations).
//!
//! ## Versioning Policy
//!
//! - New variants can be added at the end (forward compatible)
//! - Removing variants requires major version bump
//! - Renaming variants is a breaking change
//! - Unknown enum variants deserialize to `Unknown` for forward compatibility

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::responses::{ErrorCode, GameSnapshot};
use nightshade_domain::{ActionKind, Faction, MuteNotice, Phase, Role, Verdict, Wills};

// =============================================================================
// Client Messages (Player -> Engine)
// =============================================================================

/// Messages from client to server.
///
/// Every game-scoped message carries the lobby `code`; the engine never
/// infers the game from the connection alone, so a resynced client can
/// resume without a handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Associate this connection with a lobby seat.
    #[serde(rename_all = "camelCase")]
    JoinGame { code: String, username: String },
    /// Host starts the game: roles are dealt and night 1 begins.
    #[serde(rename_all = "camelCase")]
    StartGame { code: String },
    /// Submit one covert action for the current night.
    #[serde(rename_all = "camelCase")]
    SubmitNightAction {
        code: String,
        actor_id: Uuid,
        target_username: String,
        action: ActionKind,
    },
    /// Cast or change a ballot during the voting phase.
    #[serde(rename_all = "camelCase")]
    CastVote {
        code: String,
        username: String,
        /// A living player's username or `"abstain"`.
        vote: String,
    },
    /// Deliver (or decline, with `None`) a testament.
    #[serde(rename_all = "camelCase")]
    TestamentMessage {
        code: String,
        username: String,
        message: Option<String>,
    },
    /// Vote to cut the discussion phase short.
    #[serde(rename_all = "camelCase")]
    VoteToProceed { code: String, username: String },
    /// Put a living player under accusation.
    #[serde(rename_all = "camelCase")]
    Accuse {
        code: String,
        accuser: String,
        accused: String,
    },
    /// Mayor goes public; their ballot counts as three from now on.
    #[serde(rename_all = "camelCase")]
    RevealMayor { code: String, username: String },
    /// Request a full authoritative snapshot (reconnect resync).
    #[serde(rename_all = "camelCase")]
    CheckGameState { code: String },
    /// Heartbeat ping.
    Heartbeat,

    /// Unknown message type for forward compatibility.
    #[serde(other)]
    Unknown,
}

// =============================================================================
// Server Messages (Engine -> Player)
// =============================================================================

/// Messages from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The lobby's game has begun.
    #[serde(rename_all = "camelCase")]
    GameStarted { code: String, players: Vec<String> },
    /// Private: the receiving player's secret role.
    #[serde(rename_all = "camelCase")]
    RoleAssigned { role: Role },
    /// Broadcast at night start, once per role that must act.
    #[serde(rename_all = "camelCase")]
    NightActionStarted { role: Role },
    /// Broadcast when a required role has locked in its action.
    #[serde(rename_all = "camelCase")]
    NightActionCompleted { role: Role, target: String },
    /// Public outcome of the night's resolution.
    #[serde(rename_all = "camelCase")]
    NightEnded {
        deaths: Vec<String>,
        muted: HashMap<String, MuteNotice>,
        wills: Wills,
    },
    /// Private: sheriff's investigation verdict.
    #[serde(rename_all = "camelCase")]
    InvestigationResult { target: String, verdict: Verdict },
    /// Private: lookout's visitor enumeration.
    #[serde(rename_all = "camelCase")]
    LookoutResult {
        target: String,
        visitors: Vec<String>,
    },
    /// Authoritative phase transition with a fresh countdown.
    #[serde(rename_all = "camelCase")]
    PhaseChanged {
        phase: Phase,
        round: u32,
        time_left: u32,
    },
    /// Live ballot box during the voting phase.
    #[serde(rename_all = "camelCase")]
    VoteUpdate {
        votes: HashMap<String, String>,
        time_left: u32,
    },
    /// Final tally for the round's vote.
    #[serde(rename_all = "camelCase")]
    VoteEnded {
        eliminated_player: Option<String>,
        vote_counts: HashMap<String, u32>,
        total_votes: u32,
        tie: bool,
    },
    /// A testament was delivered (or declined, with `None`).
    #[serde(rename_all = "camelCase")]
    TestamentReceived {
        username: String,
        message: Option<String>,
    },
    /// An accusation was accepted; the defense window is open.
    #[serde(rename_all = "camelCase")]
    AccusationStarted {
        accuser: String,
        accused: String,
        time_left: u32,
    },
    /// The mayor has gone public.
    #[serde(rename_all = "camelCase")]
    MayorRevealed { username: String },
    /// Terminal result.
    #[serde(rename_all = "camelCase")]
    GameOver {
        winner: Faction,
        message: String,
        alive_players: Vec<String>,
    },
    /// The next round's night has begun.
    #[serde(rename_all = "camelCase")]
    NextRound { round: u32 },
    /// Full authoritative snapshot for resync.
    #[serde(rename_all = "camelCase")]
    GameState { snapshot: GameSnapshot },
    /// Request-scoped failure; never broadcast.
    #[serde(rename_all = "camelCase")]
    Error { code: ErrorCode, message: String },
    /// Heartbeat reply.
    Pong,

    /// Unknown message type for forward compatibility.
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_message_round_trips_with_type_tag() {
        let json = r#"{
            "type": "submitNightAction",
            "code": "ABCD",
            "actorId": "2f1b2c3d-0000-0000-0000-000000000001",
            "targetUsername": "bob",
            "action": "kill"
        }"#;
        let msg: ClientMessage = serde_json::from_str(json).expect("deserialize");
        match msg {
            ClientMessage::SubmitNightAction {
                code,
                target_username,
                action,
                ..
            } => {
                assert_eq!(code, "ABCD");
                assert_eq!(target_username, "bob");
                assert_eq!(action, ActionKind::Kill);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn unknown_client_message_does_not_fail_deserialization() {
        let json = r#"{"type": "somethingFromTheFuture"}"#;
        let msg: ClientMessage = serde_json::from_str(json).expect("deserialize");
        assert!(matches!(msg, ClientMessage::Unknown));
    }

    #[test]
    fn server_message_serializes_phase_in_kebab_case() {
        let msg = ServerMessage::PhaseChanged {
            phase: Phase::TestamentWrite,
            round: 3,
            time_left: 30,
        };
        let json = serde_json::to_value(&msg).expect("serialize");
        assert_eq!(json["type"], "phaseChanged");
        assert_eq!(json["phase"], "testament-write");
        assert_eq!(json["timeLeft"], 30);
    }
}
