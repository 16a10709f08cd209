//! WebSocket handling for game clients.
//!
//! One socket per client. Incoming frames are parsed into the closed
//! [`ClientMessage`] union at the boundary and dispatched to handlers;
//! outgoing traffic flows through a per-connection channel so broadcasts
//! never block on a slow socket.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use uuid::Uuid;

use nightshade_domain::{DomainError, GameCode};
use nightshade_shared::{ClientMessage, ErrorCode, ServerMessage};

use super::connections::ConnectionManager;
use crate::app::App;
use crate::use_cases::night::NightResolution;
use crate::use_cases::phase::{AdvanceOutcome, PhaseChange};
use crate::use_cases::voting::VoteOutcome;
use crate::use_cases::FlowError;

mod ws_day;
mod ws_game;
mod ws_night;
mod ws_vote;

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Combined state for WebSocket handlers.
pub struct WsState {
    pub app: Arc<App>,
    pub connections: Arc<ConnectionManager>,
}

/// Axum handler for `GET /ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<WsState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsState>) {
    let connection_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    state.connections.register(connection_id, tx.clone()).await;

    // Writer task: drain the channel into the socket.
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&message) {
                Ok(text) => text,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to serialize server message");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => dispatch(&state, connection_id, &tx, message).await,
                Err(e) => {
                    tracing::debug!(connection_id = %connection_id, error = %e, "Unparseable frame");
                    send(
                        &tx,
                        ServerMessage::Error {
                            code: ErrorCode::InvalidRequest,
                            message: "malformed message".to_string(),
                        },
                    )
                    .await;
                }
            },
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => {}
        }
    }

    state.connections.unregister(connection_id).await;
    writer.abort();
    tracing::debug!(connection_id = %connection_id, "Socket closed");
}

async fn dispatch(
    state: &Arc<WsState>,
    connection_id: Uuid,
    sender: &mpsc::Sender<ServerMessage>,
    message: ClientMessage,
) {
    match message {
        ClientMessage::JoinGame { code, username } => {
            ws_game::handle_join(state, connection_id, sender, GameCode::new(code), username).await;
        }
        ClientMessage::StartGame { code } => {
            ws_game::handle_start(state, sender, GameCode::new(code)).await;
        }
        ClientMessage::CheckGameState { code } => {
            ws_game::handle_check_state(state, sender, GameCode::new(code)).await;
        }
        ClientMessage::SubmitNightAction {
            code,
            actor_id,
            target_username,
            action,
        } => {
            ws_night::handle_submit(
                state,
                sender,
                GameCode::new(code),
                actor_id.into(),
                target_username,
                action,
            )
            .await;
        }
        ClientMessage::CastVote {
            code,
            username,
            vote,
        } => {
            ws_vote::handle_cast(state, sender, GameCode::new(code), username, vote).await;
        }
        ClientMessage::TestamentMessage {
            code,
            username,
            message,
        } => {
            ws_day::handle_testament(state, sender, GameCode::new(code), username, message).await;
        }
        ClientMessage::VoteToProceed { code, username } => {
            ws_day::handle_proceed(state, sender, GameCode::new(code), username).await;
        }
        ClientMessage::Accuse {
            code,
            accuser,
            accused,
        } => {
            ws_day::handle_accuse(state, sender, GameCode::new(code), accuser, accused).await;
        }
        ClientMessage::RevealMayor { code, username } => {
            ws_day::handle_reveal_mayor(state, sender, GameCode::new(code), username).await;
        }
        ClientMessage::Heartbeat => {
            send(sender, ServerMessage::Pong).await;
        }
        ClientMessage::Unknown => {
            send(
                sender,
                ServerMessage::Error {
                    code: ErrorCode::InvalidRequest,
                    message: "unknown message type".to_string(),
                },
            )
            .await;
        }
    }
}

pub(crate) async fn send(sender: &mpsc::Sender<ServerMessage>, message: ServerMessage) {
    if let Err(e) = sender.try_send(message) {
        tracing::warn!(error = %e, "Failed to queue message for connection");
    }
}

/// Map a use-case failure to its wire classification.
pub(crate) fn error_code_for(err: &FlowError) -> ErrorCode {
    match err {
        FlowError::GameNotFound(_) => ErrorCode::NotFound,
        FlowError::Domain(DomainError::NotFound { .. }) => ErrorCode::NotFound,
        FlowError::Domain(_) => ErrorCode::InvalidRequest,
        FlowError::Repo(repo) if repo.is_conflict() => ErrorCode::Conflict,
        FlowError::Repo(_) => ErrorCode::Internal,
    }
}

pub(crate) async fn send_error(sender: &mpsc::Sender<ServerMessage>, err: &FlowError) {
    send(
        sender,
        ServerMessage::Error {
            code: error_code_for(err),
            message: err.to_string(),
        },
    )
    .await;
}

/// Run the state machine for `code` and broadcast whatever came out.
/// Shared by the completion-signal handlers and the timer loop.
pub(crate) async fn advance_and_broadcast(state: &WsState, code: &GameCode) {
    match state.app.use_cases.phase.advance.execute(code).await {
        Ok(outcome) => broadcast_outcome(state, code, outcome).await,
        Err(e) => {
            tracing::error!(code = %code, error = %e, "Failed to advance phase");
        }
    }
}

pub(crate) async fn broadcast_outcome(state: &WsState, code: &GameCode, outcome: AdvanceOutcome) {
    match outcome {
        AdvanceOutcome::Idle => {}
        AdvanceOutcome::Phase(change) => broadcast_phase_change(state, code, &change).await,
        AdvanceOutcome::Night(resolution) => broadcast_resolution(state, code, &resolution).await,
        AdvanceOutcome::Vote(vote) => broadcast_vote_outcome(state, code, &vote).await,
    }
}

async fn broadcast_phase_change(state: &WsState, code: &GameCode, change: &PhaseChange) {
    if change.next_round {
        state
            .connections
            .broadcast_to_game(
                code,
                ServerMessage::NextRound {
                    round: change.round,
                },
            )
            .await;
    }
    state
        .connections
        .broadcast_to_game(
            code,
            ServerMessage::PhaseChanged {
                phase: change.phase,
                round: change.round,
                time_left: change.time_left,
            },
        )
        .await;
    for role in &change.night_roles {
        state
            .connections
            .broadcast_to_game(code, ServerMessage::NightActionStarted { role: *role })
            .await;
    }
}

async fn broadcast_resolution(state: &WsState, code: &GameCode, resolution: &NightResolution) {
    state
        .connections
        .broadcast_to_game(
            code,
            ServerMessage::NightEnded {
                deaths: resolution.report.deaths.clone(),
                muted: resolution.report.muted.clone(),
                wills: resolution.report.wills.clone(),
            },
        )
        .await;

    // Investigation and lookout results are private to their actors.
    for investigation in &resolution.report.investigations {
        state
            .connections
            .send_to_player(
                code,
                &investigation.sheriff,
                ServerMessage::InvestigationResult {
                    target: investigation.target.clone(),
                    verdict: investigation.verdict,
                },
            )
            .await;
    }
    for lookout in &resolution.report.lookout_results {
        state
            .connections
            .send_to_player(
                code,
                &lookout.lookout,
                ServerMessage::LookoutResult {
                    target: lookout.target.clone(),
                    visitors: lookout.visitors.clone(),
                },
            )
            .await;
    }

    state
        .connections
        .broadcast_to_game(
            code,
            ServerMessage::PhaseChanged {
                phase: resolution.phase,
                round: resolution.round,
                time_left: resolution.time_left,
            },
        )
        .await;

    if let Some(winner) = &resolution.winner {
        broadcast_game_over(state, code, winner).await;
    }
}

async fn broadcast_vote_outcome(state: &WsState, code: &GameCode, vote: &VoteOutcome) {
    state
        .connections
        .broadcast_to_game(
            code,
            ServerMessage::VoteEnded {
                eliminated_player: vote.tally.eliminated_player.clone(),
                vote_counts: vote.tally.vote_counts.clone(),
                total_votes: vote.tally.total_votes,
                tie: vote.tally.tie,
            },
        )
        .await;
    state
        .connections
        .broadcast_to_game(
            code,
            ServerMessage::PhaseChanged {
                phase: vote.phase,
                round: vote.round,
                time_left: vote.time_left,
            },
        )
        .await;
    if let Some(winner) = &vote.winner {
        broadcast_game_over(state, code, winner).await;
    }
}

async fn broadcast_game_over(
    state: &WsState,
    code: &GameCode,
    result: &nightshade_domain::GameResult,
) {
    state
        .connections
        .broadcast_to_game(
            code,
            ServerMessage::GameOver {
                winner: result.winner,
                message: result.message.clone(),
                alive_players: result.alive_players.clone(),
            },
        )
        .await;
}
