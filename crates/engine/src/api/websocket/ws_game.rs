//! Handlers for lobby and lifecycle messages.

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use nightshade_domain::GameCode;
use nightshade_shared::{ErrorCode, ServerMessage};

use super::{send, send_error, WsState};
use crate::api::connections::ConnectionError;
use crate::infrastructure::ports::GameRepo;

/// Seat a connection in a game. Joining is idempotent for a reconnecting
/// player; if the game is already running they get a full resync plus
/// their secret role.
pub async fn handle_join(
    state: &Arc<WsState>,
    connection_id: Uuid,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    username: String,
) {
    if let Err(e) = state
        .connections
        .join_game(connection_id, code.clone(), username.clone())
        .await
    {
        let error_code = match e {
            ConnectionError::NotFound => ErrorCode::NotFound,
            ConnectionError::UsernameTaken => ErrorCode::Conflict,
        };
        send(
            sender,
            ServerMessage::Error {
                code: error_code,
                message: e.to_string(),
            },
        )
        .await;
        return;
    }

    // Before StartGame no aggregate exists yet; nothing to resync.
    match state.app.games.get(&code).await {
        Ok(Some(game)) => {
            if let Some(player) = game.player_by_username(&username) {
                send(sender, ServerMessage::RoleAssigned { role: player.role }).await;
            }
            send(
                sender,
                ServerMessage::GameState {
                    snapshot: nightshade_shared::GameSnapshot::from_game(&game),
                },
            )
            .await;
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(code = %code, error = %e, "Failed to load game on join");
        }
    }
}

/// Deal roles to everyone seated in the lobby and open night 1.
pub async fn handle_start(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
) {
    let usernames = state.connections.usernames_in(&code).await;
    let started = match state.app.use_cases.game.start.execute(&code, usernames).await {
        Ok(started) => started,
        Err(e) => {
            send_error(sender, &e).await;
            return;
        }
    };

    state
        .connections
        .broadcast_to_game(
            &code,
            ServerMessage::GameStarted {
                code: code.to_string(),
                players: started.players.clone(),
            },
        )
        .await;
    for (username, role) in &started.assignments {
        state
            .connections
            .send_to_player(&code, username, ServerMessage::RoleAssigned { role: *role })
            .await;
    }
    state
        .connections
        .broadcast_to_game(
            &code,
            ServerMessage::PhaseChanged {
                phase: started.phase,
                round: started.round,
                time_left: started.time_left,
            },
        )
        .await;
    for role in &started.night_roles {
        state
            .connections
            .broadcast_to_game(&code, ServerMessage::NightActionStarted { role: *role })
            .await;
    }
}

/// Reply with the authoritative snapshot (reconnect resync).
pub async fn handle_check_state(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
) {
    match state.app.use_cases.game.snapshot.execute(&code).await {
        Ok(snapshot) => send(sender, ServerMessage::GameState { snapshot }).await,
        Err(e) => send_error(sender, &e).await,
    }
}
