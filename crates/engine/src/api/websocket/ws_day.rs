//! Handlers for the day cycle: testaments, discussion, accusations and
//! the mayor reveal.

use std::sync::Arc;

use tokio::sync::mpsc;

use nightshade_domain::GameCode;
use nightshade_shared::ServerMessage;

use super::{advance_and_broadcast, send_error, WsState};

pub async fn handle_testament(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    username: String,
    message: Option<String>,
) {
    let accepted = match state
        .app
        .use_cases
        .phase
        .testament
        .execute(&code, &username, message)
        .await
    {
        Ok(accepted) => accepted,
        Err(e) => {
            send_error(sender, &e).await;
            return;
        }
    };

    state
        .connections
        .broadcast_to_game(
            &code,
            ServerMessage::TestamentReceived {
                username: accepted.username,
                message: accepted.message,
            },
        )
        .await;

    if accepted.phase_complete {
        advance_and_broadcast(state, &code).await;
    }
}

pub async fn handle_proceed(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    username: String,
) {
    let recorded = match state
        .app
        .use_cases
        .phase
        .proceed
        .execute(&code, &username)
        .await
    {
        Ok(recorded) => recorded,
        Err(e) => {
            send_error(sender, &e).await;
            return;
        }
    };

    if recorded.all_ready {
        advance_and_broadcast(state, &code).await;
    }
}

pub async fn handle_accuse(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    accuser: String,
    accused: String,
) {
    let accepted = match state
        .app
        .use_cases
        .phase
        .accuse
        .execute(&code, &accuser, &accused)
        .await
    {
        Ok(accepted) => accepted,
        Err(e) => {
            send_error(sender, &e).await;
            return;
        }
    };

    state
        .connections
        .broadcast_to_game(
            &code,
            ServerMessage::AccusationStarted {
                accuser: accepted.accuser,
                accused: accepted.accused,
                time_left: accepted.time_left,
            },
        )
        .await;
}

pub async fn handle_reveal_mayor(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    username: String,
) {
    if let Err(e) = state
        .app
        .use_cases
        .phase
        .reveal_mayor
        .execute(&code, &username)
        .await
    {
        send_error(sender, &e).await;
        return;
    }

    state
        .connections
        .broadcast_to_game(&code, ServerMessage::MayorRevealed { username })
        .await;
}
