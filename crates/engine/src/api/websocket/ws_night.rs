//! Handler for night-action submission.

use std::sync::Arc;

use tokio::sync::mpsc;

use nightshade_domain::{ActionKind, GameCode, PlayerId};
use nightshade_shared::ServerMessage;

use super::{advance_and_broadcast, send_error, WsState};

/// Buffer one covert action. The broadcast names the acting role but not
/// the actor, and if every required role has now acted the night resolves
/// immediately instead of waiting out the timer.
pub async fn handle_submit(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    actor_id: PlayerId,
    target_username: String,
    action: ActionKind,
) {
    let submitted = match state
        .app
        .use_cases
        .night
        .submit
        .execute(&code, actor_id, &target_username, action)
        .await
    {
        Ok(submitted) => submitted,
        Err(e) => {
            send_error(sender, &e).await;
            return;
        }
    };

    state
        .connections
        .broadcast_to_game(
            &code,
            ServerMessage::NightActionCompleted {
                role: submitted.role,
                target: submitted.target,
            },
        )
        .await;

    if submitted.night_complete {
        advance_and_broadcast(state, &code).await;
    }
}
