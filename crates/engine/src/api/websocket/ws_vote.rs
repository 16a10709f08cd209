//! Handler for ballot casting.

use std::sync::Arc;

use tokio::sync::mpsc;

use nightshade_domain::GameCode;
use nightshade_shared::ServerMessage;

use super::{advance_and_broadcast, send_error, WsState};

/// Record (or change) a ballot and publish the live box. When the last
/// eligible voter casts, the vote ends early.
pub async fn handle_cast(
    state: &Arc<WsState>,
    sender: &mpsc::Sender<ServerMessage>,
    code: GameCode,
    username: String,
    vote: String,
) {
    let cast = match state
        .app
        .use_cases
        .voting
        .cast
        .execute(&code, &username, &vote)
        .await
    {
        Ok(cast) => cast,
        Err(e) => {
            send_error(sender, &e).await;
            return;
        }
    };

    state
        .connections
        .broadcast_to_game(
            &code,
            ServerMessage::VoteUpdate {
                votes: cast.votes,
                time_left: cast.time_left,
            },
        )
        .await;

    if cast.all_voted {
        advance_and_broadcast(state, &code).await;
    }
}
