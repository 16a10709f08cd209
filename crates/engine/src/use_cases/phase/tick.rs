//! The one-second timer pass over every running game.
//!
//! Each game's countdown is decremented under that game's lock. Failures
//! on one game are logged and never stall the others.

use std::collections::HashMap;
use std::sync::Arc;

use nightshade_domain::{GameCode, Phase};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;

/// What a tick pass asks the caller to do.
#[derive(Debug, Clone)]
pub enum TickEvent {
    /// Voting is live; rebroadcast the ballot box with the new countdown.
    VoteUpdate {
        code: GameCode,
        votes: HashMap<String, String>,
        time_left: u32,
    },
    /// A phase timer reached zero; the caller advances the state machine.
    TimerExpired { code: GameCode },
}

pub struct TickGames {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl TickGames {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    pub async fn execute(&self) -> Vec<TickEvent> {
        let codes = match self.games.list_codes().await {
            Ok(codes) => codes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list games for tick");
                return Vec::new();
            }
        };

        let mut events = Vec::new();
        for code in codes {
            let _guard = self.locks.acquire(&code).await;
            let mut game = match self.games.get(&code).await {
                Ok(Some(game)) => game,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(code = %code, error = %e, "Failed to load game for tick");
                    continue;
                }
            };
            if game.phase.is_terminal() || game.time_left == 0 {
                continue;
            }

            game.time_left -= 1;
            if game.phase == Phase::Voting {
                game.vote_state.time_left = game.time_left;
            }
            if let Err(e) = self.games.save(&mut game).await {
                tracing::warn!(code = %code, error = %e, "Failed to save ticked game");
                continue;
            }

            if game.phase == Phase::Voting {
                events.push(TickEvent::VoteUpdate {
                    code: code.clone(),
                    votes: game.vote_state.votes.clone(),
                    time_left: game.time_left,
                });
            }
            if game.time_left == 0 {
                events.push(TickEvent::TimerExpired { code });
            }
        }
        events
    }
}
