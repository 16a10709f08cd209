//! Proceed votes: cutting the discussion phase short.

use std::sync::Arc;

use nightshade_domain::{DomainError, GameCode, Phase};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

#[derive(Debug, Clone)]
pub struct ProceedRecorded {
    /// Every alive player wants to move on.
    pub all_ready: bool,
}

pub struct VoteToProceed {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl VoteToProceed {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    pub async fn execute(&self, code: &GameCode, username: &str) -> Result<ProceedRecorded, FlowError> {
        let _guard = self.locks.acquire(code).await;
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        if game.phase != Phase::Discussion {
            return Err(DomainError::action_rejected(format!(
                "proceed votes are not accepted during {}",
                game.phase
            ))
            .into());
        }
        let alive = game
            .player_by_username(username)
            .map(|p| p.alive)
            .unwrap_or(false);
        if !alive {
            return Err(DomainError::action_rejected("only living players may vote to proceed").into());
        }

        game.proceed_votes.insert(username.to_string());
        let all_ready = game.all_voted_to_proceed();
        self.games.save(&mut game).await?;

        Ok(ProceedRecorded { all_ready })
    }
}
