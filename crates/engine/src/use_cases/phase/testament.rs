//! Testament collection.
//!
//! Covers both windows: the post-night testaments of players who died with
//! a will, and the eliminated player's testament-write window after a vote.

use std::sync::Arc;

use nightshade_domain::{DomainError, GameCode, Phase};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

#[derive(Debug, Clone)]
pub struct TestamentAccepted {
    pub username: String,
    pub message: Option<String>,
    /// Everyone owed a testament this phase has now delivered; the caller
    /// should advance without waiting for the timer.
    pub phase_complete: bool,
}

pub struct SubmitTestament {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl SubmitTestament {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    /// Record a testament, or an explicit decline when `message` is `None`.
    pub async fn execute(
        &self,
        code: &GameCode,
        username: &str,
        message: Option<String>,
    ) -> Result<TestamentAccepted, FlowError> {
        let _guard = self.locks.acquire(code).await;
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        if !game.phase.accepts_testaments() {
            return Err(DomainError::action_rejected(format!(
                "testaments are not accepted during {}",
                game.phase
            ))
            .into());
        }
        if !game.awaiting_testaments.iter().any(|u| u == username) {
            return Err(DomainError::action_rejected("no testament owed").into());
        }

        game.wills.insert(username.to_string(), message.clone());
        game.awaiting_testaments.retain(|u| u != username);
        let phase_complete = match game.phase {
            Phase::Testaments => game.all_testaments_in(),
            // The write window belongs to a single player.
            Phase::TestamentWrite => true,
            _ => false,
        };
        self.games.save(&mut game).await?;

        tracing::debug!(code = %code, username, phase_complete, "Testament recorded");
        Ok(TestamentAccepted {
            username: username.to_string(),
            message,
            phase_complete,
        })
    }
}
