//! The accusation sub-protocol.
//!
//! At most one player may be under accusation per round. Acceptance opens
//! a defense window for the remaining phase time during which only the
//! accused and the accuser may speak.

use std::sync::Arc;

use nightshade_domain::{Accusation, DomainError, GameCode, Phase};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

#[derive(Debug, Clone)]
pub struct AccusationAccepted {
    pub accuser: String,
    pub accused: String,
    /// Remaining phase time, which is the defense window.
    pub time_left: u32,
}

pub struct Accuse {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl Accuse {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    pub async fn execute(
        &self,
        code: &GameCode,
        accuser: &str,
        accused: &str,
    ) -> Result<AccusationAccepted, FlowError> {
        let _guard = self.locks.acquire(code).await;
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        if game.phase != Phase::Accusation {
            return Err(DomainError::action_rejected(format!(
                "accusations are not accepted during {}",
                game.phase
            ))
            .into());
        }
        if game.accusation.is_some() {
            return Err(DomainError::action_rejected("someone is already under accusation").into());
        }
        if accuser == accused {
            return Err(DomainError::action_rejected("you cannot accuse yourself").into());
        }
        for username in [accuser, accused] {
            let alive = game
                .player_by_username(username)
                .map(|p| p.alive)
                .unwrap_or(false);
            if !alive {
                return Err(DomainError::action_rejected(format!(
                    "{username} is not a living player"
                ))
                .into());
            }
        }

        game.accusation = Some(Accusation {
            accuser: accuser.to_string(),
            accused: accused.to_string(),
        });
        let accepted = AccusationAccepted {
            accuser: accuser.to_string(),
            accused: accused.to_string(),
            time_left: game.time_left,
        };
        self.games.save(&mut game).await?;

        tracing::info!(code = %code, accuser, accused, "Accusation accepted");
        Ok(accepted)
    }
}
