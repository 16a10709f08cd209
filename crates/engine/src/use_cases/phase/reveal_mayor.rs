//! Mayor reveal.

use std::sync::Arc;

use nightshade_domain::{DomainError, GameCode, Role};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

pub struct RevealMayor {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl RevealMayor {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    /// Going public is permanent; from here on the mayor's ballot carries
    /// triple weight.
    pub async fn execute(&self, code: &GameCode, username: &str) -> Result<(), FlowError> {
        let _guard = self.locks.acquire(code).await;
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        if game.phase.is_terminal() {
            return Err(DomainError::action_rejected("the game is over").into());
        }
        let player = game
            .player_by_username(username)
            .ok_or_else(|| DomainError::not_found("Player", username.to_string()))?;
        if !player.alive {
            return Err(DomainError::action_rejected("dead players cannot reveal").into());
        }
        if player.role != Role::Mayor {
            return Err(DomainError::action_rejected("only the mayor may reveal").into());
        }
        if player.revealed {
            return Err(DomainError::action_rejected("the mayor is already revealed").into());
        }

        if let Some(player) = game.player_by_username_mut(username) {
            player.revealed = true;
        }
        self.games.save(&mut game).await?;

        tracing::info!(code = %code, username, "Mayor revealed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_domain::{Game, Player};

    use crate::infrastructure::InMemoryGames;

    #[tokio::test]
    async fn reveal_is_one_way_and_role_gated() {
        let repo = Arc::new(InMemoryGames::new());
        let code = GameCode::new("GAME");
        let game = Game::new(
            code.clone(),
            vec![
                Player::new("mayor", Role::Mayor),
                Player::new("a", Role::Citizen),
            ],
        );
        repo.insert(&game).await.expect("insert");
        let use_case = RevealMayor::new(repo.clone(), Arc::new(GameLocks::new()));

        assert!(use_case.execute(&code, "a").await.is_err());

        use_case.execute(&code, "mayor").await.expect("reveal");
        let stored = repo.get(&code).await.expect("get").expect("present");
        assert!(stored.player_by_username("mayor").expect("mayor").revealed);

        assert!(use_case.execute(&code, "mayor").await.is_err());
    }
}
