//! Night action submission.

use std::sync::Arc;

use nightshade_domain::{ActionKind, GameCode, PlayerId, Role};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

#[derive(Debug, Clone)]
pub struct ActionSubmitted {
    pub role: Role,
    pub target: String,
    /// Every required role has now acted; the caller should trigger
    /// resolution without waiting for the timer.
    pub night_complete: bool,
}

pub struct SubmitAction {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl SubmitAction {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    pub async fn execute(
        &self,
        code: &GameCode,
        actor_id: PlayerId,
        target_username: &str,
        action: ActionKind,
    ) -> Result<ActionSubmitted, FlowError> {
        let _guard = self.locks.acquire(code).await;
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        let (role, target) = game.submit_night_action(actor_id, target_username, action)?;
        let night_complete = game.all_required_actors_acted();
        self.games.save(&mut game).await?;

        tracing::debug!(code = %code, %role, night_complete, "Night action buffered");
        Ok(ActionSubmitted {
            role,
            target,
            night_complete,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_domain::{DomainError, Game, Player};

    use crate::infrastructure::InMemoryGames;

    async fn seeded(roles: &[(&str, Role)]) -> (Arc<InMemoryGames>, GameCode, Game) {
        let repo = Arc::new(InMemoryGames::new());
        let code = GameCode::new("GAME");
        let players = roles
            .iter()
            .map(|(name, role)| Player::new(*name, *role))
            .collect();
        let game = Game::new(code.clone(), players);
        repo.insert(&game).await.expect("insert");
        (repo, code, game)
    }

    #[tokio::test]
    async fn submission_persists_and_reports_completion() {
        let (repo, code, game) =
            seeded(&[("killer", Role::Killer), ("bob", Role::Citizen)]).await;
        let killer = game.player_by_username("killer").expect("killer").id;
        let use_case = SubmitAction::new(repo.clone(), Arc::new(GameLocks::new()));

        let submitted = use_case
            .execute(&code, killer, "bob", ActionKind::Kill)
            .await
            .expect("submit");

        assert_eq!(submitted.role, Role::Killer);
        assert!(submitted.night_complete);
        let stored = repo.get(&code).await.expect("get").expect("present");
        assert!(stored.history_for(1).expect("ledger").has_action_by(killer));
    }

    #[tokio::test]
    async fn rejection_leaves_the_ledger_untouched() {
        let (repo, code, game) =
            seeded(&[("doctor", Role::Doctor), ("bob", Role::Citizen)]).await;
        let doctor = game.player_by_username("doctor").expect("doctor").id;
        let use_case = SubmitAction::new(repo.clone(), Arc::new(GameLocks::new()));

        let err = use_case
            .execute(&code, doctor, "bob", ActionKind::Kill)
            .await
            .expect_err("doctor cannot kill");
        assert!(matches!(
            err,
            FlowError::Domain(DomainError::ActionRejected(_))
        ));

        let stored = repo.get(&code).await.expect("get").expect("present");
        assert!(stored
            .history_for(1)
            .map(|h| h.actions().is_empty())
            .unwrap_or(true));
    }
}
