//! Vote closing and elimination.

use std::sync::Arc;

use nightshade_domain::{
    check_win_condition, tally, Faction, GameCode, GameResult, Phase, Role, TallyOutcome,
};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

/// Broadcastable outcome of one closed vote.
#[derive(Debug, Clone)]
pub struct VoteOutcome {
    pub tally: TallyOutcome,
    pub phase: Phase,
    pub round: u32,
    pub time_left: u32,
    pub winner: Option<GameResult>,
}

pub struct EndVote {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl EndVote {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    pub async fn execute(&self, code: &GameCode) -> Result<Option<VoteOutcome>, FlowError> {
        let _guard = self.locks.acquire(code).await;
        self.execute_locked(code).await
    }

    /// Caller already holds the game lock. A trigger that arrives after the
    /// vote already closed (timer racing the final ballot) returns `None`.
    pub(crate) async fn execute_locked(
        &self,
        code: &GameCode,
    ) -> Result<Option<VoteOutcome>, FlowError> {
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;
        if game.phase != Phase::Voting {
            return Ok(None);
        }

        let outcome = tally(&game);
        let mut winner: Option<GameResult> = None;

        if let Some(name) = outcome.eliminated_player.clone() {
            let mut eliminated_role = None;
            if let Some(player) = game.player_by_username_mut(&name) {
                player.alive = false;
                eliminated_role = Some(player.role);
            }
            game.last_elimination = Some(name.clone());

            // Being voted out is exactly what the sacrifice wanted.
            if eliminated_role == Some(Role::Sacrifice) {
                winner = Some(GameResult {
                    winner: Faction::Sacrifice,
                    message: format!("{name} was voted out, which was the plan all along."),
                    alive_players: game.alive_usernames(),
                });
            }
        } else {
            game.last_elimination = None;
        }

        if winner.is_none() {
            winner = check_win_condition(&game.players);
        }

        game.vote_state.reset();
        if let Some(result) = winner.clone() {
            game.winner = Some(result);
            game.begin_phase(Phase::GameOver);
        } else {
            game.begin_phase(Phase::Results);
        }

        let result = VoteOutcome {
            tally: outcome,
            phase: game.phase,
            round: game.round,
            time_left: game.time_left,
            winner,
        };
        self.games.save(&mut game).await?;

        tracing::info!(
            code = %code,
            eliminated = ?result.tally.eliminated_player,
            tie = result.tally.tie,
            "Vote closed"
        );
        Ok(Some(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_domain::{Game, Player};

    use crate::infrastructure::InMemoryGames;

    async fn voting_game(
        roles: &[(&str, Role)],
        votes: &[(&str, &str)],
    ) -> (Arc<InMemoryGames>, GameCode) {
        let repo = Arc::new(InMemoryGames::new());
        let code = GameCode::new("GAME");
        let players = roles
            .iter()
            .map(|(name, role)| Player::new(*name, *role))
            .collect();
        let mut game = Game::new(code.clone(), players);
        game.begin_phase(Phase::Voting);
        for (voter, choice) in votes {
            game.vote_state.record(*voter, *choice);
        }
        repo.insert(&game).await.expect("insert");
        (repo, code)
    }

    #[tokio::test]
    async fn plurality_eliminates_and_moves_to_results() {
        let (repo, code) = voting_game(
            &[
                ("a", Role::Citizen),
                ("b", Role::Citizen),
                ("c", Role::Citizen),
                ("killer", Role::Killer),
            ],
            &[("a", "b"), ("c", "b"), ("killer", "a"), ("b", "a")],
        )
        .await;
        let use_case = EndVote::new(repo.clone(), Arc::new(GameLocks::new()));

        let outcome = use_case
            .execute(&code)
            .await
            .expect("end vote")
            .expect("closed");

        assert_eq!(outcome.tally.eliminated_player.as_deref(), Some("b"));
        assert_eq!(outcome.phase, Phase::Results);
        let stored = repo.get(&code).await.expect("get").expect("present");
        assert!(!stored.player_by_username("b").expect("b").alive);
        assert_eq!(stored.last_elimination.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn tie_eliminates_nobody() {
        let (repo, code) = voting_game(
            &[
                ("a", Role::Citizen),
                ("b", Role::Citizen),
                ("killer", Role::Killer),
            ],
            &[("a", "b"), ("b", "a")],
        )
        .await;
        let use_case = EndVote::new(repo.clone(), Arc::new(GameLocks::new()));

        let outcome = use_case
            .execute(&code)
            .await
            .expect("end vote")
            .expect("closed");

        assert!(outcome.tally.tie);
        assert_eq!(outcome.tally.eliminated_player, None);
        let stored = repo.get(&code).await.expect("get").expect("present");
        assert!(stored.last_elimination.is_none());
        assert!(stored.alive_players().count() == 3);
    }

    #[tokio::test]
    async fn voting_out_the_sacrifice_ends_the_game() {
        let (repo, code) = voting_game(
            &[
                ("martyr", Role::Sacrifice),
                ("a", Role::Citizen),
                ("b", Role::Citizen),
                ("killer", Role::Killer),
            ],
            &[("a", "martyr"), ("b", "martyr"), ("killer", "martyr")],
        )
        .await;
        let use_case = EndVote::new(repo.clone(), Arc::new(GameLocks::new()));

        let outcome = use_case
            .execute(&code)
            .await
            .expect("end vote")
            .expect("closed");

        let winner = outcome.winner.expect("sacrifice wins");
        assert_eq!(winner.winner, Faction::Sacrifice);
        assert_eq!(outcome.phase, Phase::GameOver);
    }

    #[tokio::test]
    async fn eliminating_the_last_threat_wins_for_town() {
        let (repo, code) = voting_game(
            &[
                ("killer", Role::Killer),
                ("a", Role::Citizen),
                ("b", Role::Citizen),
            ],
            &[("a", "killer"), ("b", "killer")],
        )
        .await;
        let use_case = EndVote::new(repo.clone(), Arc::new(GameLocks::new()));

        let outcome = use_case
            .execute(&code)
            .await
            .expect("end vote")
            .expect("closed");
        let winner = outcome.winner.expect("town wins");
        assert_eq!(winner.winner, Faction::Town);
    }

    #[tokio::test]
    async fn stale_trigger_outside_voting_is_a_noop() {
        let (repo, code) = voting_game(&[("a", Role::Citizen)], &[]).await;
        {
            let mut game = repo.get(&code).await.expect("get").expect("present");
            game.begin_phase(Phase::Results);
            repo.save(&mut game).await.expect("save");
        }
        let use_case = EndVote::new(repo, Arc::new(GameLocks::new()));

        assert!(use_case.execute(&code).await.expect("noop").is_none());
    }
}
