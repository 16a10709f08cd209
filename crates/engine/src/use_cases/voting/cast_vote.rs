//! Ballot casting.

use std::collections::HashMap;
use std::sync::Arc;

use nightshade_domain::{DomainError, GameCode, ABSTAIN};

use crate::infrastructure::ports::{ClockPort, GameRepo};
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

#[derive(Debug, Clone)]
pub struct VoteCast {
    pub votes: HashMap<String, String>,
    pub time_left: u32,
    /// Every eligible voter has now cast; the caller should end the vote
    /// without waiting for the timer.
    pub all_voted: bool,
}

pub struct CastVote {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
    clock: Arc<dyn ClockPort>,
}

impl CastVote {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>, clock: Arc<dyn ClockPort>) -> Self {
        Self {
            games,
            locks,
            clock,
        }
    }

    /// Record (or change) a ballot. Revoting overwrites; vote-muted players
    /// are rejected here so their ballots never reach the tally.
    pub async fn execute(
        &self,
        code: &GameCode,
        username: &str,
        vote: &str,
    ) -> Result<VoteCast, FlowError> {
        let _guard = self.locks.acquire(code).await;
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        if !game.phase.accepts_votes() {
            return Err(DomainError::action_rejected(format!(
                "votes are not accepted during {}",
                game.phase
            ))
            .into());
        }
        let voter = game
            .player_by_username(username)
            .ok_or_else(|| DomainError::not_found("Player", username.to_string()))?;
        if !voter.alive {
            return Err(DomainError::action_rejected("dead players cannot vote").into());
        }
        if voter.is_vote_muted() {
            return Err(DomainError::action_rejected("your vote is muted this round").into());
        }
        if vote != ABSTAIN {
            let valid = game
                .player_by_username(vote)
                .map(|p| p.alive)
                .unwrap_or(false);
            if !valid {
                return Err(
                    DomainError::action_rejected(format!("{vote} is not a votable player")).into(),
                );
            }
        }

        if game.vote_state.started_at.is_none() {
            game.vote_state.started_at = Some(self.clock.now());
        }
        game.vote_state.record(username, vote);
        let all_voted = game.all_alive_voted();
        let snapshot = VoteCast {
            votes: game.vote_state.votes.clone(),
            time_left: game.vote_state.time_left,
            all_voted,
        };
        self.games.save(&mut game).await?;

        tracing::debug!(code = %code, voter = username, all_voted, "Ballot recorded");
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nightshade_domain::{Game, Mute, Phase, Player, Role};

    use crate::infrastructure::clock::SystemClock;
    use crate::infrastructure::InMemoryGames;

    async fn voting_game(roles: &[(&str, Role)]) -> (Arc<InMemoryGames>, GameCode) {
        let repo = Arc::new(InMemoryGames::new());
        let code = GameCode::new("GAME");
        let players = roles
            .iter()
            .map(|(name, role)| Player::new(*name, *role))
            .collect();
        let mut game = Game::new(code.clone(), players);
        game.begin_phase(Phase::Voting);
        repo.insert(&game).await.expect("insert");
        (repo, code)
    }

    fn use_case(repo: Arc<InMemoryGames>) -> CastVote {
        CastVote::new(repo, Arc::new(GameLocks::new()), Arc::new(SystemClock::new()))
    }

    #[tokio::test]
    async fn ballots_accumulate_until_everyone_voted() {
        let (repo, code) =
            voting_game(&[("a", Role::Citizen), ("b", Role::Citizen)]).await;
        let cast = use_case(repo.clone());

        let first = cast.execute(&code, "a", "b").await.expect("a votes");
        assert!(!first.all_voted);

        let second = cast.execute(&code, "b", ABSTAIN).await.expect("b votes");
        assert!(second.all_voted);
        assert_eq!(second.votes.len(), 2);
    }

    #[tokio::test]
    async fn vote_muted_players_are_rejected_at_submission() {
        let (repo, code) =
            voting_game(&[("a", Role::Citizen), ("b", Role::Citizen)]).await;
        {
            let mut game = repo.get(&code).await.expect("get").expect("present");
            game.player_by_username_mut("a").expect("a").muted = Mute::Vote;
            repo.save(&mut game).await.expect("save");
        }
        let cast = use_case(repo);

        let err = cast.execute(&code, "a", "b").await.expect_err("muted");
        assert!(matches!(
            err,
            FlowError::Domain(DomainError::ActionRejected(_))
        ));
    }

    #[tokio::test]
    async fn votes_for_dead_players_are_rejected() {
        let (repo, code) =
            voting_game(&[("a", Role::Citizen), ("b", Role::Citizen)]).await;
        {
            let mut game = repo.get(&code).await.expect("get").expect("present");
            game.player_by_username_mut("b").expect("b").alive = false;
            repo.save(&mut game).await.expect("save");
        }
        let cast = use_case(repo);

        assert!(cast.execute(&code, "a", "b").await.is_err());
    }

    #[tokio::test]
    async fn votes_outside_voting_phase_are_rejected() {
        let (repo, code) =
            voting_game(&[("a", Role::Citizen), ("b", Role::Citizen)]).await;
        {
            let mut game = repo.get(&code).await.expect("get").expect("present");
            game.begin_phase(Phase::Discussion);
            repo.save(&mut game).await.expect("save");
        }
        let cast = use_case(repo);

        assert!(cast.execute(&code, "a", ABSTAIN).await.is_err());
    }
}
