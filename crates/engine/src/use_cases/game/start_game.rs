//! Game start: deal roles to the lobby roster and open night 1.

use std::sync::Arc;

use rand::seq::SliceRandom;

use nightshade_domain::{role_deck, DomainError, Game, GameCode, Phase, Player, Role};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

/// A playable deal needs enough seats for the core roles to matter.
const MIN_PLAYERS: usize = 4;

#[derive(Debug, Clone)]
pub struct GameStarted {
    pub code: GameCode,
    pub players: Vec<String>,
    /// Secret deal; each entry is delivered privately to its player.
    pub assignments: Vec<(String, Role)>,
    pub phase: Phase,
    pub round: u32,
    pub time_left: u32,
    /// Roles that must act in the opening night.
    pub night_roles: Vec<Role>,
}

pub struct StartGame {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl StartGame {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    /// Create the aggregate from the lobby roster. The lobby system owns
    /// membership; the engine only receives the final list of usernames.
    pub async fn execute(
        &self,
        code: &GameCode,
        usernames: Vec<String>,
    ) -> Result<GameStarted, FlowError> {
        if usernames.len() < MIN_PLAYERS {
            return Err(DomainError::validation(format!(
                "at least {MIN_PLAYERS} players are required, got {}",
                usernames.len()
            ))
            .into());
        }

        let _guard = self.locks.acquire(code).await;

        let mut deck = role_deck(usernames.len());
        deck.shuffle(&mut rand::thread_rng());
        let players: Vec<Player> = usernames
            .iter()
            .zip(deck)
            .map(|(username, role)| Player::new(username.clone(), role))
            .collect();

        let game = Game::new(code.clone(), players);
        self.games.insert(&game).await?;

        let mut night_roles = Vec::new();
        for player in game.required_night_actors() {
            if !night_roles.contains(&player.role) {
                night_roles.push(player.role);
            }
        }
        let started = GameStarted {
            code: code.clone(),
            players: usernames,
            assignments: game
                .players
                .iter()
                .map(|p| (p.username.clone(), p.role))
                .collect(),
            phase: game.phase,
            round: game.round,
            time_left: game.time_left,
            night_roles,
        };

        tracing::info!(code = %code, players = started.players.len(), "Game started");
        Ok(started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::infrastructure::InMemoryGames;

    fn roster(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("player{i}")).collect()
    }

    #[tokio::test]
    async fn start_deals_one_role_per_player() {
        let repo = Arc::new(InMemoryGames::new());
        let code = GameCode::new("GAME");
        let use_case = StartGame::new(repo.clone(), Arc::new(GameLocks::new()));

        let started = use_case
            .execute(&code, roster(7))
            .await
            .expect("game starts");

        assert_eq!(started.assignments.len(), 7);
        assert_eq!(started.phase, Phase::Night);
        assert_eq!(started.round, 1);
        // A 7 player deal always contains the core roles.
        let roles: Vec<Role> = started.assignments.iter().map(|(_, r)| *r).collect();
        assert!(roles.contains(&Role::Killer));
        assert!(roles.contains(&Role::Doctor));
        assert!(started.night_roles.contains(&Role::Killer));

        let stored = repo.get(&code).await.expect("get").expect("present");
        assert_eq!(stored.players.len(), 7);
    }

    #[tokio::test]
    async fn undersized_lobbies_are_rejected() {
        let repo = Arc::new(InMemoryGames::new());
        let use_case = StartGame::new(repo, Arc::new(GameLocks::new()));

        let err = use_case
            .execute(&GameCode::new("GAME"), roster(3))
            .await
            .expect_err("too small");
        assert!(matches!(err, FlowError::Domain(_)));
    }

    #[tokio::test]
    async fn restarting_an_existing_code_fails() {
        let repo = Arc::new(InMemoryGames::new());
        let code = GameCode::new("GAME");
        let use_case = StartGame::new(repo, Arc::new(GameLocks::new()));

        use_case.execute(&code, roster(5)).await.expect("first");
        assert!(use_case.execute(&code, roster(5)).await.is_err());
    }
}
