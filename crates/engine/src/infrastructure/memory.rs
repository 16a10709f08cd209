//! In-memory game storage.
//!
//! Games live for minutes and die with the process; the store is a
//! concurrent map of whole aggregates. `save` enforces the optimistic
//! version guard required by the read-modify-write contract.

use async_trait::async_trait;
use dashmap::DashMap;

use nightshade_domain::{Game, GameCode, Player};

use super::ports::{GameRepo, RepoError};

/// DashMap-backed implementation of [`GameRepo`].
#[derive(Default)]
pub struct InMemoryGames {
    games: DashMap<String, Game>,
}

impl InMemoryGames {
    pub fn new() -> Self {
        Self {
            games: DashMap::new(),
        }
    }
}

#[async_trait]
impl GameRepo for InMemoryGames {
    async fn get(&self, code: &GameCode) -> Result<Option<Game>, RepoError> {
        Ok(self.games.get(code.as_str()).map(|g| g.clone()))
    }

    async fn insert(&self, game: &Game) -> Result<(), RepoError> {
        if self.games.contains_key(game.code.as_str()) {
            return Err(RepoError::storage(
                "insert",
                format!("game {} already exists", game.code),
            ));
        }
        self.games
            .insert(game.code.as_str().to_string(), game.clone());
        Ok(())
    }

    async fn save(&self, game: &mut Game) -> Result<(), RepoError> {
        let mut entry = self
            .games
            .get_mut(game.code.as_str())
            .ok_or_else(|| RepoError::not_found("Game", &game.code))?;
        if entry.version != game.version {
            return Err(RepoError::Conflict {
                code: game.code.to_string(),
                expected: game.version,
                actual: entry.version,
            });
        }
        game.version += 1;
        *entry = game.clone();
        Ok(())
    }

    async fn get_players(&self, code: &GameCode) -> Result<Vec<Player>, RepoError> {
        let game = self
            .games
            .get(code.as_str())
            .ok_or_else(|| RepoError::not_found("Game", code))?;
        Ok(game.players.clone())
    }

    async fn list_codes(&self) -> Result<Vec<GameCode>, RepoError> {
        Ok(self
            .games
            .iter()
            .map(|entry| GameCode::new(entry.key().clone()))
            .collect())
    }

    async fn remove(&self, code: &GameCode) -> Result<(), RepoError> {
        self.games.remove(code.as_str());
        Ok(())
    }
}
