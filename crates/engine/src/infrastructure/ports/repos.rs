//! Repository port traits for game storage.

use async_trait::async_trait;

use nightshade_domain::{Game, GameCode, Player};

use super::error::RepoError;

/// Storage port for the [`Game`] aggregate.
///
/// The aggregate is always read and written whole; there are no partial
/// updates. `save` performs an optimistic version check and bumps the
/// version on success, so a caller racing a concurrent writer gets
/// [`RepoError::Conflict`] instead of a lost update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GameRepo: Send + Sync {
    async fn get(&self, code: &GameCode) -> Result<Option<Game>, RepoError>;
    async fn insert(&self, game: &Game) -> Result<(), RepoError>;
    async fn save(&self, game: &mut Game) -> Result<(), RepoError>;
    async fn get_players(&self, code: &GameCode) -> Result<Vec<Player>, RepoError>;
    async fn list_codes(&self) -> Result<Vec<GameCode>, RepoError>;
    async fn remove(&self, code: &GameCode) -> Result<(), RepoError>;
}
