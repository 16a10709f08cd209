//! Authoritative state resync.

use std::sync::Arc;

use nightshade_domain::GameCode;
use nightshade_shared::GameSnapshot;

use crate::infrastructure::ports::GameRepo;
use crate::use_cases::FlowError;

pub struct SnapshotGame {
    games: Arc<dyn GameRepo>,
}

impl SnapshotGame {
    pub fn new(games: Arc<dyn GameRepo>) -> Self {
        Self { games }
    }

    /// Read-only; reconnecting clients rebuild from this instead of
    /// replaying a partial event stream.
    pub async fn execute(&self, code: &GameCode) -> Result<GameSnapshot, FlowError> {
        let game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;
        Ok(GameSnapshot::from_game(&game))
    }
}
