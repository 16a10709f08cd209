//! Game lifecycle use cases.

mod snapshot;
mod start_game;

pub use snapshot::SnapshotGame;
pub use start_game::{GameStarted, StartGame};
