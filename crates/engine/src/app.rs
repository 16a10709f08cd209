//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::{
    clock::SystemClock,
    ports::{ClockPort, GameRepo},
    GameLocks, InMemoryGames,
};
use crate::use_cases::{self, GameUseCases, NightUseCases, PhaseUseCases, VotingUseCases};

/// Main application state.
///
/// Holds the game store and all use cases. Passed to WebSocket handlers
/// via Axum state.
pub struct App {
    pub games: Arc<dyn GameRepo>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub game: GameUseCases,
    pub night: NightUseCases,
    pub voting: VotingUseCases,
    pub phase: PhaseUseCases,
}

impl App {
    /// Create a new App with the in-process store wired up.
    pub fn new() -> Self {
        Self::with_repo(Arc::new(InMemoryGames::new()))
    }

    /// Wire every use case against the given store. The lock table is
    /// shared so all writers to one game serialize on the same mutex.
    pub fn with_repo(games: Arc<dyn GameRepo>) -> Self {
        let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());
        let locks = Arc::new(GameLocks::new());

        let resolve = Arc::new(use_cases::night::ResolveNight::new(
            games.clone(),
            locks.clone(),
        ));
        let end = Arc::new(use_cases::voting::EndVote::new(games.clone(), locks.clone()));

        let use_cases = UseCases {
            game: GameUseCases {
                start: Arc::new(use_cases::game::StartGame::new(games.clone(), locks.clone())),
                snapshot: Arc::new(use_cases::game::SnapshotGame::new(games.clone())),
            },
            night: NightUseCases {
                submit: Arc::new(use_cases::night::SubmitAction::new(
                    games.clone(),
                    locks.clone(),
                )),
                resolve: resolve.clone(),
            },
            voting: VotingUseCases {
                cast: Arc::new(use_cases::voting::CastVote::new(
                    games.clone(),
                    locks.clone(),
                    clock.clone(),
                )),
                end: end.clone(),
            },
            phase: PhaseUseCases {
                advance: Arc::new(use_cases::phase::AdvancePhase::new(
                    games.clone(),
                    locks.clone(),
                    resolve,
                    end,
                )),
                testament: Arc::new(use_cases::phase::SubmitTestament::new(
                    games.clone(),
                    locks.clone(),
                )),
                proceed: Arc::new(use_cases::phase::VoteToProceed::new(
                    games.clone(),
                    locks.clone(),
                )),
                accuse: Arc::new(use_cases::phase::Accuse::new(games.clone(), locks.clone())),
                reveal_mayor: Arc::new(use_cases::phase::RevealMayor::new(
                    games.clone(),
                    locks.clone(),
                )),
                tick: Arc::new(use_cases::phase::TickGames::new(games.clone(), locks)),
            },
        };

        Self { games, use_cases }
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}
