//! Use cases - one struct per operation, dependencies injected as ports.
//!
//! Every use case that mutates a game acquires that game's lock first and
//! read-modify-writes the whole aggregate. Use cases return plain outcome
//! structs; the api layer turns them into protocol messages and broadcasts.

pub mod game;
pub mod night;
pub mod phase;
pub mod voting;

use std::sync::Arc;

use nightshade_domain::DomainError;

use crate::infrastructure::ports::RepoError;

/// Shared failure taxonomy for the game-flow use cases.
///
/// `Domain` carries submission-time rejections that only the requesting
/// client sees; `Repo` covers storage failures that the caller retries.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("Game not found: {0}")]
    GameNotFound(String),
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

/// Container for game lifecycle use cases.
pub struct GameUseCases {
    pub start: Arc<game::StartGame>,
    pub snapshot: Arc<game::SnapshotGame>,
}

/// Container for night-phase use cases.
pub struct NightUseCases {
    pub submit: Arc<night::SubmitAction>,
    pub resolve: Arc<night::ResolveNight>,
}

/// Container for voting use cases.
pub struct VotingUseCases {
    pub cast: Arc<voting::CastVote>,
    pub end: Arc<voting::EndVote>,
}

/// Container for day-cycle and timer use cases.
pub struct PhaseUseCases {
    pub advance: Arc<phase::AdvancePhase>,
    pub testament: Arc<phase::SubmitTestament>,
    pub proceed: Arc<phase::VoteToProceed>,
    pub accuse: Arc<phase::Accuse>,
    pub reveal_mayor: Arc<phase::RevealMayor>,
    pub tick: Arc<phase::TickGames>,
}
