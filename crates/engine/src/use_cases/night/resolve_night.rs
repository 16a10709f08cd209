//! Night resolution trigger.
//!
//! Fires either when every required role has acted or when the night timer
//! expires; whichever comes second is a harmless no-op because the domain
//! resolver refuses rounds the game has already advanced past.

use std::sync::Arc;

use nightshade_domain::{
    check_win_condition, game_systems::night_resolver, GameCode, GameResult, Phase,
    ResolutionReport,
};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::FlowError;

/// What the api layer broadcasts after a night resolves.
#[derive(Debug, Clone)]
pub struct NightResolution {
    pub report: ResolutionReport,
    pub phase: Phase,
    pub round: u32,
    pub time_left: u32,
    pub winner: Option<GameResult>,
}

pub struct ResolveNight {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
}

impl ResolveNight {
    pub fn new(games: Arc<dyn GameRepo>, locks: Arc<GameLocks>) -> Self {
        Self { games, locks }
    }

    pub async fn execute(
        &self,
        code: &GameCode,
        round: u32,
    ) -> Result<Option<NightResolution>, FlowError> {
        let _guard = self.locks.acquire(code).await;
        self.execute_locked(code, round).await
    }

    /// Caller already holds the game lock.
    pub(crate) async fn execute_locked(
        &self,
        code: &GameCode,
        round: u32,
    ) -> Result<Option<NightResolution>, FlowError> {
        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        let Some(report) = night_resolver::resolve(&mut game, round)? else {
            return Ok(None);
        };

        if let Some(result) = check_win_condition(&game.players) {
            game.winner = Some(result);
            game.begin_phase(Phase::GameOver);
        } else if report.wills.with_wills.is_empty() {
            // Nobody owes a testament; skip straight into the day.
            game.begin_phase(Phase::Discussion);
        }

        let resolution = NightResolution {
            report,
            phase: game.phase,
            round: game.round,
            time_left: game.time_left,
            winner: game.winner.clone(),
        };
        self.games.save(&mut game).await?;

        tracing::info!(
            code = %code,
            round,
            deaths = resolution.report.deaths.len(),
            next_phase = %resolution.phase,
            "Night resolved"
        );
        Ok(Some(resolution))
    }
}
