//! The day-cycle state machine.
//!
//! One transition function drives every phase change, whether the trigger
//! was a timer expiry or an explicit completion signal (all roles acted,
//! all ballots in, all testaments delivered). Triggers that arrive for a
//! phase the game already left come out as [`AdvanceOutcome::Idle`].

use std::sync::Arc;

use nightshade_domain::{GameCode, Phase, Role};

use crate::infrastructure::ports::GameRepo;
use crate::infrastructure::GameLocks;
use crate::use_cases::night::{NightResolution, ResolveNight};
use crate::use_cases::voting::{EndVote, VoteOutcome};
use crate::use_cases::FlowError;

/// A plain phase transition, no resolution or tally attached.
#[derive(Debug, Clone)]
pub struct PhaseChange {
    pub phase: Phase,
    pub round: u32,
    pub time_left: u32,
    /// Roles that must act tonight; non-empty only when entering night.
    pub night_roles: Vec<Role>,
    /// True when this transition starts the next round's night.
    pub next_round: bool,
}

#[derive(Debug, Clone)]
pub enum AdvanceOutcome {
    /// Nothing to do: terminal phase, or the trigger raced a transition
    /// that already happened.
    Idle,
    Phase(PhaseChange),
    Night(NightResolution),
    Vote(VoteOutcome),
}

pub struct AdvancePhase {
    games: Arc<dyn GameRepo>,
    locks: Arc<GameLocks>,
    resolve_night: Arc<ResolveNight>,
    end_vote: Arc<EndVote>,
}

impl AdvancePhase {
    pub fn new(
        games: Arc<dyn GameRepo>,
        locks: Arc<GameLocks>,
        resolve_night: Arc<ResolveNight>,
        end_vote: Arc<EndVote>,
    ) -> Self {
        Self {
            games,
            locks,
            resolve_night,
            end_vote,
        }
    }

    pub async fn execute(&self, code: &GameCode) -> Result<AdvanceOutcome, FlowError> {
        let _guard = self.locks.acquire(code).await;

        let mut game = self
            .games
            .get(code)
            .await?
            .ok_or_else(|| FlowError::GameNotFound(code.to_string()))?;

        match game.phase {
            Phase::GameOver => Ok(AdvanceOutcome::Idle),
            Phase::Night => {
                let round = game.round;
                drop(game);
                Ok(self
                    .resolve_night
                    .execute_locked(code, round)
                    .await?
                    .map(AdvanceOutcome::Night)
                    .unwrap_or(AdvanceOutcome::Idle))
            }
            Phase::Voting => {
                drop(game);
                Ok(self
                    .end_vote
                    .execute_locked(code)
                    .await?
                    .map(AdvanceOutcome::Vote)
                    .unwrap_or(AdvanceOutcome::Idle))
            }
            Phase::Testaments => {
                // Timer expiry forfeits any testament still outstanding.
                game.awaiting_testaments.clear();
                game.begin_phase(Phase::Discussion);
                self.save_change(code, game).await
            }
            Phase::Discussion => {
                game.begin_phase(Phase::Accusation);
                self.save_change(code, game).await
            }
            Phase::Accusation => {
                game.begin_phase(Phase::Voting);
                self.save_change(code, game).await
            }
            Phase::Results => {
                match eliminated_owing_will(&game) {
                    Some(username) => {
                        game.awaiting_testaments = vec![username];
                        game.begin_phase(Phase::TestamentWrite);
                    }
                    None => start_next_night(&mut game),
                }
                self.save_change(code, game).await
            }
            Phase::TestamentWrite => {
                game.awaiting_testaments.clear();
                game.begin_phase(Phase::TestamentDisplay);
                self.save_change(code, game).await
            }
            Phase::TestamentDisplay => {
                start_next_night(&mut game);
                self.save_change(code, game).await
            }
        }
    }

    async fn save_change(
        &self,
        code: &GameCode,
        mut game: nightshade_domain::Game,
    ) -> Result<AdvanceOutcome, FlowError> {
        let change = PhaseChange {
            phase: game.phase,
            round: game.round,
            time_left: game.time_left,
            night_roles: if game.phase == Phase::Night {
                required_roles(&game)
            } else {
                Vec::new()
            },
            next_round: game.phase == Phase::Night,
        };
        self.games.save(&mut game).await?;
        tracing::info!(code = %code, phase = %change.phase, round = change.round, "Phase advanced");
        Ok(AdvanceOutcome::Phase(change))
    }
}

fn start_next_night(game: &mut nightshade_domain::Game) {
    game.last_elimination = None;
    game.begin_phase(Phase::Night);
}

/// The round's eliminated player still owes a testament, unless the night
/// left them chat-muted.
fn eliminated_owing_will(game: &nightshade_domain::Game) -> Option<String> {
    let username = game.last_elimination.clone()?;
    let player = game.player_by_username(&username)?;
    if player.is_chat_muted() {
        return None;
    }
    Some(username)
}

/// Distinct roles that must act tonight, in roster order.
fn required_roles(game: &nightshade_domain::Game) -> Vec<Role> {
    let mut roles = Vec::new();
    for player in game.required_night_actors() {
        if !roles.contains(&player.role) {
            roles.push(player.role);
        }
    }
    roles
}
