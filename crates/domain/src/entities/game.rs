//! Game aggregate - the single shared mutable resource.
//!
//! One `Game` exists per lobby code. All mutation flows through the night
//! resolver, the vote tally, and the phase state machine; the engine
//! serializes those per code and read-modify-writes the aggregate whole.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entities::night_action::{NightAction, RoundHistory};
use crate::entities::player::Player;
use crate::entities::vote::VoteState;
use crate::error::DomainError;
use crate::ids::{GameCode, PlayerId};
use crate::phase::Phase;
use crate::role::{ActionKind, Faction, Role};

/// A cross-round causal obligation, applied at the start of the round it is
/// keyed to and cleared once consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEffect {
    pub due_round: u32,
    pub kind: PendingEffectKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PendingEffectKind {
    /// Policeman shot an innocent and dies of a broken heart next round.
    BrokenHeart { player_id: PlayerId },
}

/// The active accusation for this round, if any. At most one at a time;
/// the accused and the accuser may speak freely for the defense window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accusation {
    pub accuser: String,
    pub accused: String,
}

/// Terminal outcome of a finished game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub winner: Faction,
    pub message: String,
    pub alive_players: Vec<String>,
}

/// Aggregate root for one running game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub code: GameCode,
    /// Monotonically increasing; advances by exactly 1 per night resolution.
    pub round: u32,
    pub phase: Phase,
    /// Authoritative countdown for the current phase, in seconds.
    pub time_left: u32,
    pub players: Vec<Player>,
    pub history: Vec<RoundHistory>,
    pub vote_state: VoteState,
    pub accusation: Option<Accusation>,
    pub pending_effects: Vec<PendingEffect>,
    /// Dead players still owed a testament this phase (drained as they submit).
    pub awaiting_testaments: Vec<String>,
    /// Alive players who voted to cut the discussion short this round.
    pub proceed_votes: HashSet<String>,
    /// Collected testaments, keyed by username. `None` means declined.
    pub wills: HashMap<String, Option<String>>,
    /// Whoever the last vote eliminated, pending their testament phases.
    pub last_elimination: Option<String>,
    pub winner: Option<GameResult>,
    /// Optimistic concurrency stamp, bumped by the repository on save.
    pub version: u64,
}

impl Game {
    /// Start a game from lobby membership with roles already dealt.
    pub fn new(code: GameCode, players: Vec<Player>) -> Self {
        let mut game = Self {
            code,
            round: 1,
            phase: Phase::Night,
            time_left: 0,
            players,
            history: vec![RoundHistory::new(1)],
            vote_state: VoteState::new(),
            accusation: None,
            pending_effects: Vec::new(),
            awaiting_testaments: Vec::new(),
            proceed_votes: HashSet::new(),
            wills: HashMap::new(),
            last_elimination: None,
            winner: None,
            version: 0,
        };
        game.time_left = Phase::Night.duration_secs().unwrap_or(0);
        game
    }

    // -------------------------------------------------------------------------
    // Roster queries
    // -------------------------------------------------------------------------

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    pub fn player_by_username(&self, username: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.username == username)
    }

    pub fn player_by_username_mut(&mut self, username: &str) -> Option<&mut Player> {
        self.players.iter_mut().find(|p| p.username == username)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.alive)
    }

    pub fn alive_usernames(&self) -> Vec<String> {
        self.alive_players().map(|p| p.username.clone()).collect()
    }

    /// The unique living holder of `role`, if any.
    pub fn living_role(&self, role: Role) -> Option<&Player> {
        self.alive_players().find(|p| p.role == role)
    }

    // -------------------------------------------------------------------------
    // Action ledger
    // -------------------------------------------------------------------------

    /// The ledger slice for `round`, if it exists.
    pub fn history_for(&self, round: u32) -> Option<&RoundHistory> {
        self.history.iter().find(|h| h.round == round)
    }

    pub fn history_for_mut(&mut self, round: u32) -> Option<&mut RoundHistory> {
        self.history.iter_mut().find(|h| h.round == round)
    }

    /// The ledger slice for the current round, created on first use.
    pub fn current_history_mut(&mut self) -> &mut RoundHistory {
        let round = self.round;
        if self.history_for(round).is_none() {
            self.history.push(RoundHistory::new(round));
        }
        // The entry exists now; position lookup cannot fail.
        let idx = self
            .history
            .iter()
            .position(|h| h.round == round)
            .unwrap_or(0);
        &mut self.history[idx]
    }

    /// Append an unresolved action to the current round's ledger.
    ///
    /// Rejects without mutating on any protocol violation: wrong phase,
    /// dead or unknown actor/target, role/verb mismatch, acting before the
    /// role's minimum round, duplicate submission, illegal self-target, or
    /// a spent one-shot self-heal.
    pub fn submit_night_action(
        &mut self,
        actor_id: PlayerId,
        target_username: &str,
        action: ActionKind,
    ) -> Result<(Role, String), DomainError> {
        if !self.phase.accepts_night_actions() {
            return Err(DomainError::action_rejected(format!(
                "night actions are not accepted during {}",
                self.phase
            )));
        }

        let actor = self
            .player(actor_id)
            .ok_or_else(|| DomainError::not_found("Player", actor_id.to_string()))?;
        if !actor.alive {
            return Err(DomainError::action_rejected("dead players cannot act"));
        }
        let role = actor.role;
        let actor_username = actor.username.clone();

        if !role.night_actions().contains(&action) {
            return Err(DomainError::action_rejected(format!(
                "role {role} cannot perform {action}"
            )));
        }
        if self.round < role.min_round() {
            return Err(DomainError::action_rejected(format!(
                "role {role} may not act before round {}",
                role.min_round()
            )));
        }

        let target = self
            .player_by_username(target_username)
            .ok_or_else(|| DomainError::not_found("Player", target_username.to_string()))?;
        if !target.alive {
            return Err(DomainError::action_rejected(
                "dead players are not valid targets",
            ));
        }
        let target_id = target.id;
        let target_username = target.username.clone();

        if target_id == actor_id {
            if !role.can_self_target() {
                return Err(DomainError::action_rejected(format!(
                    "role {role} cannot target itself"
                )));
            }
            if action == ActionKind::Heal
                && self
                    .player(actor_id)
                    .map(|p| p.healed_self)
                    .unwrap_or(false)
            {
                return Err(DomainError::action_rejected(
                    "self-heal may only be used once per game",
                ));
            }
        }

        let round = self.round;
        let ledger = self.current_history_mut();
        if ledger.has_action_by(actor_id) {
            // Duplicate submission is undefined in the protocol; we reject
            // for determinism rather than overwrite.
            return Err(DomainError::action_rejected(format!(
                "{actor_username} already acted this round"
            )));
        }
        ledger.push(NightAction::new(round, actor_id, target_id, action));

        Ok((role, target_username))
    }

    /// Living players whose role must act this round for the night to
    /// complete early (timer expiry resolves regardless).
    pub fn required_night_actors(&self) -> Vec<&Player> {
        self.alive_players()
            .filter(|p| p.role.acts_at_night() && self.round >= p.role.min_round())
            .collect()
    }

    /// Completion signal for the night phase.
    pub fn all_required_actors_acted(&self) -> bool {
        let Some(ledger) = self.history_for(self.round) else {
            return self.required_night_actors().is_empty();
        };
        self.required_night_actors()
            .iter()
            .all(|p| ledger.has_action_by(p.id))
    }

    // -------------------------------------------------------------------------
    // Phase transitions
    // -------------------------------------------------------------------------

    /// Enter `phase` with a fresh countdown.
    pub fn begin_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.time_left = phase.duration_secs().unwrap_or(0);
        match phase {
            Phase::Voting => {
                self.vote_state.time_left = self.time_left;
            }
            Phase::Discussion => {
                self.proceed_votes.clear();
            }
            Phase::Accusation => {
                self.accusation = None;
            }
            _ => {}
        }
    }

    /// All alive players have voted to cut discussion short.
    pub fn all_voted_to_proceed(&self) -> bool {
        self.alive_players()
            .all(|p| self.proceed_votes.contains(&p.username))
    }

    /// All alive, non-vote-muted players have cast a ballot.
    pub fn all_alive_voted(&self) -> bool {
        self.alive_players()
            .filter(|p| !p.is_vote_muted())
            .all(|p| self.vote_state.has_voted(&p.username))
    }

    /// Everyone owed a testament this phase has delivered (or declined).
    pub fn all_testaments_in(&self) -> bool {
        self.awaiting_testaments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_with(roles: &[(&str, Role)]) -> Game {
        let players = roles
            .iter()
            .map(|(name, role)| Player::new(*name, *role))
            .collect();
        Game::new(GameCode::new("TEST"), players)
    }

    fn id_of(game: &Game, username: &str) -> PlayerId {
        game.player_by_username(username).expect("player").id
    }

    #[test]
    fn new_game_starts_at_round_one_night() {
        let game = game_with(&[("alice", Role::Killer), ("bob", Role::Doctor)]);
        assert_eq!(game.round, 1);
        assert_eq!(game.phase, Phase::Night);
        assert_eq!(game.history.len(), 1);
    }

    #[test]
    fn submit_appends_to_ledger() {
        let mut game = game_with(&[("alice", Role::Killer), ("bob", Role::Doctor)]);
        let alice = id_of(&game, "alice");

        let (role, target) = game
            .submit_night_action(alice, "bob", ActionKind::Kill)
            .expect("submission");
        assert_eq!(role, Role::Killer);
        assert_eq!(target, "bob");
        assert!(game.history_for(1).expect("ledger").has_action_by(alice));
    }

    #[test]
    fn duplicate_submission_is_rejected() {
        let mut game = game_with(&[("alice", Role::Killer), ("bob", Role::Doctor)]);
        let alice = id_of(&game, "alice");

        game.submit_night_action(alice, "bob", ActionKind::Kill)
            .expect("first submission");
        let err = game
            .submit_night_action(alice, "bob", ActionKind::Kill)
            .expect_err("duplicate");
        assert!(matches!(err, DomainError::ActionRejected(_)));
        assert_eq!(game.history_for(1).expect("ledger").actions().len(), 1);
    }

    #[test]
    fn wrong_verb_for_role_is_rejected() {
        let mut game = game_with(&[("alice", Role::Doctor), ("bob", Role::Citizen)]);
        let alice = id_of(&game, "alice");

        let err = game
            .submit_night_action(alice, "bob", ActionKind::Kill)
            .expect_err("doctor cannot kill");
        assert!(matches!(err, DomainError::ActionRejected(_)));
    }

    #[test]
    fn policeman_cannot_shoot_in_round_one() {
        let mut game = game_with(&[("alice", Role::Policeman), ("bob", Role::Citizen)]);
        let alice = id_of(&game, "alice");

        let err = game
            .submit_night_action(alice, "bob", ActionKind::Shoot)
            .expect_err("round 1");
        assert!(matches!(err, DomainError::ActionRejected(_)));
    }

    #[test]
    fn dead_target_is_rejected() {
        let mut game = game_with(&[("alice", Role::Killer), ("bob", Role::Doctor)]);
        let alice = id_of(&game, "alice");
        game.player_by_username_mut("bob").expect("bob").alive = false;

        let err = game
            .submit_night_action(alice, "bob", ActionKind::Kill)
            .expect_err("dead target");
        assert!(matches!(err, DomainError::ActionRejected(_)));
    }

    #[test]
    fn self_target_only_for_doctor() {
        let mut game = game_with(&[("alice", Role::Queen), ("bob", Role::Doctor)]);
        let alice = id_of(&game, "alice");
        let bob = id_of(&game, "bob");

        let err = game
            .submit_night_action(alice, "alice", ActionKind::Block)
            .expect_err("queen self-block");
        assert!(matches!(err, DomainError::ActionRejected(_)));

        game.submit_night_action(bob, "bob", ActionKind::Heal)
            .expect("doctor self-heal");
    }

    #[test]
    fn spent_self_heal_is_rejected_at_submission() {
        let mut game = game_with(&[("alice", Role::Doctor), ("bob", Role::Citizen)]);
        let alice = id_of(&game, "alice");
        game.player_by_username_mut("alice")
            .expect("alice")
            .healed_self = true;

        let err = game
            .submit_night_action(alice, "alice", ActionKind::Heal)
            .expect_err("second self-heal");
        assert!(matches!(err, DomainError::ActionRejected(_)));
    }

    #[test]
    fn submissions_outside_night_are_rejected() {
        let mut game = game_with(&[("alice", Role::Killer), ("bob", Role::Doctor)]);
        let alice = id_of(&game, "alice");
        game.begin_phase(Phase::Discussion);

        let err = game
            .submit_night_action(alice, "bob", ActionKind::Kill)
            .expect_err("day submission");
        assert!(matches!(err, DomainError::ActionRejected(_)));
    }

    #[test]
    fn night_completion_tracks_required_actors() {
        let mut game = game_with(&[
            ("alice", Role::Killer),
            ("bob", Role::Doctor),
            ("carol", Role::Citizen),
            ("dave", Role::Policeman),
        ]);
        // Citizen never acts; policeman is not required in round 1.
        assert_eq!(game.required_night_actors().len(), 2);
        assert!(!game.all_required_actors_acted());

        let alice = id_of(&game, "alice");
        let bob = id_of(&game, "bob");
        game.submit_night_action(alice, "carol", ActionKind::Kill)
            .expect("kill");
        assert!(!game.all_required_actors_acted());
        game.submit_night_action(bob, "carol", ActionKind::Heal)
            .expect("heal");
        assert!(game.all_required_actors_acted());
    }

    #[test]
    fn begin_phase_resets_countdown() {
        let mut game = game_with(&[("alice", Role::Killer), ("bob", Role::Doctor)]);
        game.begin_phase(Phase::Voting);
        assert_eq!(game.time_left, 60);
        assert_eq!(game.vote_state.time_left, 60);
    }
}
