//! Role catalog - static lookup of role capabilities.
//!
//! Pure lookups with no side effects. An unknown role string is a parse
//! error at the boundary; once a [`Role`] value exists every lookup is total.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Winning-condition grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Faction {
    Town,
    Mafia,
    SerialKiller,
    Sacrifice,
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Faction::Town => write!(f, "town"),
            Faction::Mafia => write!(f, "mafia"),
            Faction::SerialKiller => write!(f, "serial-killer"),
            Faction::Sacrifice => write!(f, "sacrifice"),
        }
    }
}

/// A covert night action verb.
///
/// The mutilator's two mute subtypes are distinct verbs on the wire; both
/// resolve in the same mute stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    Block,
    MuteChat,
    MuteVote,
    Kill,
    Heal,
    Investigate,
    Watch,
    Shoot,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Block => write!(f, "block"),
            ActionKind::MuteChat => write!(f, "muteChat"),
            ActionKind::MuteVote => write!(f, "muteVote"),
            ActionKind::Kill => write!(f, "kill"),
            ActionKind::Heal => write!(f, "heal"),
            ActionKind::Investigate => write!(f, "investigate"),
            ActionKind::Watch => write!(f, "watch"),
            ActionKind::Shoot => write!(f, "shoot"),
        }
    }
}

/// One-time abilities tracked per player, not per round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OneTimeAbility {
    /// Doctor healing themselves - once per game.
    SelfHeal,
    /// Mayor going public - once per game, triples the mayor's ballot.
    Reveal,
}

/// Secret role dealt to a player at game start.
///
/// Invariant: at most one living killer exists at a time. When the killer
/// dies, resolution promotes the unique living mutilator (a role replaces,
/// never duplicates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    Queen,
    Killer,
    Mutilator,
    Doctor,
    SerialKiller,
    Sacrifice,
    Policeman,
    Sheriff,
    Lookout,
    Mayor,
    Citizen,
}

impl Role {
    /// Night action verbs this role may submit. Empty for day-only roles.
    pub fn night_actions(self) -> &'static [ActionKind] {
        match self {
            Role::Queen => &[ActionKind::Block],
            Role::Killer => &[ActionKind::Kill],
            Role::Mutilator => &[ActionKind::MuteChat, ActionKind::MuteVote],
            Role::Doctor => &[ActionKind::Heal],
            Role::SerialKiller => &[ActionKind::Kill],
            Role::Policeman => &[ActionKind::Shoot],
            Role::Sheriff => &[ActionKind::Investigate],
            Role::Lookout => &[ActionKind::Watch],
            Role::Sacrifice | Role::Mayor | Role::Citizen => &[],
        }
    }

    /// The primary verb for this role, if it acts at night.
    pub fn verb(self) -> Option<ActionKind> {
        self.night_actions().first().copied()
    }

    /// Whether this role acts at night at all.
    pub fn acts_at_night(self) -> bool {
        !self.night_actions().is_empty()
    }

    pub fn faction(self) -> Faction {
        match self {
            Role::Killer | Role::Mutilator => Faction::Mafia,
            Role::SerialKiller => Faction::SerialKiller,
            Role::Sacrifice => Faction::Sacrifice,
            Role::Queen
            | Role::Doctor
            | Role::Policeman
            | Role::Sheriff
            | Role::Lookout
            | Role::Mayor
            | Role::Citizen => Faction::Town,
        }
    }

    /// First round in which this role may act. The policeman holds fire
    /// until round 2; everyone else acts from round 1.
    pub fn min_round(self) -> u32 {
        match self {
            Role::Policeman => 2,
            _ => 1,
        }
    }

    /// Whether `ability` is a one-shot for this role.
    pub fn is_one_time(self, ability: OneTimeAbility) -> bool {
        matches!(
            (self, ability),
            (Role::Doctor, OneTimeAbility::SelfHeal) | (Role::Mayor, OneTimeAbility::Reveal)
        )
    }

    /// Whether this role may target itself with its night action.
    pub fn can_self_target(self) -> bool {
        matches!(self, Role::Doctor)
    }

    /// Faction membership that reads as suspicious to the sheriff and
    /// lethal to the policeman's conscience.
    pub fn is_suspicious(self) -> bool {
        matches!(self, Role::Killer | Role::Mutilator | Role::SerialKiller)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Queen => write!(f, "queen"),
            Role::Killer => write!(f, "killer"),
            Role::Mutilator => write!(f, "mutilator"),
            Role::Doctor => write!(f, "doctor"),
            Role::SerialKiller => write!(f, "serial-killer"),
            Role::Sacrifice => write!(f, "sacrifice"),
            Role::Policeman => write!(f, "policeman"),
            Role::Sheriff => write!(f, "sheriff"),
            Role::Lookout => write!(f, "lookout"),
            Role::Mayor => write!(f, "mayor"),
            Role::Citizen => write!(f, "citizen"),
        }
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queen" => Ok(Role::Queen),
            "killer" => Ok(Role::Killer),
            "mutilator" => Ok(Role::Mutilator),
            "doctor" => Ok(Role::Doctor),
            "serial-killer" => Ok(Role::SerialKiller),
            "sacrifice" => Ok(Role::Sacrifice),
            "policeman" => Ok(Role::Policeman),
            "sheriff" => Ok(Role::Sheriff),
            "lookout" => Ok(Role::Lookout),
            "mayor" => Ok(Role::Mayor),
            "citizen" => Ok(Role::Citizen),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// Deal order for a game of `n` players.
///
/// The first entries are always present; citizens pad the deck. The caller
/// shuffles the result before assignment (RNG stays outside the domain).
pub fn role_deck(n: usize) -> Vec<Role> {
    let priority = [
        Role::Killer,
        Role::Doctor,
        Role::Queen,
        Role::Sheriff,
        Role::SerialKiller,
        Role::Mutilator,
        Role::Lookout,
        Role::Mayor,
        Role::Policeman,
        Role::Sacrifice,
    ];
    let mut deck: Vec<Role> = priority.iter().copied().take(n).collect();
    while deck.len() < n {
        deck.push(Role::Citizen);
    }
    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutilator_has_two_mute_verbs() {
        assert_eq!(
            Role::Mutilator.night_actions(),
            &[ActionKind::MuteChat, ActionKind::MuteVote]
        );
        assert_eq!(Role::Mutilator.verb(), Some(ActionKind::MuteChat));
    }

    #[test]
    fn day_roles_do_not_act_at_night() {
        for role in [Role::Mayor, Role::Citizen, Role::Sacrifice] {
            assert!(!role.acts_at_night(), "{role} should not act at night");
            assert_eq!(role.verb(), None);
        }
    }

    #[test]
    fn policeman_waits_for_round_two() {
        assert_eq!(Role::Policeman.min_round(), 2);
        assert_eq!(Role::Sheriff.min_round(), 1);
    }

    #[test]
    fn only_doctor_self_targets() {
        assert!(Role::Doctor.can_self_target());
        assert!(!Role::Queen.can_self_target());
        assert!(!Role::SerialKiller.can_self_target());
    }

    #[test]
    fn suspicious_set_matches_investigation_targets() {
        assert!(Role::Killer.is_suspicious());
        assert!(Role::Mutilator.is_suspicious());
        assert!(Role::SerialKiller.is_suspicious());
        assert!(!Role::Queen.is_suspicious());
        assert!(!Role::Sacrifice.is_suspicious());
    }

    #[test]
    fn role_serializes_kebab_case() {
        let json = serde_json::to_string(&Role::SerialKiller).expect("serialize");
        assert_eq!(json, "\"serial-killer\"");
        let back: Role = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, Role::SerialKiller);
    }

    #[test]
    fn deck_pads_with_citizens() {
        let deck = role_deck(12);
        assert_eq!(deck.len(), 12);
        assert_eq!(
            deck.iter().filter(|r| **r == Role::Citizen).count(),
            2
        );
        assert_eq!(deck.iter().filter(|r| **r == Role::Killer).count(), 1);
    }
}
