//! Day/night cycle phases and their countdown budgets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A named segment of the day/night cycle with its own timer and allowed
/// actions.
///
/// The happy path cycles `Night -> Testaments -> Discussion -> Accusation ->
/// Voting -> Results -> (TestamentWrite -> TestamentDisplay)? -> Night`.
/// `GameOver` is terminal and reachable after any resolution or tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Night,
    /// Wills of the night's victims are shown and written.
    Testaments,
    Discussion,
    Accusation,
    Voting,
    Results,
    /// The day's eliminated player writes their will.
    TestamentWrite,
    /// The eliminated player's will is shown to everyone.
    TestamentDisplay,
    GameOver,
}

impl Phase {
    /// Countdown in seconds. `None` for the terminal state.
    pub fn duration_secs(self) -> Option<u32> {
        match self {
            Phase::Night => Some(60),
            Phase::Testaments => Some(20),
            Phase::Discussion => Some(300),
            Phase::Accusation => Some(30),
            Phase::Voting => Some(60),
            Phase::Results => Some(10),
            Phase::TestamentWrite => Some(30),
            Phase::TestamentDisplay => Some(15),
            Phase::GameOver => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::GameOver)
    }

    /// Whether votes may be cast.
    pub fn accepts_votes(self) -> bool {
        matches!(self, Phase::Voting)
    }

    /// Whether night actions may be submitted.
    pub fn accepts_night_actions(self) -> bool {
        matches!(self, Phase::Night)
    }

    /// Whether testament messages may be submitted.
    pub fn accepts_testaments(self) -> bool {
        matches!(self, Phase::Testaments | Phase::TestamentWrite)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Night => write!(f, "night"),
            Phase::Testaments => write!(f, "testaments"),
            Phase::Discussion => write!(f, "discussion"),
            Phase::Accusation => write!(f, "accusation"),
            Phase::Voting => write!(f, "voting"),
            Phase::Results => write!(f, "results"),
            Phase::TestamentWrite => write!(f, "testament-write"),
            Phase::TestamentDisplay => write!(f, "testament-display"),
            Phase::GameOver => write!(f, "game-over"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_non_terminal_phase_has_a_timer() {
        for phase in [
            Phase::Night,
            Phase::Testaments,
            Phase::Discussion,
            Phase::Accusation,
            Phase::Voting,
            Phase::Results,
            Phase::TestamentWrite,
            Phase::TestamentDisplay,
        ] {
            assert!(phase.duration_secs().is_some(), "{phase} needs a timer");
        }
        assert_eq!(Phase::GameOver.duration_secs(), None);
    }

    #[test]
    fn timer_budgets_are_stable() {
        assert_eq!(Phase::Testaments.duration_secs(), Some(20));
        assert_eq!(Phase::Discussion.duration_secs(), Some(300));
        assert_eq!(Phase::Accusation.duration_secs(), Some(30));
        assert_eq!(Phase::Voting.duration_secs(), Some(60));
        assert_eq!(Phase::TestamentWrite.duration_secs(), Some(30));
    }

    #[test]
    fn phase_serializes_kebab_case() {
        let json = serde_json::to_string(&Phase::TestamentWrite).expect("serialize");
        assert_eq!(json, "\"testament-write\"");
    }
}
