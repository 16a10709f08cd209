//! Day-phase vote tally.
//!
//! Strict majority is not required: the non-abstain candidate with the
//! strictly highest weighted count is eliminated. Any tie at the top, or
//! abstain matching or beating every candidate, eliminates nobody.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::entities::{Game, ABSTAIN};
use crate::role::Role;

/// Weight of a revealed mayor's single ballot.
const MAYOR_WEIGHT: u32 = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyOutcome {
    pub eliminated_player: Option<String>,
    /// Weighted counts per choice, abstain included.
    pub vote_counts: HashMap<String, u32>,
    pub total_votes: u32,
    pub tie: bool,
}

/// Count the current ballot box.
///
/// Weighting is applied before the tie computation. Vote-muted players are
/// rejected when they cast, so every recorded ballot counts here.
pub fn tally(game: &Game) -> TallyOutcome {
    let mut vote_counts: HashMap<String, u32> = HashMap::new();
    let mut total_votes = 0u32;

    for (voter, choice) in &game.vote_state.votes {
        let weight = match game.player_by_username(voter) {
            Some(p) if p.alive && p.role == Role::Mayor && p.revealed => MAYOR_WEIGHT,
            _ => 1,
        };
        *vote_counts.entry(choice.clone()).or_insert(0) += weight;
        total_votes += weight;
    }

    let abstain_count = vote_counts.get(ABSTAIN).copied().unwrap_or(0);
    let top = vote_counts
        .iter()
        .filter(|(choice, _)| choice.as_str() != ABSTAIN)
        .max_by_key(|(_, count)| **count);

    let eliminated_player = top.and_then(|(candidate, count)| {
        let contested = vote_counts
            .iter()
            .any(|(other, c)| other != candidate && other.as_str() != ABSTAIN && c == count);
        if contested || abstain_count >= *count {
            None
        } else {
            Some(candidate.clone())
        }
    });

    let tie = eliminated_player.is_none();
    TallyOutcome {
        eliminated_player,
        vote_counts,
        total_votes,
        tie,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Player;
    use crate::ids::GameCode;

    fn game_with(roles: &[(&str, Role)]) -> Game {
        let players = roles
            .iter()
            .map(|(name, role)| Player::new(*name, *role))
            .collect();
        Game::new(GameCode::new("TEST"), players)
    }

    fn citizens(names: &[&str]) -> Game {
        let roles: Vec<(&str, Role)> = names.iter().map(|n| (*n, Role::Citizen)).collect();
        game_with(&roles)
    }

    #[test]
    fn top_tie_eliminates_nobody() {
        let mut game = citizens(&["a", "b", "v1", "v2", "v3"]);
        game.vote_state.record("v1", "a");
        game.vote_state.record("v2", "a");
        game.vote_state.record("b", "b");
        game.vote_state.record("a", "b");
        game.vote_state.record("v3", ABSTAIN);

        let outcome = tally(&game);

        assert!(outcome.tie);
        assert_eq!(outcome.eliminated_player, None);
        assert_eq!(outcome.total_votes, 5);
        assert_eq!(outcome.vote_counts.get("a"), Some(&2));
        assert_eq!(outcome.vote_counts.get("b"), Some(&2));
        assert_eq!(outcome.vote_counts.get(ABSTAIN), Some(&1));
    }

    #[test]
    fn strict_plurality_eliminates() {
        let mut game = citizens(&["a", "b", "v1", "v2", "v3"]);
        game.vote_state.record("v1", "a");
        game.vote_state.record("v2", "a");
        game.vote_state.record("v3", "a");
        game.vote_state.record("a", "b");
        game.vote_state.record("b", ABSTAIN);

        let outcome = tally(&game);

        assert!(!outcome.tie);
        assert_eq!(outcome.eliminated_player.as_deref(), Some("a"));
        assert_eq!(outcome.total_votes, 5);
    }

    #[test]
    fn revealed_mayor_ballot_counts_as_three() {
        let mut game = game_with(&[
            ("mayor", Role::Mayor),
            ("a", Role::Citizen),
            ("b", Role::Citizen),
            ("v1", Role::Citizen),
            ("v2", Role::Citizen),
            ("v3", Role::Citizen),
        ]);
        game.player_by_username_mut("mayor").expect("mayor").revealed = true;
        game.vote_state.record("mayor", "a");
        game.vote_state.record("v1", "a");
        game.vote_state.record("v2", "b");
        game.vote_state.record("v3", "b");

        let outcome = tally(&game);

        assert_eq!(outcome.vote_counts.get("a"), Some(&4));
        assert_eq!(outcome.vote_counts.get("b"), Some(&2));
        assert_eq!(outcome.eliminated_player.as_deref(), Some("a"));
        assert!(!outcome.tie);
    }

    #[test]
    fn unrevealed_mayor_ballot_counts_once() {
        let mut game = game_with(&[("mayor", Role::Mayor), ("a", Role::Citizen)]);
        game.vote_state.record("mayor", "a");

        let outcome = tally(&game);
        assert_eq!(outcome.vote_counts.get("a"), Some(&1));
    }

    #[test]
    fn abstain_matching_the_top_candidate_blocks_elimination() {
        let mut game = citizens(&["a", "v1", "v2"]);
        game.vote_state.record("v1", "a");
        game.vote_state.record("v2", ABSTAIN);

        let outcome = tally(&game);

        assert!(outcome.tie);
        assert_eq!(outcome.eliminated_player, None);
    }

    #[test]
    fn empty_ballot_box_is_a_tie() {
        let game = citizens(&["a", "b"]);
        let outcome = tally(&game);
        assert!(outcome.tie);
        assert_eq!(outcome.eliminated_player, None);
        assert_eq!(outcome.total_votes, 0);
    }
}
