//! Player entity - one seat at the table, alive or dead.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::role::{Faction, Role};

/// Active mute carried into the day. A player holds at most one kind at a
/// time; the night resolver overwrites, never stacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum Mute {
    #[default]
    None,
    Chat,
    Vote,
}

/// A player inside a running game.
///
/// Owned by the [`Game`](crate::entities::Game) aggregate; mutated only by
/// the night resolver and the vote tally. Never deleted, only marked dead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub role: Role,
    pub alive: bool,
    pub muted: Mute,
    /// Doctor's one-shot self-heal already spent.
    pub healed_self: bool,
    /// Mayor has gone public; their ballot counts as three.
    pub revealed: bool,
}

impl Player {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            id: PlayerId::new(),
            username: username.into(),
            role,
            alive: true,
            muted: Mute::None,
            healed_self: false,
            revealed: false,
        }
    }

    pub fn faction(&self) -> Faction {
        self.role.faction()
    }

    pub fn is_chat_muted(&self) -> bool {
        self.muted == Mute::Chat
    }

    pub fn is_vote_muted(&self) -> bool {
        self.muted == Mute::Vote
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_is_alive_and_unmuted() {
        let player = Player::new("alice", Role::Doctor);
        assert!(player.alive);
        assert_eq!(player.muted, Mute::None);
        assert!(!player.healed_self);
        assert!(!player.revealed);
        assert_eq!(player.faction(), Faction::Town);
    }
}
