//! Domain entities owned by the [`Game`] aggregate.

mod game;
mod night_action;
mod player;
mod vote;

pub use game::{Accusation, Game, GameResult, PendingEffect, PendingEffectKind};
pub use night_action::{NightAction, RoundHistory};
pub use player::{Mute, Player};
pub use vote::{VoteState, ABSTAIN};
