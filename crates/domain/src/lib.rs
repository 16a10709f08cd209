extern crate self as nightshade_domain;

pub mod entities;
pub mod error;
pub mod game_systems;
pub mod ids;
pub mod phase;
pub mod role;

// Re-export all entities (explicit list in entities/mod.rs)
pub use entities::{
    Accusation, Game, GameResult, Mute, NightAction, PendingEffect, PendingEffectKind, Player,
    RoundHistory, VoteState, ABSTAIN,
};

pub use error::DomainError;

// Re-export game system types
pub use game_systems::{
    check_win_condition, resolve, tally, Investigation, LookoutReport, MuteNotice,
    ResolutionReport, TallyOutcome, Verdict, Wills,
};

// Re-export ID types
pub use ids::{ConnectionId, GameCode, PlayerId};

pub use phase::Phase;
pub use role::{role_deck, ActionKind, Faction, OneTimeAbility, Role};
