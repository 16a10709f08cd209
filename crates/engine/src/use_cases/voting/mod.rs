//! Voting use cases.

mod cast_vote;
mod end_vote;

pub use cast_vote::{CastVote, VoteCast};
pub use end_vote::{EndVote, VoteOutcome};
