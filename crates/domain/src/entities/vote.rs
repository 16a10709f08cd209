//! Day-phase vote state, reset every round.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The ballot choice meaning "eliminate nobody".
pub const ABSTAIN: &str = "abstain";

/// Buffered votes for the current round's voting phase.
///
/// Choices are living usernames or [`ABSTAIN`]. Vote-muted players are
/// rejected at submission time and never appear here.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VoteState {
    pub votes: HashMap<String, String>,
    pub time_left: u32,
    pub started_at: Option<DateTime<Utc>>,
}

impl VoteState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the ballot box for a new round.
    pub fn reset(&mut self) {
        self.votes.clear();
        self.time_left = 0;
        self.started_at = None;
    }

    pub fn record(&mut self, voter: impl Into<String>, choice: impl Into<String>) {
        self.votes.insert(voter.into(), choice.into());
    }

    pub fn has_voted(&self, voter: &str) -> bool {
        self.votes.contains_key(voter)
    }
}
