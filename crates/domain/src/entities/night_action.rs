//! Night actions and the per-round action ledger.

use serde::{Deserialize, Serialize};

use crate::ids::PlayerId;
use crate::role::ActionKind;

/// One submitted covert action.
///
/// `actor_id`, `target_id` and `action` are immutable after creation.
/// `resolved`/`result` are write-once: the resolver sets them exactly once
/// via [`NightAction::mark_resolved`], which is a no-op on re-marking.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NightAction {
    pub round: u32,
    pub actor_id: PlayerId,
    pub target_id: PlayerId,
    pub action: ActionKind,
    pub resolved: bool,
    pub result: Option<String>,
}

impl NightAction {
    pub fn new(round: u32, actor_id: PlayerId, target_id: PlayerId, action: ActionKind) -> Self {
        Self {
            round,
            actor_id,
            target_id,
            action,
            resolved: false,
            result: None,
        }
    }

    /// Annotate the action with its outcome. Idempotent: once resolved, the
    /// recorded result never changes and re-marking is a no-op.
    pub fn mark_resolved(&mut self, result: impl Into<String>) {
        if self.resolved {
            return;
        }
        self.resolved = true;
        self.result = Some(result.into());
    }
}

/// One round's slice of history: the action ledger plus the deaths the
/// resolver finalized. Append-only until resolution, then annotated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundHistory {
    pub round: u32,
    pub night_actions: Vec<NightAction>,
    pub resolved_deaths: Vec<String>,
}

impl RoundHistory {
    pub fn new(round: u32) -> Self {
        Self {
            round,
            night_actions: Vec::new(),
            resolved_deaths: Vec::new(),
        }
    }

    /// Actions in submission order. Order only matters for tie-break
    /// logging; resolution itself is priority-ordered, not submission-ordered.
    pub fn actions(&self) -> &[NightAction] {
        &self.night_actions
    }

    pub fn has_action_by(&self, actor_id: PlayerId) -> bool {
        self.night_actions.iter().any(|a| a.actor_id == actor_id)
    }

    pub fn push(&mut self, action: NightAction) {
        self.night_actions.push(action);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_resolved_is_write_once() {
        let mut action =
            NightAction::new(1, PlayerId::new(), PlayerId::new(), ActionKind::Kill);
        action.mark_resolved("killed");
        action.mark_resolved("overwritten");
        assert!(action.resolved);
        assert_eq!(action.result.as_deref(), Some("killed"));
    }

    #[test]
    fn ledger_tracks_actors() {
        let actor = PlayerId::new();
        let mut history = RoundHistory::new(1);
        assert!(!history.has_action_by(actor));
        history.push(NightAction::new(1, actor, PlayerId::new(), ActionKind::Block));
        assert!(history.has_action_by(actor));
        assert_eq!(history.actions().len(), 1);
    }
}
