//! Night resolver - the authoritative computation turning one round's
//! submitted actions into deaths, mutes, and investigation results.
//!
//! Resolution is a fixed-priority pipeline: blocks, mutes, kills, heals,
//! serial-killer kills, policeman shots, investigations, lookout queries,
//! then death/will finalization and killer succession. Later stages read the
//! sets produced by earlier stages, so the stage order is load-bearing and
//! must not be reordered. Independent actions within one stage may resolve
//! in any order.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entities::{Game, Mute, PendingEffect, PendingEffectKind, Player};
use crate::error::DomainError;
use crate::ids::PlayerId;
use crate::phase::Phase;
use crate::role::{ActionKind, Role};

/// Sheriff's answer for one investigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Suspicious,
    NotSuspicious,
    /// The sheriff was blocked; the night yields only an ambiguous glyph.
    Unclear,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Investigation {
    pub sheriff: String,
    pub target: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookoutReport {
    pub lookout: String,
    pub target: String,
    /// Usernames of every other actor who targeted the watched player this
    /// round, whether or not their action succeeded.
    pub visitors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteNotice {
    pub kind: Mute,
    pub muted_by: String,
}

/// Will eligibility for the round's deaths.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wills {
    pub with_wills: Vec<String>,
    pub without_wills: Vec<String>,
}

/// Structured outcome of one resolution, broadcast after the night ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    /// The round whose ledger was resolved.
    pub round: u32,
    pub deaths: Vec<String>,
    pub muted: HashMap<String, MuteNotice>,
    pub wills: Wills,
    pub investigations: Vec<Investigation>,
    pub lookout_results: Vec<LookoutReport>,
}

/// Resolve `round`'s action ledger against the current roster.
///
/// On success the roster carries the deaths/mutes, the round advances by
/// exactly one, and the phase moves to [`Phase::Testaments`]. Invoking the
/// resolver for a round the game has already advanced past returns
/// `Ok(None)` without touching any state, which makes retry-after-save-
/// failure safe.
///
/// Individual malformed actions (role/verb mismatch, vanished target) are
/// marked resolved-with-failure and never abort the batch.
pub fn resolve(game: &mut Game, round: u32) -> Result<Option<ResolutionReport>, DomainError> {
    if game.round != round || game.phase != Phase::Night || game.winner.is_some() {
        return Ok(None);
    }

    // Lookups run against the pre-resolution roster; mutations land at the end.
    let roster: Vec<Player> = game.players.clone();
    let find = |id: PlayerId| roster.iter().find(|p| p.id == id);

    let actions = game
        .history_for(round)
        .map(|h| h.actions().to_vec())
        .unwrap_or_default();

    // Stage 0: consume cross-round obligations due this round.
    let mut pending_death: Vec<PlayerId> = Vec::new();
    for effect in &game.pending_effects {
        if effect.due_round != round {
            continue;
        }
        match effect.kind {
            PendingEffectKind::BrokenHeart { player_id } => {
                if find(player_id).map(|p| p.alive).unwrap_or(false) {
                    pending_death.push(player_id);
                }
            }
        }
    }
    game.pending_effects.retain(|e| e.due_round != round);

    let mut results: Vec<Option<String>> = vec![None; actions.len()];
    let mut block_set: HashSet<PlayerId> = HashSet::new();
    let mut heal_set: HashSet<PlayerId> = HashSet::new();
    let mut bloody_wills: HashSet<PlayerId> = HashSet::new();
    let mut mutes: HashMap<PlayerId, (Mute, String)> = HashMap::new();
    let mut self_heals: Vec<PlayerId> = Vec::new();
    let mut new_effects: Vec<PendingEffect> = Vec::new();
    let mut investigations: Vec<Investigation> = Vec::new();
    let mut lookout_results: Vec<LookoutReport> = Vec::new();

    // An action participates in a stage only when it is still unresolved,
    // its actor/target still exist, and the actor's role matches the stage.
    let eligible = |idx: usize, action: &crate::entities::NightAction, role: Role| -> bool {
        !actions[idx].resolved && find(action.actor_id).map(|p| p.role) == Some(role)
    };

    // Stage 1: blocks. The queen visiting the serial killer dies of the
    // encounter and leaves no will.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Block || !eligible(idx, action, Role::Queen) {
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        block_set.insert(target.id);
        if target.role == Role::SerialKiller {
            pending_death.push(action.actor_id);
            bloody_wills.insert(action.actor_id);
            results[idx] = Some("blocked serial killer".into());
        } else {
            results[idx] = Some("blocked".into());
        }
    }

    // Stage 2: mutes. A blocked mutilator's attempt fails outright; among
    // unblocked mutilators the last evaluated one wins the target.
    for (idx, action) in actions.iter().enumerate() {
        let kind = match action.action {
            ActionKind::MuteChat => Mute::Chat,
            ActionKind::MuteVote => Mute::Vote,
            _ => continue,
        };
        if !eligible(idx, action, Role::Mutilator) {
            continue;
        }
        if block_set.contains(&action.actor_id) {
            results[idx] = Some("blocked".into());
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        let muter = find(action.actor_id)
            .map(|p| p.username.clone())
            .unwrap_or_default();
        mutes.insert(target.id, (kind, muter));
        results[idx] = Some("muted".into());
    }

    // Stage 3: the ordinary killer. Cannot touch the serial killer.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Kill || !eligible(idx, action, Role::Killer) {
            continue;
        }
        if block_set.contains(&action.actor_id) {
            results[idx] = Some("blocked".into());
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        if target.role == Role::SerialKiller {
            results[idx] = Some("failed: target survived".into());
            continue;
        }
        pending_death.push(target.id);
        results[idx] = Some("killed".into());
    }

    // Stage 4: heals. The heal set cancels any pending death, no matter
    // which stage produced it. The self-heal one-shot flag is informational
    // here; the ledger enforces "once per game" at submission.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Heal || !eligible(idx, action, Role::Doctor) {
            continue;
        }
        if block_set.contains(&action.actor_id) {
            results[idx] = Some("blocked".into());
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        heal_set.insert(target.id);
        if action.target_id == action.actor_id {
            self_heals.push(action.actor_id);
        }
        results[idx] = Some("healed".into());
    }

    // Stage 5: the serial killer kills anyone, mafia included.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Kill || !eligible(idx, action, Role::SerialKiller) {
            continue;
        }
        if block_set.contains(&action.actor_id) {
            results[idx] = Some("blocked".into());
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        pending_death.push(target.id);
        results[idx] = Some("killed".into());
    }

    // Stage 6: policeman shots. Shooting an innocent schedules the broken
    // heart for the start of next round's resolution.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Shoot || !eligible(idx, action, Role::Policeman) {
            continue;
        }
        if round < Role::Policeman.min_round() {
            results[idx] = Some("failed: too early".into());
            continue;
        }
        if block_set.contains(&action.actor_id) {
            results[idx] = Some("blocked".into());
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        pending_death.push(target.id);
        if target.role.is_suspicious() {
            results[idx] = Some("shot".into());
        } else {
            new_effects.push(PendingEffect {
                due_round: round + 1,
                kind: PendingEffectKind::BrokenHeart {
                    player_id: action.actor_id,
                },
            });
            results[idx] = Some("shot an innocent".into());
        }
    }

    // Stage 7: sheriff investigations.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Investigate || !eligible(idx, action, Role::Sheriff) {
            continue;
        }
        let sheriff = find(action.actor_id)
            .map(|p| p.username.clone())
            .unwrap_or_default();
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        let verdict = if block_set.contains(&action.actor_id) {
            Verdict::Unclear
        } else if target.role.is_suspicious() {
            Verdict::Suspicious
        } else {
            Verdict::NotSuspicious
        };
        investigations.push(Investigation {
            sheriff,
            target: target.username.clone(),
            verdict,
        });
        results[idx] = Some(match verdict {
            Verdict::Suspicious => "suspicious".into(),
            Verdict::NotSuspicious => "not suspicious".into(),
            Verdict::Unclear => "?".into(),
        });
    }

    // Stage 8: lookout visitor enumeration over the full action set,
    // independent of whether the visits succeeded.
    for (idx, action) in actions.iter().enumerate() {
        if action.action != ActionKind::Watch || !eligible(idx, action, Role::Lookout) {
            continue;
        }
        if block_set.contains(&action.actor_id) {
            results[idx] = Some("blocked".into());
            continue;
        }
        let Some(target) = find(action.target_id) else {
            results[idx] = Some("failed: unknown target".into());
            continue;
        };
        let visitors: Vec<String> = actions
            .iter()
            .filter(|other| {
                other.actor_id != action.actor_id && other.target_id == action.target_id
            })
            .filter_map(|other| find(other.actor_id).map(|p| p.username.clone()))
            .collect();
        lookout_results.push(LookoutReport {
            lookout: find(action.actor_id)
                .map(|p| p.username.clone())
                .unwrap_or_default(),
            target: target.username.clone(),
            visitors,
        });
        results[idx] = Some("watched".into());
    }

    // Any leftover unresolved action is a catalog mismatch.
    for (idx, action) in actions.iter().enumerate() {
        if !action.resolved && results[idx].is_none() {
            results[idx] = Some(format!(
                "failed: {} is not a valid action for this actor",
                action.action
            ));
        }
    }

    // Death finalization: dies iff pending and not healed. Roster order
    // keeps the death list deterministic.
    let dead_ids: Vec<PlayerId> = roster
        .iter()
        .filter(|p| p.alive && pending_death.contains(&p.id) && !heal_set.contains(&p.id))
        .map(|p| p.id)
        .collect();

    let mut deaths: Vec<String> = Vec::new();
    let mut wills = Wills::default();
    for id in &dead_ids {
        let Some(player) = roster.iter().find(|p| p.id == *id) else {
            continue;
        };
        deaths.push(player.username.clone());
        let chat_muted = matches!(mutes.get(id), Some((Mute::Chat, _)));
        if bloody_wills.contains(id) || chat_muted {
            wills.without_wills.push(player.username.clone());
        } else {
            wills.with_wills.push(player.username.clone());
        }
    }

    // Apply mutations to the live roster. Mutes last one day: the previous
    // day's mutes are dropped before the new ones land.
    let mut muted_report: HashMap<String, MuteNotice> = HashMap::new();
    for player in &mut game.players {
        player.muted = Mute::None;
        if let Some((kind, muted_by)) = mutes.get(&player.id) {
            player.muted = *kind;
            muted_report.insert(
                player.username.clone(),
                MuteNotice {
                    kind: *kind,
                    muted_by: muted_by.clone(),
                },
            );
        }
        if dead_ids.contains(&player.id) {
            player.alive = false;
        }
        if self_heals.contains(&player.id) {
            player.healed_self = true;
        }
    }

    // Killer succession: the mutilator steps up when the killer falls.
    if game.living_role(Role::Killer).is_none() {
        if let Some(id) = game.living_role(Role::Mutilator).map(|p| p.id) {
            if let Some(mutilator) = game.player_mut(id) {
                mutilator.role = Role::Killer;
            }
        }
    }

    game.pending_effects.extend(new_effects);

    // Annotate the ledger in place; mark_resolved is idempotent.
    if let Some(history) = game.history_for_mut(round) {
        for (idx, result) in results.into_iter().enumerate() {
            if let Some(result) = result {
                history.night_actions[idx].mark_resolved(result);
            }
        }
        history.resolved_deaths = deaths.clone();
    }

    // One atomic transition: round advances by exactly 1, day begins.
    game.round = round + 1;
    game.vote_state.reset();
    game.accusation = None;
    game.last_elimination = None;
    game.awaiting_testaments = wills.with_wills.clone();
    game.begin_phase(Phase::Testaments);

    Ok(Some(ResolutionReport {
        round,
        deaths,
        muted: muted_report,
        wills,
        investigations,
        lookout_results,
    }))
}
