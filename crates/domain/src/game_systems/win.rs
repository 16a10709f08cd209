//! Win-condition detection.
//!
//! Consulted after every resolution and vote. A `None` means the game
//! continues; detection never stalls the state machine.

use crate::entities::{GameResult, Player};
use crate::role::Faction;

/// Decide whether any faction has won outright.
///
/// The sacrifice's personal victory (being voted out) is an elimination-time
/// concern and is not detected here.
pub fn check_win_condition(players: &[Player]) -> Option<GameResult> {
    let alive: Vec<&Player> = players.iter().filter(|p| p.alive).collect();
    let mafia = alive
        .iter()
        .filter(|p| p.faction() == Faction::Mafia)
        .count();
    let serial_killers = alive
        .iter()
        .filter(|p| p.faction() == Faction::SerialKiller)
        .count();
    let others = alive.len() - mafia - serial_killers;

    let alive_players: Vec<String> = alive.iter().map(|p| p.username.clone()).collect();

    if mafia == 0 && serial_killers == 0 {
        return Some(GameResult {
            winner: Faction::Town,
            message: "The town has eliminated every threat.".to_string(),
            alive_players,
        });
    }
    if mafia == 0 && serial_killers > 0 && others <= 1 {
        return Some(GameResult {
            winner: Faction::SerialKiller,
            message: "The serial killer stands alone among the bodies.".to_string(),
            alive_players,
        });
    }
    if serial_killers == 0 && mafia >= others {
        return Some(GameResult {
            winner: Faction::Mafia,
            message: "The mafia has taken over the town.".to_string(),
            alive_players,
        });
    }
    None
}
