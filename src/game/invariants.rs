//! Game invariants - sanity checks that detect bugs.
//!
//! The phases only ever move, remove or add units on existing cells, so
//! these should NEVER trigger. If they do, a phase is broken.

use crate::game::{GameState, GameStatus};

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all game invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(state: &GameState) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut violation = |message: String| violations.push(InvariantViolation { message });

    if state.current_turn == 0 {
        violation("current turn is 0, turns are 1-indexed".to_string());
    }

    // Tile keys
    for (pos, tile) in state.world.iter() {
        if tile.position != pos {
            violation(format!("Tile stored at {pos} claims position {}", tile.position));
        }
        for unit in &tile.units {
            if unit.owner == 0 || unit.owner > state.num_players {
                violation(format!(
                    "Unit at {pos} owned by player {} outside 1..={}",
                    unit.owner, state.num_players
                ));
            }
        }
    }

    // Turn records
    for (&turn, record) in &state.turns {
        if record.turn_number != turn {
            violation(format!("Turn record under key {turn} is numbered {}", record.turn_number));
        }
        if !record.world.same_cells(&state.world) {
            violation(format!("Turn {turn} snapshot has a different cell set than the world"));
        }
    }

    // The record for the turn being played must exist until the game ends;
    // the driver bumps the counter past the last record on the final turn.
    if state.status == GameStatus::InProgress && state.turn_record(state.current_turn).is_none() {
        let previous = state.current_turn.checked_sub(1).and_then(|t| state.turn_record(t));
        if previous.is_none() {
            violation(format!("No turn record for turn {} or the one before", state.current_turn));
        }
    }

    violations
}

/// Assert all game invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(state: &GameState) {
    let violations = check_invariants(state);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("Game invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_state: &GameState) {}
