//! Turn-end check: decide whether the game is over.

use std::collections::BTreeMap;
use std::fmt;

use crate::game::{EndCriteria, GameState, GameStatus, PlayerId};

/// Why the game did or did not end this turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEndCheck {
    /// Nobody lost and turns remain.
    Continue {
        /// Units per player.
        unit_counts: BTreeMap<PlayerId, u32>,
    },
    /// The turn limit was reached.
    TurnLimit,
    /// At least one player has no units left.
    Elimination {
        /// Players with zero units, in id order.
        eliminated: Vec<PlayerId>,
    },
}

impl TurnEndCheck {
    /// Whether this check ends the game.
    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        !matches!(self, Self::Continue { .. })
    }

    /// Short machine-readable reason.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Continue { .. } => "continue",
            Self::TurnLimit => "turn_limit",
            Self::Elimination { .. } => "elimination",
        }
    }
}

impl fmt::Display for TurnEndCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue { .. } => write!(f, "game continues"),
            Self::TurnLimit => write!(f, "turn limit reached"),
            Self::Elimination { eliminated } => {
                let ids: Vec<String> = eliminated.iter().map(ToString::to_string).collect();
                write!(f, "player(s) {} eliminated", ids.join(", "))
            }
        }
    }
}

/// Evaluate the end conditions without changing anything.
///
/// The turn limit wins over elimination when both apply.
#[must_use]
pub fn evaluate(state: &GameState) -> TurnEndCheck {
    if state.current_turn >= state.max_turns {
        return TurnEndCheck::TurnLimit;
    }

    let unit_counts = state.world.unit_counts(state.num_players);
    match state.end_criteria {
        EndCriteria::Elimination => {
            let eliminated: Vec<PlayerId> = unit_counts
                .iter()
                .filter(|&(&player, &units)| (1..=state.num_players).contains(&player) && units == 0)
                .map(|(&player, _)| player)
                .collect();
            if eliminated.is_empty() {
                TurnEndCheck::Continue { unit_counts }
            } else {
                TurnEndCheck::Elimination { eliminated }
            }
        }
    }
}

/// Run the turn-end check once for the current turn.
///
/// Sets [`GameStatus::GameOver`] when the game has ended. Never touches the
/// world or the turn logs.
#[must_use]
pub fn resolve_turn_end(state: &GameState) -> GameState {
    let check = evaluate(state);
    match &check {
        TurnEndCheck::Continue { unit_counts } => {
            tracing::info!(turn = state.current_turn, units = ?unit_counts, "turn end");
            state.clone()
        }
        TurnEndCheck::TurnLimit | TurnEndCheck::Elimination { .. } => {
            tracing::info!(
                turn = state.current_turn,
                reason = check.reason(),
                "game over: {check}"
            );
            state.with_status(GameStatus::GameOver)
        }
    }
}
