//! Game layer for Skirmish.
//!
//! Implements the rules as pure phase functions over [`GameState`]:
//! - Board with tiles holding unit stacks
//! - Input validation of proposed moves
//! - Movement, combat and spawning, cell by cell
//! - Turn-end check (turn limit, elimination)

mod combat;
mod input;
pub mod invariants;
mod map;
mod movement;
mod player;
mod spawn;
mod state;
mod turn;
mod turn_end;

pub use combat::{
    CombatDice, CombatResult, DIE_SIDES, FixedDice, SUCCESS_THRESHOLD, SeededDice, is_success,
    resolve_combat, resolve_combat_phase, resolve_tile_combat,
};
pub use input::{RemainingUnits, resolve_input, validate_moves};
pub use map::{BoardShape, Position, Tile, Unit, World, split_by_owner};
pub use movement::{resolve_move, resolve_move_phase};
pub use player::{PLAYER_ONE, PLAYER_TWO, PlayerId, PlayerState, opponent};
pub use spawn::{resolve_spawn, resolve_spawn_phase};
pub use state::{EndCriteria, GameState, GameStatus, STARTING_UNITS};
pub use turn::{
    CombatRecord, InputMoves, InputMovesEntry, MoveRecord, PlannedMove, Proposal, ProposedMove,
    SpawnRecord, TurnRecord,
};
pub use turn_end::{TurnEndCheck, evaluate, resolve_turn_end};
