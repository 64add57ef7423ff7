//! Move phase: execute validated moves cell by cell.
//!
//! The pass threads one evolving world through every cell in canonical
//! order. A stack that arrives at a cell later in that order can be moved
//! again by the later cell's orders; that order dependence is part of the
//! rules and is pinned by tests.

use crate::game::{GameState, MoveRecord, Position, World};

/// Execute the validated moves whose source is `cell`.
///
/// Players go in id order and each player's moves in list order. A move is
/// skipped if its destination is not a cell or the source tile currently
/// holds fewer than `unit_count` units. Otherwise the first `unit_count`
/// units of the tile, whoever owns them, are appended to the destination.
///
/// # Panics
///
/// Panics if `cell` is not part of the world or the current turn has no
/// record.
#[must_use]
pub fn resolve_move(state: &GameState, cell: Position) -> GameState {
    assert!(state.world.contains(cell), "move phase got unknown cell {cell}");
    let record = state.current_record();
    let Some(orders) = record.input_moves.at(cell) else {
        return state.clone();
    };
    if orders.values().all(Vec::is_empty) {
        return state.clone();
    }

    let mut world = state.world.clone();
    let mut executed = Vec::new();
    for (&player, moves) in orders {
        for planned in moves {
            let Some(moved) = move_units(&mut world, cell, planned.destination, planned.unit_count)
            else {
                continue;
            };
            tracing::debug!(
                turn = state.current_turn,
                player,
                source = %moved.source,
                destination = %moved.destination,
                units = moved.unit_count,
                "units moved"
            );
            executed.push(MoveRecord {
                player_id: player,
                ..moved
            });
        }
    }

    let record = record.clone().with_moves(executed);
    state.with_world_and_record(world, record)
}

/// Run [`resolve_move`] over every cell in canonical order.
#[must_use]
pub fn resolve_move_phase(state: &GameState) -> GameState {
    let cells: Vec<Position> = state.world.positions().collect();
    cells
        .into_iter()
        .fold(state.clone(), |acc, cell| resolve_move(&acc, cell))
}

/// Move the first `count` units from `source` to `destination`.
///
/// Returns the (ownerless) record on success, `None` if the move was
/// skipped. `world` is unchanged when the move is skipped.
fn move_units(
    world: &mut World,
    source: Position,
    destination: Position,
    count: u32,
) -> Option<MoveRecord> {
    let dest_units = world.get(destination)?.units.clone();
    let source_units = &world.get(source)?.units;
    let count_usize = usize::try_from(count).ok()?;
    if source_units.len() < count_usize {
        return None;
    }

    let mut remaining = source_units.clone();
    let moving: Vec<_> = remaining.drain(..count_usize).collect();
    if source == destination {
        // Units leave and re-enter the same tile: they go to the back.
        remaining.extend(moving);
        world.set_units(source, remaining);
    } else {
        let mut arrived = dest_units;
        arrived.extend(moving);
        world.set_units(source, remaining);
        world.set_units(destination, arrived);
    }

    Some(MoveRecord {
        source,
        destination,
        unit_count: count,
        player_id: 0,
    })
}
