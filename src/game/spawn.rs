//! Spawn phase: every tile held by a single player grows by one unit.

use crate::game::{GameState, Position, SpawnRecord, Unit};

/// Spawn one unit on `cell` if exactly one player has units there.
///
/// A cell that saw combat this turn never spawns, even when the fight left a
/// single owner standing.
///
/// # Panics
///
/// Panics if `cell` is not part of the world or the current turn has no
/// record.
#[must_use]
pub fn resolve_spawn(state: &GameState, cell: Position) -> GameState {
    let Some(tile) = state.world.get(cell) else {
        panic!("spawn phase got unknown cell {cell}");
    };
    let Some(owner) = tile.controller() else {
        return state.clone();
    };
    if fought_this_turn(state, cell) {
        return state.clone();
    }

    let mut units = tile.units.clone();
    units.push(Unit::new(owner));
    tracing::debug!(turn = state.current_turn, player = owner, position = %cell, "unit spawned");

    let world = state.world.with_units(cell, units);
    let record = state.current_record().clone().with_spawn(SpawnRecord {
        position: cell,
        player_id: owner,
    });
    state.with_world_and_record(world, record)
}

fn fought_this_turn(state: &GameState, cell: Position) -> bool {
    state
        .current_record()
        .combat_log
        .iter()
        .any(|combat| combat.position == cell)
}

/// Run [`resolve_spawn`] over every cell in canonical order.
#[must_use]
pub fn resolve_spawn_phase(state: &GameState) -> GameState {
    let cells: Vec<Position> = state.world.positions().collect();
    cells
        .into_iter()
        .fold(state.clone(), |acc, cell| resolve_spawn(&acc, cell))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::game::{BoardShape, FixedDice, World, resolve_combat_phase};

    fn state(world: World) -> GameState {
        GameState::new(world, 10, PlayerConfig::named("a"), PlayerConfig::named("b"))
    }

    #[test]
    fn test_single_owner_spawns() {
        let pos = Position::new(1, 1);
        let s = state(World::new(BoardShape::square(3)).with_units(pos, vec![Unit::new(2)]));
        let next = resolve_spawn(&s, pos);

        assert_eq!(next.world.get(pos).unwrap().units, vec![Unit::new(2), Unit::new(2)]);
        let log = &next.current_record().spawn_log;
        assert_eq!(log, &vec![SpawnRecord { position: pos, player_id: 2 }]);
    }

    #[test]
    fn test_empty_and_contested_do_not_spawn() {
        let contested = Position::new(0, 0);
        let s = state(
            World::new(BoardShape::square(3)).with_units(contested, vec![Unit::new(1), Unit::new(2)]),
        );
        assert_eq!(resolve_spawn(&s, contested), s);
        assert_eq!(resolve_spawn(&s, Position::new(2, 2)), s);
    }

    #[test]
    fn test_captured_cell_does_not_spawn_same_turn() {
        let contested = Position::new(1, 1);
        let held = Position::new(0, 0);
        let mut stack = vec![Unit::new(1); 3];
        stack.extend(vec![Unit::new(2); 2]);
        let s = state(
            World::new(BoardShape::square(3))
                .with_units(contested, stack)
                .with_units(held, vec![Unit::new(2)]),
        );

        let fought = resolve_combat_phase(&s, &mut FixedDice::always(10));
        assert_eq!(fought.world.get(contested).unwrap().units, vec![Unit::new(1)]);

        let next = resolve_spawn_phase(&fought);
        assert_eq!(next.world.get(contested).unwrap().units, vec![Unit::new(1)]);
        assert_eq!(next.world.get(held).unwrap().unit_count(), 2);
        let log = &next.current_record().spawn_log;
        assert_eq!(log, &vec![SpawnRecord { position: held, player_id: 2 }]);
    }

    #[test]
    fn test_phase_spawns_everywhere_held() {
        let s = state(
            World::new(BoardShape::square(3))
                .with_units(Position::new(0, 0), vec![Unit::new(1)])
                .with_units(Position::new(2, 0), vec![Unit::new(1); 3])
                .with_units(Position::new(2, 2), vec![Unit::new(2)]),
        );
        let next = resolve_spawn_phase(&s);
        assert_eq!(next.world.units_of(1), 6);
        assert_eq!(next.world.units_of(2), 2);
        let order: Vec<_> = next.current_record().spawn_log.iter().map(|r| r.position).collect();
        assert_eq!(
            order,
            vec![Position::new(0, 0), Position::new(2, 0), Position::new(2, 2)]
        );
    }

    #[test]
    #[should_panic(expected = "unknown cell")]
    fn test_unknown_cell_panics() {
        let _ = resolve_spawn(&state(World::new(BoardShape::square(2))), Position::new(3, 3));
    }
}
