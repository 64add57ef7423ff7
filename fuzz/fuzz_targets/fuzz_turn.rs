#![no_main]

//! Full turn fuzzer.
//!
//! Plays a few turns from an arbitrary board with arbitrary scripted moves:
//! 1. Input validation and clamping
//! 2. Move pass
//! 3. Combat with arbitrary dice
//! 4. Spawn and turn-end checks
//!
//! Structural invariants are asserted after every turn.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skirmish::agent::ScriptedGenerator;
use skirmish::game::FixedDice;
use skirmish::game::invariants::check_invariants;
use skirmish::{
    BoardShape, Engine, GameState, PlayerConfig, Position, ProposedMove, Unit, World,
};

/// A fuzzer-generated move order.
#[derive(Arbitrary, Debug, Clone)]
struct FuzzMove {
    from_x: i8,
    from_y: i8,
    to_x: i8,
    to_y: i8,
    count: u8,
}

/// Structured input for full turn fuzzing.
#[derive(Arbitrary, Debug)]
struct TurnInput {
    /// Board side length.
    size: u8,
    /// Hexagonal instead of rectangular.
    hex: bool,
    /// Initial stacks: (x, y, second player, count).
    stacks: Vec<(i8, i8, bool, u8)>,
    /// Moves per turn for player 1.
    p1_moves: Vec<Vec<FuzzMove>>,
    /// Moves per turn for player 2.
    p2_moves: Vec<Vec<FuzzMove>>,
    /// Dice rolls, cycled.
    rolls: Vec<u8>,
    /// Number of turns to simulate.
    num_turns: u8,
}

fn to_moves(turns: Vec<Vec<FuzzMove>>) -> Vec<Vec<ProposedMove>> {
    turns
        .into_iter()
        .take(10)
        .map(|moves| {
            moves
                .into_iter()
                .take(10)
                .map(|m| {
                    ProposedMove::new(
                        Position::new(i32::from(m.from_x), i32::from(m.from_y)),
                        Position::new(i32::from(m.to_x), i32::from(m.to_y)),
                        u32::from(m.count),
                    )
                })
                .collect()
        })
        .collect()
}

fuzz_target!(|input: TurnInput| {
    // Cap values to avoid excessive runtime
    let size = u16::from(input.size % 8 + 1);
    let shape = if input.hex {
        BoardShape::Hexagonal { radius: size }
    } else {
        BoardShape::square(size)
    };
    let max_turns = u32::from(input.num_turns % 10) + 1;

    let mut world = World::new(shape);
    for (x, y, second, count) in input.stacks.into_iter().take(20) {
        let pos = Position::new(i32::from(x), i32::from(y));
        let Some(tile) = world.get(pos) else {
            continue;
        };
        let mut units = tile.units.clone();
        units.extend(vec![Unit::new(if second { 2 } else { 1 }); usize::from(count % 20)]);
        world = world.with_units(pos, units);
    }
    let total_before = world.total_units();

    let state = GameState::new(world, max_turns, PlayerConfig::named("a"), PlayerConfig::named("b"));
    let rolls: Vec<u8> = input.rolls.iter().map(|r| r % 10 + 1).take(16).collect();
    let mut engine = Engine::new(
        Box::new(ScriptedGenerator::from_moves("a", to_moves(input.p1_moves))),
        Box::new(ScriptedGenerator::from_moves("b", to_moves(input.p2_moves))),
        Box::new(FixedDice::new(rolls)),
    );

    let end = engine.play_with(state, |s| {
        let violations = check_invariants(s);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    });

    assert!(end.is_game_over());
    assert!(end.current_turn <= max_turns + 1);

    // At most one spawn per cell per turn
    let cells = u32::try_from(end.world.len()).unwrap_or(u32::MAX);
    assert!(end.world.total_units() <= total_before + cells * max_turns);
});
