#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use skirmish::Unit;
use skirmish::game::{FixedDice, resolve_tile_combat};

/// Structured input for combat fuzzing.
#[derive(Arbitrary, Debug)]
struct CombatInput {
    /// Owner of each unit on the tile, in list order.
    owners: Vec<bool>,
    /// Dice rolls, cycled.
    rolls: Vec<u8>,
}

fuzz_target!(|input: CombatInput| {
    // Cap inputs to avoid excessive runtime
    let units: Vec<Unit> = input
        .owners
        .iter()
        .take(200)
        .map(|&second| Unit::new(if second { 2 } else { 1 }))
        .collect();
    let rolls: Vec<u8> = input.rolls.iter().map(|r| r % 10 + 1).take(16).collect();
    let mut dice = FixedDice::new(rolls);

    let before = |player| units.iter().filter(|u| u.owner == player).count();
    let (one, two) = (before(1), before(2));

    let Some(result) = resolve_tile_combat(&units, &mut dice) else {
        // Nothing to fight over: fewer than two units or a single owner
        assert!(one == 0 || two == 0);
        return;
    };

    let after = |player| result.survivors.iter().filter(|u| u.owner == player).count();
    let lost = |player| {
        let n = result.casualties.get(&player).copied().unwrap_or(0);
        usize::try_from(n).unwrap_or(usize::MAX)
    };

    // Casualties are clamped and exactly account for the missing units
    assert!(lost(1) <= one && lost(2) <= two);
    assert_eq!(after(1), one - lost(1));
    assert_eq!(after(2), two - lost(2));
    assert_eq!(result.survivors.len(), units.len() - lost(1) - lost(2));
});
