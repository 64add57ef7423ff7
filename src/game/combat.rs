//! Combat resolution.
//!
//! Every owner on a contested tile rolls one ten-sided die. A roll above
//! [`SUCCESS_THRESHOLD`] hits every other owner for as many units as the
//! roller had before the fight. Losses come off the front of each owner's
//! stack.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::map::{count, split_by_owner};
use crate::game::{CombatRecord, GameState, PlayerId, Position, Unit};

/// Faces on the combat die.
pub const DIE_SIDES: u8 = 10;

/// Rolls strictly above this succeed (60% on a d10).
pub const SUCCESS_THRESHOLD: u8 = 4;

/// Source of combat rolls.
pub trait CombatDice: Send {
    /// Roll one die, returning a value in `1..=DIE_SIDES`.
    fn roll(&mut self) -> u8;
}

/// Seeded production dice.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
}

impl SeededDice {
    /// Create dice from a seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl CombatDice for SeededDice {
    fn roll(&mut self) -> u8 {
        self.rng.gen_range(1..=DIE_SIDES)
    }
}

/// Dice that replay a fixed sequence, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct FixedDice {
    rolls: Vec<u8>,
    next: usize,
}

impl FixedDice {
    /// Replay `rolls` in order. An empty sequence always rolls the top face.
    #[must_use]
    pub fn new(rolls: Vec<u8>) -> Self {
        Self { rolls, next: 0 }
    }

    /// Dice that always show `roll`.
    #[must_use]
    pub fn always(roll: u8) -> Self {
        Self::new(vec![roll])
    }
}

impl CombatDice for FixedDice {
    fn roll(&mut self) -> u8 {
        if self.rolls.is_empty() {
            return DIE_SIDES;
        }
        let roll = self.rolls[self.next % self.rolls.len()];
        self.next = self.next.wrapping_add(1);
        roll
    }
}

/// Whether a roll hits.
#[must_use]
pub const fn is_success(roll: u8) -> bool {
    roll > SUCCESS_THRESHOLD
}

/// Outcome of a fight on one tile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombatResult {
    /// Surviving units, owners in first-appearance order.
    pub survivors: Vec<Unit>,
    /// Units lost per owner.
    pub casualties: BTreeMap<PlayerId, u32>,
}

/// Resolve a fight between the given units.
///
/// Returns `None` when there is nothing to fight over: fewer than two
/// units or a single owner.
#[must_use]
pub fn resolve_tile_combat(units: &[Unit], dice: &mut dyn CombatDice) -> Option<CombatResult> {
    if units.len() < 2 {
        return None;
    }
    let stacks = split_by_owner(units);
    if stacks.len() < 2 {
        return None;
    }

    let initial: Vec<(PlayerId, u32)> = stacks
        .iter()
        .map(|(owner, stack)| (*owner, count(stack.len())))
        .collect();
    let mut damage: BTreeMap<PlayerId, u32> = initial.iter().map(|(owner, _)| (*owner, 0)).collect();

    for &(attacker, strength) in &initial {
        if !is_success(dice.roll()) {
            continue;
        }
        for (defender, taken) in &mut damage {
            if *defender != attacker {
                *taken = taken.saturating_add(strength);
            }
        }
    }

    let mut survivors = Vec::with_capacity(units.len());
    let mut casualties = BTreeMap::new();
    for (owner, stack) in stacks {
        let lost = damage.get(&owner).copied().unwrap_or(0).min(count(stack.len()));
        let lost_usize = usize::try_from(lost).unwrap_or(stack.len());
        survivors.extend(stack.into_iter().skip(lost_usize));
        casualties.insert(owner, lost);
    }

    Some(CombatResult {
        survivors,
        casualties,
    })
}

/// Resolve combat on `cell`.
///
/// # Panics
///
/// Panics if `cell` is not part of the world or the current turn has no
/// record.
#[must_use]
pub fn resolve_combat(state: &GameState, cell: Position, dice: &mut dyn CombatDice) -> GameState {
    let Some(tile) = state.world.get(cell) else {
        panic!("combat phase got unknown cell {cell}");
    };
    let Some(result) = resolve_tile_combat(&tile.units, dice) else {
        return state.clone();
    };

    tracing::info!(
        turn = state.current_turn,
        position = %cell,
        casualties = ?result.casualties,
        survivors = result.survivors.len(),
        "combat"
    );

    let world = state.world.with_units(cell, result.survivors);
    let record = state.current_record().clone().with_combat(CombatRecord {
        position: cell,
        casualties: result.casualties,
    });
    state.with_world_and_record(world, record)
}

/// Run [`resolve_combat`] over every cell in canonical order.
#[must_use]
pub fn resolve_combat_phase(state: &GameState, dice: &mut dyn CombatDice) -> GameState {
    let cells: Vec<Position> = state.world.positions().collect();
    cells
        .into_iter()
        .fold(state.clone(), |acc, cell| resolve_combat(&acc, cell, dice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::game::{BoardShape, World};

    fn units(owners: &[PlayerId]) -> Vec<Unit> {
        owners.iter().map(|&o| Unit::new(o)).collect()
    }

    #[test]
    fn test_success_threshold() {
        assert!(!is_success(4));
        assert!(is_success(5));
        assert!(is_success(10));
    }

    #[test]
    fn test_seeded_dice_in_range_and_reproducible() {
        let mut a = SeededDice::new(42);
        let mut b = SeededDice::new(42);
        for _ in 0..200 {
            let roll = a.roll();
            assert!((1..=DIE_SIDES).contains(&roll));
            assert_eq!(roll, b.roll());
        }
    }

    #[test]
    fn test_fixed_dice_cycle() {
        let mut dice = FixedDice::new(vec![1, 9]);
        assert_eq!(dice.roll(), 1);
        assert_eq!(dice.roll(), 9);
        assert_eq!(dice.roll(), 1);
        assert_eq!(FixedDice::new(Vec::new()).roll(), DIE_SIDES);
    }

    #[test]
    fn test_equal_stacks_both_hit() {
        let result = resolve_tile_combat(&units(&[1, 1, 2, 2]), &mut FixedDice::always(10)).unwrap();
        assert!(result.survivors.is_empty());
        assert_eq!(result.casualties, BTreeMap::from([(1, 2), (2, 2)]));
    }

    #[test]
    fn test_larger_stack_survives() {
        let result = resolve_tile_combat(&units(&[1, 1, 2]), &mut FixedDice::always(10)).unwrap();
        assert_eq!(result.survivors, units(&[1]));
        assert_eq!(result.casualties, BTreeMap::from([(1, 1), (2, 1)]));
    }

    #[test]
    fn test_casualties_clamped_to_stack_size() {
        let result = resolve_tile_combat(&units(&[1, 1, 1, 2, 2]), &mut FixedDice::always(10)).unwrap();
        assert_eq!(result.survivors, units(&[1]));
        assert_eq!(result.casualties, BTreeMap::from([(1, 2), (2, 2)]));
    }

    #[test]
    fn test_all_misses() {
        let result = resolve_tile_combat(&units(&[2, 1, 2]), &mut FixedDice::always(1)).unwrap();
        // Owners in first-appearance order, each stack in list order.
        assert_eq!(result.survivors, units(&[2, 2, 1]));
        assert_eq!(result.casualties, BTreeMap::from([(1, 0), (2, 0)]));
    }

    #[test]
    fn test_one_sided_hit() {
        // Player 1 rolls first (first appearance) and hits, player 2 misses.
        let result = resolve_tile_combat(&units(&[1, 2, 2]), &mut FixedDice::new(vec![7, 2])).unwrap();
        assert_eq!(result.survivors, units(&[1, 2]));
        assert_eq!(result.casualties_total(), 1);
    }

    #[test]
    fn test_no_fight_conditions() {
        let mut dice = FixedDice::always(10);
        assert!(resolve_tile_combat(&[], &mut dice).is_none());
        assert!(resolve_tile_combat(&units(&[1]), &mut dice).is_none());
        assert!(resolve_tile_combat(&units(&[2, 2, 2]), &mut dice).is_none());
    }

    #[test]
    fn test_resolve_combat_records_and_updates() {
        let pos = Position::new(1, 1);
        let world = World::new(BoardShape::square(3)).with_units(pos, units(&[1, 1, 2, 2]));
        let state = GameState::new(world, 10, PlayerConfig::named("a"), PlayerConfig::named("b"));

        let next = resolve_combat(&state, pos, &mut FixedDice::always(10));
        assert!(next.world.get(pos).unwrap().is_empty());
        let record = next.current_record();
        assert_eq!(record.combat_log.len(), 1);
        assert_eq!(record.combat_log[0].player_1_casualties(), 2);
        assert_eq!(record.combat_log[0].player_2_casualties(), 2);
        assert_eq!(record.world, next.world);
    }

    #[test]
    fn test_phase_skips_uncontested_cells() {
        let world = World::new(BoardShape::square(3))
            .with_units(Position::new(0, 0), units(&[1, 1]))
            .with_units(Position::new(2, 2), units(&[2]));
        let state = GameState::new(world, 10, PlayerConfig::named("a"), PlayerConfig::named("b"));
        let next = resolve_combat_phase(&state, &mut FixedDice::always(10));
        assert_eq!(next, state);
    }

    impl CombatResult {
        fn casualties_total(&self) -> u32 {
            self.casualties.values().sum()
        }
    }
}
