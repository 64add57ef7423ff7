//! Input phase: turn both players' proposals into the validated move table.
//!
//! No units move here. Requests are checked against the live world and
//! clamped so that, per source cell and player, the validated unit counts
//! never add up to more units than that player has on the cell.

use std::collections::BTreeMap;

use crate::game::{
    GameState, InputMoves, PLAYER_ONE, PLAYER_TWO, PlannedMove, PlayerId, Position, Proposal,
    ProposedMove, World,
};

/// Units each player can still commit from each source cell.
///
/// Seeded lazily from the world the first time a `(source, player)` pair is
/// seen, so it lives exactly as long as one validation pass.
#[derive(Debug, Default)]
pub struct RemainingUnits {
    remaining: BTreeMap<(Position, PlayerId), u32>,
}

impl RemainingUnits {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Units `player` can still commit from `source`, seeding from `world`.
    pub fn remaining(&mut self, world: &World, source: Position, player: PlayerId) -> u32 {
        *self
            .remaining
            .entry((source, player))
            .or_insert_with(|| world.get(source).map_or(0, |tile| tile.count_owned_by(player)))
    }

    /// Commit up to `requested` units and return how many were granted.
    ///
    /// Returns `None` when nothing can be granted.
    pub fn take(
        &mut self,
        world: &World,
        source: Position,
        player: PlayerId,
        requested: u32,
    ) -> Option<u32> {
        let available = self.remaining(world, source, player);
        if available == 0 || requested == 0 {
            return None;
        }
        let granted = requested.min(available);
        self.remaining.insert((source, player), available - granted);
        Some(granted)
    }
}

/// Validate one player's proposed moves in order.
///
/// Moves from cells outside the world are dropped. Every move from a valid
/// cell registers that cell in `table` (with empty lists for all players),
/// even if the move itself ends up skipped. Returns the validated moves
/// with their clamped unit counts.
pub fn validate_moves(
    world: &World,
    num_players: u8,
    player: PlayerId,
    proposed: &[ProposedMove],
    remaining: &mut RemainingUnits,
    table: &mut InputMoves,
) -> Vec<ProposedMove> {
    let mut validated = Vec::new();
    for mv in proposed {
        if !world.contains(mv.source) {
            tracing::debug!(player, source = %mv.source, "dropping move from unknown cell");
            continue;
        }
        table.touch(mv.source, num_players);

        let Some(granted) = remaining.take(world, mv.source, player, mv.unit_count) else {
            tracing::debug!(player, source = %mv.source, "no units left to move");
            continue;
        };
        table.push(
            mv.source,
            player,
            PlannedMove {
                destination: mv.destination,
                unit_count: granted,
            },
        );
        validated.push(ProposedMove::new(mv.source, mv.destination, granted));
    }
    validated
}

/// Run the input phase for the current turn.
///
/// `proposals` holds player one's and player two's proposals. The new
/// state's turn record carries both submissions and the move table; the
/// world is unchanged.
///
/// # Panics
///
/// Panics if the current turn has no record.
#[must_use]
pub fn resolve_input(state: &GameState, proposals: &[Proposal; 2]) -> GameState {
    let mut record = state.current_record().clone();
    let mut remaining = RemainingUnits::new();
    let mut table = InputMoves::default();

    for (player, proposal) in [PLAYER_ONE, PLAYER_TWO].into_iter().zip(proposals) {
        let validated = validate_moves(
            &state.world,
            state.num_players,
            player,
            &proposal.moves,
            &mut remaining,
            &mut table,
        );
        tracing::info!(
            turn = state.current_turn,
            player,
            proposed = proposal.moves.len(),
            validated = validated.len(),
            "moves submitted"
        );

        let submission = record.player(player).cloned().unwrap_or_default().with_submission(
            proposal.raw_output.clone(),
            proposal.moves.clone(),
            validated,
        );
        record = record.with_player(player, submission);
    }

    state.with_turn_record(record.with_input_moves(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::{BoardShape, Unit};

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn mv(from: (i32, i32), to: (i32, i32), units: u32) -> ProposedMove {
        ProposedMove::new(pos(from.0, from.1), pos(to.0, to.1), units)
    }

    fn opening() -> GameState {
        GameState::from_config(&GameConfig::default()).unwrap()
    }

    #[test]
    fn test_clamps_to_available_units() {
        let state = opening();
        let proposals = [
            Proposal::from_moves(vec![mv((0, 2), (1, 2), 5)]),
            Proposal::empty(),
        ];
        let next = resolve_input(&state, &proposals);
        let record = next.current_record();

        assert_eq!(record.input_moves.get(pos(0, 2), 1)[0].unit_count, 2);
        assert_eq!(record.player_one.validated_moves, vec![mv((0, 2), (1, 2), 2)]);
        assert_eq!(record.player_one.proposed_moves, vec![mv((0, 2), (1, 2), 5)]);
        assert_eq!(next.world, state.world);
    }

    #[test]
    fn test_second_move_gets_what_is_left() {
        let state = opening();
        let proposals = [
            Proposal::from_moves(vec![
                mv((0, 2), (1, 2), 1),
                mv((0, 2), (0, 1), 3),
                mv((0, 2), (0, 3), 1),
            ]),
            Proposal::empty(),
        ];
        let next = resolve_input(&state, &proposals);
        let planned = next.current_record().input_moves.get(pos(0, 2), 1);
        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].unit_count, 1);
        assert_eq!(planned[1].unit_count, 1);
        assert_eq!(planned[1].destination, pos(0, 1));
    }

    #[test]
    fn test_unknown_source_dropped() {
        let state = opening();
        let proposals = [
            Proposal::from_moves(vec![mv((9, 9), (1, 2), 1)]),
            Proposal::empty(),
        ];
        let next = resolve_input(&state, &proposals);
        let record = next.current_record();
        assert!(!record.input_moves.contains_source(pos(9, 9)));
        assert!(record.player_one.validated_moves.is_empty());
    }

    #[test]
    fn test_skipped_move_still_registers_source() {
        let state = opening();
        // Player one owns nothing at (2, 2).
        let proposals = [
            Proposal::from_moves(vec![mv((2, 2), (2, 3), 1)]),
            Proposal::empty(),
        ];
        let next = resolve_input(&state, &proposals);
        let table = &next.current_record().input_moves;
        assert!(table.contains_source(pos(2, 2)));
        assert!(table.get(pos(2, 2), 1).is_empty());
        assert!(table.get(pos(2, 2), 2).is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn test_zero_unit_move_skipped() {
        let state = opening();
        let proposals = [Proposal::from_moves(vec![mv((0, 2), (1, 2), 0)]), Proposal::empty()];
        let next = resolve_input(&state, &proposals);
        assert!(next.current_record().player_one.validated_moves.is_empty());
    }

    #[test]
    fn test_players_tracked_independently_on_shared_cell() {
        let world = World::new(BoardShape::square(3)).with_units(
            pos(1, 1),
            vec![Unit::new(1), Unit::new(2), Unit::new(2)],
        );
        let mut remaining = RemainingUnits::new();
        let mut table = InputMoves::default();

        let one = validate_moves(&world, 2, 1, &[mv((1, 1), (0, 1), 3)], &mut remaining, &mut table);
        let two = validate_moves(&world, 2, 2, &[mv((1, 1), (2, 1), 3)], &mut remaining, &mut table);
        assert_eq!(one[0].unit_count, 1);
        assert_eq!(two[0].unit_count, 2);
    }

    #[test]
    fn test_raw_output_recorded() {
        let state = opening();
        let proposals = [
            Proposal::empty(),
            Proposal {
                moves: vec![mv((4, 2), (3, 2), 2)],
                raw_output: Some("{\"moves\": []}".to_string()),
            },
        ];
        let next = resolve_input(&state, &proposals);
        let record = next.current_record();
        assert_eq!(record.player_two.raw_model_output.as_deref(), Some("{\"moves\": []}"));
        assert_eq!(record.player_two.config.name, "player_two");
        assert!(record.player_one.raw_model_output.is_none());
    }
}
