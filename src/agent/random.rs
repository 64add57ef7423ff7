//! Seeded random baseline.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::agent::{MoveGenerator, PlayerView};
use crate::error::GenerateError;
use crate::game::{Position, Proposal, ProposedMove};

/// Moves a random share of each own stack to a random neighbouring cell.
#[derive(Debug, Clone)]
pub struct RandomGenerator {
    name: String,
    rng: ChaCha8Rng,
    neighbors: &'static [Position],
    move_chance: f64,
}

impl RandomGenerator {
    /// Create a generator.
    ///
    /// `move_chance` must lie in `0.0..=1.0`; config validation enforces it.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        seed: u64,
        neighbors: &'static [Position],
        move_chance: f64,
    ) -> Self {
        Self {
            name: name.into(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            neighbors,
            move_chance: move_chance.clamp(0.0, 1.0),
        }
    }
}

impl MoveGenerator for RandomGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&mut self, view: &PlayerView) -> Result<Proposal, GenerateError> {
        let mut moves = Vec::new();
        for (source, units) in view.own_stacks() {
            if !self.rng.gen_bool(self.move_chance) {
                continue;
            }
            let targets: Vec<Position> = self
                .neighbors
                .iter()
                .map(|&offset| source + offset)
                .filter(|&dest| view.cell(dest).is_some())
                .collect();
            if targets.is_empty() {
                continue;
            }
            let destination = targets[self.rng.gen_range(0..targets.len())];
            let count = self.rng.gen_range(1..=units);
            moves.push(ProposedMove::new(source, destination, count));
        }
        Ok(Proposal::from_moves(moves))
    }
}
