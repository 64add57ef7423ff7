//! Move generation.
//!
//! A [`MoveGenerator`] looks at a [`PlayerView`] and proposes moves. The
//! engine calls [`propose`], which never fails: a generator error is
//! logged and the player simply submits nothing that turn.

mod command;
pub mod prompt;
mod random;
mod response;
mod scripted;
mod view;

pub use command::{CommandGenerator, CommandRequest};
pub use prompt::{Message, PromptComposer};
pub use random::RandomGenerator;
pub use response::{MoveResponse, format_moves, parse_moves};
pub use scripted::{ScriptStep, ScriptedGenerator};
pub use view::{
    BoardView, CellUnits, CellView, Controller, ControlledTerritories, Coordinate, GameInfo,
    PlayerView, cell_key,
};

use crate::config::{AgentConfig, PlayerConfig};
use crate::error::{ConfigError, GenerateError};
use crate::game::{BoardShape, PlayerId, Proposal};

/// Something that can choose moves for a player.
pub trait MoveGenerator: Send + std::fmt::Debug {
    /// Display name.
    fn name(&self) -> &str;

    /// Propose moves for the player the view belongs to.
    ///
    /// # Errors
    ///
    /// Returns an error if no proposal could be produced.
    fn generate(&mut self, view: &PlayerView) -> Result<Proposal, GenerateError>;
}

/// Never moves.
#[derive(Debug, Clone, Default)]
pub struct IdleGenerator {
    name: String,
}

impl IdleGenerator {
    /// Create an idle generator.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MoveGenerator for IdleGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    fn generate(&mut self, _view: &PlayerView) -> Result<Proposal, GenerateError> {
        Ok(Proposal::empty())
    }
}

/// Ask `agent` for moves, turning any failure into an empty proposal.
pub fn propose(agent: &mut dyn MoveGenerator, view: &PlayerView) -> Proposal {
    match agent.generate(view) {
        Ok(proposal) => proposal,
        Err(e) => {
            tracing::error!(
                agent = agent.name(),
                player = view.player,
                turn = view.game_info.current_turn,
                error = %e,
                "move generation failed, submitting no moves"
            );
            Proposal::empty()
        }
    }
}

/// Seed for a player's agent derived from the game seed.
#[must_use]
pub fn agent_seed(game_seed: u64, player: PlayerId) -> u64 {
    game_seed
        .wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(u64::from(player))
}

/// Build the move generator a player config describes.
///
/// `seed` is used by seeded agents that do not set their own.
///
/// # Errors
///
/// Returns an error if the player config is invalid.
pub fn build_agent(
    config: &PlayerConfig,
    shape: BoardShape,
    seed: u64,
) -> Result<Box<dyn MoveGenerator>, ConfigError> {
    config.validate()?;
    let name = config.name.clone();
    Ok(match &config.agent {
        AgentConfig::Idle => Box::new(IdleGenerator::new(name)),
        AgentConfig::Random {
            seed: own_seed,
            move_chance,
        } => Box::new(RandomGenerator::new(
            name,
            own_seed.unwrap_or(seed),
            shape.neighbor_offsets(),
            *move_chance,
        )),
        AgentConfig::Scripted { responses } => {
            Box::new(ScriptedGenerator::from_responses(name, responses.clone()))
        }
        AgentConfig::Command(command) => Box::new(CommandGenerator::new(name, command)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::GameState;

    fn view() -> PlayerView {
        PlayerView::new(&GameState::from_config(&GameConfig::default()).unwrap(), 1)
    }

    #[test]
    fn test_propose_swallows_errors() {
        let mut agent = ScriptedGenerator::new("s", [ScriptStep::Fail]);
        assert_eq!(propose(&mut agent, &view()), Proposal::empty());
    }

    #[test]
    fn test_idle_never_moves() {
        let mut agent = IdleGenerator::new("idle");
        assert_eq!(agent.name(), "idle");
        assert!(propose(&mut agent, &view()).moves.is_empty());
    }

    #[test]
    fn test_build_agent_kinds() {
        let shape = BoardShape::square(5);
        let idle = build_agent(&PlayerConfig::named("a"), shape, 1).unwrap();
        assert_eq!(idle.name(), "a");

        let random = PlayerConfig::named("r").with_agent(AgentConfig::Random {
            seed: None,
            move_chance: 1.0,
        });
        let mut agent = build_agent(&random, shape, 3).unwrap();
        assert_eq!(propose(agent.as_mut(), &view()).moves.len(), 1);

        let scripted = PlayerConfig::named("s").with_agent(AgentConfig::Scripted {
            responses: vec!["{\"moves\": []}".to_string()],
        });
        let mut agent = build_agent(&scripted, shape, 3).unwrap();
        let proposal = propose(agent.as_mut(), &view());
        assert_eq!(proposal.raw_output.as_deref(), Some("{\"moves\": []}"));
    }

    #[test]
    fn test_build_agent_rejects_invalid() {
        let bad = PlayerConfig::named("r").with_agent(AgentConfig::Random {
            seed: None,
            move_chance: -1.0,
        });
        assert!(build_agent(&bad, BoardShape::square(5), 0).is_err());
    }

    #[test]
    fn test_agent_seeds_differ_per_player() {
        assert_ne!(agent_seed(42, 1), agent_seed(42, 2));
        assert_eq!(agent_seed(42, 1), agent_seed(42, 1));
    }
}
