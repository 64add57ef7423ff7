//! Player identity and per-turn player bookkeeping.

use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::game::ProposedMove;

/// Unique identifier for a player. Valid ids are `1..=num_players`.
pub type PlayerId = u8;

/// The west-side player.
pub const PLAYER_ONE: PlayerId = 1;

/// The east-side player.
pub const PLAYER_TWO: PlayerId = 2;

/// The other player of a two-player game.
#[must_use]
pub const fn opponent(player: PlayerId) -> PlayerId {
    if player == PLAYER_ONE { PLAYER_TWO } else { PLAYER_ONE }
}

/// What one player submitted during one turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Configuration the player was created with.
    pub config: PlayerConfig,
    /// Raw text returned by the move generator, kept for audit.
    pub raw_model_output: Option<String>,
    /// Moves exactly as proposed.
    pub proposed_moves: Vec<ProposedMove>,
    /// Proposed moves that survived validation, with clamped unit counts.
    pub validated_moves: Vec<ProposedMove>,
}

impl PlayerState {
    /// Create a player state with no submission yet.
    #[must_use]
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Copy of this state with the turn's submission recorded.
    #[must_use]
    pub fn with_submission(
        mut self,
        raw_model_output: Option<String>,
        proposed_moves: Vec<ProposedMove>,
        validated_moves: Vec<ProposedMove>,
    ) -> Self {
        self.raw_model_output = raw_model_output;
        self.proposed_moves = proposed_moves;
        self.validated_moves = validated_moves;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;

    #[test]
    fn test_opponent() {
        assert_eq!(opponent(PLAYER_ONE), PLAYER_TWO);
        assert_eq!(opponent(PLAYER_TWO), PLAYER_ONE);
    }

    #[test]
    fn test_with_submission_keeps_config() {
        let config = PlayerConfig::named("alpha");
        let mv = ProposedMove::new(Position::new(0, 0), Position::new(1, 0), 2);
        let state = PlayerState::new(config.clone()).with_submission(
            Some("raw".to_string()),
            vec![mv],
            vec![],
        );
        assert_eq!(state.config, config);
        assert_eq!(state.raw_model_output.as_deref(), Some("raw"));
        assert_eq!(state.proposed_moves, vec![mv]);
        assert!(state.validated_moves.is_empty());
    }
}
