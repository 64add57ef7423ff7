//! Game state management.
//!
//! A [`GameState`] is a value: every phase takes one by reference and
//! returns a new one. Turn records are shared through [`Arc`] so keeping
//! every intermediate state around for audit costs one map clone per step.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::{GameConfig, PlayerConfig};
use crate::error::ConfigError;
use crate::game::{PLAYER_ONE, PLAYER_TWO, BoardShape, PlayerId, TurnRecord, Unit, World};

/// Units each player starts with.
pub const STARTING_UNITS: usize = 2;

/// Whether the game is still running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    /// Turns are still being played.
    #[default]
    InProgress,
    /// Turn limit reached or a player lost every unit.
    GameOver,
}

impl GameStatus {
    /// Lowercase name used in player views and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::GameOver => "game_over",
        }
    }
}

/// How a game can end before the turn limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EndCriteria {
    /// A player with no units left has lost.
    #[default]
    Elimination,
}

/// Complete game state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Current board.
    pub world: World,
    /// Turn being played (1-indexed).
    pub current_turn: u32,
    /// Turn limit.
    pub max_turns: u32,
    /// Number of players.
    pub num_players: u8,
    /// Running or over.
    pub status: GameStatus,
    /// Early-termination rule.
    pub end_criteria: EndCriteria,
    /// Player one's configuration.
    pub player_one_config: PlayerConfig,
    /// Player two's configuration.
    pub player_two_config: PlayerConfig,
    /// Per-turn bookkeeping keyed by turn number.
    pub turns: BTreeMap<u32, Arc<TurnRecord>>,
}

impl GameState {
    /// Create a two-player game on `world` with an empty turn-1 record.
    #[must_use]
    pub fn new(
        world: World,
        max_turns: u32,
        player_one_config: PlayerConfig,
        player_two_config: PlayerConfig,
    ) -> Self {
        let mut state = Self {
            world,
            current_turn: 1,
            max_turns,
            num_players: 2,
            status: GameStatus::InProgress,
            end_criteria: EndCriteria::Elimination,
            player_one_config,
            player_two_config,
            turns: BTreeMap::new(),
        };
        let first = state.fresh_record(1);
        state.turns.insert(1, Arc::new(first));
        state
    }

    /// Build the opening position described by `config`.
    ///
    /// Each player gets a stack of two units: player one on the west edge,
    /// player two on the east edge of the board's middle row.
    ///
    /// # Errors
    ///
    /// Returns an error if the config does not validate.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let shape = config.shape();
        let world = opening_world(shape).ok_or_else(|| {
            ConfigError::InvalidBoard(format!("{shape:?} has no starting positions"))
        })?;

        let mut state = Self::new(
            world,
            config.max_turns,
            config.player_one_config.clone(),
            config.player_two_config.clone(),
        );
        state.num_players = config.num_players;
        state.end_criteria = config.end_criteria;
        Ok(state)
    }

    /// Whether the game has ended.
    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    /// Configuration of `player`, if it is one of the two seats.
    #[must_use]
    pub fn player_config(&self, player: PlayerId) -> Option<&PlayerConfig> {
        match player {
            PLAYER_ONE => Some(&self.player_one_config),
            PLAYER_TWO => Some(&self.player_two_config),
            _ => None,
        }
    }

    /// Record for `turn`, if it exists.
    #[must_use]
    pub fn turn_record(&self, turn: u32) -> Option<&TurnRecord> {
        self.turns.get(&turn).map(Arc::as_ref)
    }

    /// Record of the turn being played.
    ///
    /// # Panics
    ///
    /// Panics if the record is missing; phases only run after
    /// [`GameState::ensure_turn_record`].
    #[must_use]
    pub fn current_record(&self) -> &TurnRecord {
        match self.turn_record(self.current_turn) {
            Some(record) => record,
            None => panic!("turn record for turn {} is missing", self.current_turn),
        }
    }

    /// Copy of this state that has a record for the current turn.
    ///
    /// A new record starts from the current world with empty submissions.
    #[must_use]
    pub fn ensure_turn_record(&self) -> Self {
        if self.turns.contains_key(&self.current_turn) {
            return self.clone();
        }
        self.with_turn_record(self.fresh_record(self.current_turn))
    }

    /// Copy of this state with a different world.
    #[must_use]
    pub fn with_world(&self, world: World) -> Self {
        Self {
            world,
            ..self.clone()
        }
    }

    /// Copy of this state with a different status.
    #[must_use]
    pub fn with_status(&self, status: GameStatus) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }

    /// Copy of this state with a different turn counter.
    #[must_use]
    pub fn with_current_turn(&self, current_turn: u32) -> Self {
        Self {
            current_turn,
            ..self.clone()
        }
    }

    /// Copy of this state with `record` stored under its turn number.
    #[must_use]
    pub fn with_turn_record(&self, record: TurnRecord) -> Self {
        let mut turns = self.turns.clone();
        turns.insert(record.turn_number, Arc::new(record));
        Self {
            turns,
            ..self.clone()
        }
    }

    /// Copy with both the world and the current turn's snapshot replaced.
    #[must_use]
    pub(crate) fn with_world_and_record(&self, world: World, record: TurnRecord) -> Self {
        let mut next = self.with_turn_record(record.with_world(world.clone()));
        next.world = world;
        next
    }

    fn fresh_record(&self, turn: u32) -> TurnRecord {
        TurnRecord::new(
            turn,
            self.world.clone(),
            self.player_one_config.clone(),
            self.player_two_config.clone(),
        )
    }
}

/// Empty world of `shape` with both starting stacks placed.
fn opening_world(shape: BoardShape) -> Option<World> {
    let (west, east) = shape.starting_positions()?;
    let mut world = World::new(shape);
    world.set_units(west, vec![Unit::new(PLAYER_ONE); STARTING_UNITS]);
    world.set_units(east, vec![Unit::new(PLAYER_TWO); STARTING_UNITS]);
    Some(world)
}
