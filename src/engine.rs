//! Turn and game drivers.
//!
//! One turn runs the phases in a fixed order: input (once), move, combat
//! and spawn (each over every cell in canonical order), then the turn-end
//! check (once). The turn counter advances after every turn, including the
//! one that ends the game.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agent::{MoveGenerator, PlayerView, agent_seed, build_agent, propose};
use crate::config::GameConfig;
use crate::error::ConfigError;
use crate::game::invariants::assert_invariants;
use crate::game::{
    CombatDice, GameState, GameStatus, PLAYER_ONE, PLAYER_TWO, PlayerId, SeededDice,
    resolve_combat_phase, resolve_input, resolve_move_phase, resolve_spawn_phase,
    resolve_turn_end,
};

/// Drives games between two move generators.
pub struct Engine {
    agents: [Box<dyn MoveGenerator>; 2],
    dice: Box<dyn CombatDice>,
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("agents", &self.agents)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Create an engine from two agents and a dice source.
    #[must_use]
    pub fn new(
        player_one: Box<dyn MoveGenerator>,
        player_two: Box<dyn MoveGenerator>,
        dice: Box<dyn CombatDice>,
    ) -> Self {
        Self {
            agents: [player_one, player_two],
            dice,
        }
    }

    /// Build the agents and dice a game config describes.
    ///
    /// Without a configured seed, one is drawn from the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if either player config is invalid.
    pub fn from_config(config: &GameConfig) -> Result<Self, ConfigError> {
        let seed = config.seed.unwrap_or_else(rand::random);
        let shape = config.shape();
        let player_one = build_agent(&config.player_one_config, shape, agent_seed(seed, PLAYER_ONE))?;
        let player_two = build_agent(&config.player_two_config, shape, agent_seed(seed, PLAYER_TWO))?;
        Ok(Self::new(player_one, player_two, Box::new(SeededDice::new(seed))))
    }

    /// Agent seated as `player`.
    #[must_use]
    pub fn agent(&self, player: PlayerId) -> Option<&dyn MoveGenerator> {
        match player {
            PLAYER_ONE => Some(self.agents[0].as_ref()),
            PLAYER_TWO => Some(self.agents[1].as_ref()),
            _ => None,
        }
    }

    /// Play one turn.
    ///
    /// Returns a clone of `state` when the game is already over.
    #[must_use]
    pub fn play_turn(&mut self, state: &GameState) -> GameState {
        if state.is_game_over() {
            return state.clone();
        }
        let state = state.ensure_turn_record();
        let turn = state.current_turn;
        tracing::info!(turn, max_turns = state.max_turns, "turn start");

        let [one, two] = &mut self.agents;
        let proposals = [
            propose(one.as_mut(), &PlayerView::new(&state, PLAYER_ONE)),
            propose(two.as_mut(), &PlayerView::new(&state, PLAYER_TWO)),
        ];

        let state = resolve_input(&state, &proposals);
        let state = resolve_move_phase(&state);
        let state = resolve_combat_phase(&state, self.dice.as_mut());
        let state = resolve_spawn_phase(&state);
        let state = resolve_turn_end(&state);
        assert_invariants(&state);

        state.with_current_turn(turn.saturating_add(1))
    }

    /// Play until the game is over.
    #[must_use]
    pub fn play(&mut self, state: GameState) -> GameState {
        self.play_with(state, |_| {})
    }

    /// Play until the game is over, calling `on_turn` after every turn.
    pub fn play_with(&mut self, state: GameState, mut on_turn: impl FnMut(&GameState)) -> GameState {
        tracing::info!(
            player_one = %state.player_one_config.name,
            player_two = %state.player_two_config.name,
            cells = state.world.len(),
            max_turns = state.max_turns,
            "game start"
        );

        let mut state = state;
        while state.status == GameStatus::InProgress {
            state = self.play_turn(&state);
            on_turn(&state);
        }

        let summary = GameSummary::from_state(&state);
        tracing::info!(
            turns = summary.turns_played,
            units = ?summary.units,
            eliminated = ?summary.eliminated,
            "game end"
        );
        state
    }
}

/// Build the engine and opening state for `config` and play it out.
///
/// # Errors
///
/// Returns an error if the config is invalid.
pub fn run_game(config: &GameConfig) -> Result<GameState, ConfigError> {
    let mut engine = Engine::from_config(config)?;
    let state = GameState::from_config(config)?;
    Ok(engine.play(state))
}

/// Outcome of a game, for reports and experiment results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Player names by id.
    pub players: BTreeMap<PlayerId, String>,
    /// Turns fully played.
    pub turns_played: u32,
    /// Turn limit.
    pub max_turns: u32,
    /// Final status.
    pub status: GameStatus,
    /// Units left per player.
    pub units: BTreeMap<PlayerId, u32>,
    /// Players with no units left.
    pub eliminated: Vec<PlayerId>,
    /// Moves executed over the whole game.
    pub moves: usize,
    /// Combats fought over the whole game.
    pub combats: usize,
    /// Units spawned over the whole game.
    pub spawns: usize,
}

impl GameSummary {
    /// Summarize `state`.
    #[must_use]
    pub fn from_state(state: &GameState) -> Self {
        let units = state.world.unit_counts(state.num_players);
        let eliminated = units
            .iter()
            .filter(|&(_, &count)| count == 0)
            .map(|(&player, _)| player)
            .collect();
        let players = [PLAYER_ONE, PLAYER_TWO]
            .into_iter()
            .filter_map(|p| state.player_config(p).map(|c| (p, c.name.clone())))
            .collect();

        Self {
            players,
            turns_played: state.turns.keys().copied().max().unwrap_or(0),
            max_turns: state.max_turns,
            status: state.status,
            units,
            eliminated,
            moves: state.turns.values().map(|t| t.move_log.len()).sum(),
            combats: state.turns.values().map(|t| t.combat_log.len()).sum(),
            spawns: state.turns.values().map(|t| t.spawn_log.len()).sum(),
        }
    }

    /// Why the game stopped, if it has.
    #[must_use]
    pub fn end_reason(&self) -> Option<&'static str> {
        if self.status != GameStatus::GameOver {
            return None;
        }
        if self.eliminated.is_empty() {
            Some("turn_limit")
        } else {
            Some("elimination")
        }
    }
}
