// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Skirmish: a turn-based, two-player territorial strategy engine.
//!
//! Each turn both players propose moves through a [`agent::MoveGenerator`];
//! the engine then resolves the fixed phase pipeline on an immutable
//! [`GameState`] value:
//!
//! - Input: validate and clamp proposals into the turn's move table
//! - Move: execute planned moves cell by cell
//! - Combat: resolve contested cells with d10 rolls
//! - Spawn: add a unit to every singly-controlled cell
//! - Turn end: check the turn limit and eliminations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   CLI / Experiment Runner (rayon)   │
//! ├─────────────────────────────────────┤
//! │   Engine (turn + game drivers)      │
//! ├──────────────────┬──────────────────┤
//! │  Game phases     │  Agents          │
//! │  (state model)   │  (views/prompts) │
//! └──────────────────┴──────────────────┘
//! ```

pub mod agent;
pub mod config;
pub mod engine;
pub mod error;
pub mod experiment;
pub mod game;
pub mod render;

pub use config::{AgentConfig, ExperimentConfig, GameConfig, PlayerConfig};
pub use engine::{Engine, GameSummary, run_game};
pub use error::{ConfigError, ExperimentError, GenerateError, PromptError};

// Re-export key game types at crate root for convenience
pub use game::{
    BoardShape, GameState, GameStatus, PlayerId, Position, ProposedMove, Tile, TurnRecord, Unit,
    World,
};
