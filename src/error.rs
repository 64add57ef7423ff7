//! Error types.
//!
//! Only configuration and outer-surface failures are errors. Bad moves are
//! clamped or dropped by the phases, and move-generator failures degrade to
//! an empty proposal before they reach the engine.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The YAML did not match the expected shape.
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The board cannot host a game.
    #[error("invalid board: {0}")]
    InvalidBoard(String),

    /// Only two-player games are supported.
    #[error("unsupported player count {0} (exactly 2 players are supported)")]
    UnsupportedPlayerCount(u8),

    /// A player's agent settings are unusable.
    #[error("invalid agent for player {player}: {reason}")]
    InvalidAgent {
        /// Player name from the config.
        player: String,
        /// What is wrong.
        reason: String,
    },

    /// Two experiment players share a name, so their results would collide.
    #[error("duplicate player name `{0}` (every experiment player needs a unique name)")]
    DuplicatePlayerName(String),
}

/// Errors raised while composing prompts from template files.
#[derive(Debug, Error)]
pub enum PromptError {
    /// A prompt file could not be read.
    #[error("could not read prompt file {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A `{name}` placeholder had no value.
    #[error("missing template parameter `{name}` in prompt {file}")]
    MissingParameter {
        /// Placeholder name.
        name: String,
        /// Prompt file.
        file: String,
    },

    /// A `{` was never closed.
    #[error("unterminated placeholder in prompt {0}")]
    UnterminatedPlaceholder(String),

    /// The substituted prompt is not a YAML message list.
    #[error("invalid YAML in prompt {file}: {source}")]
    Yaml {
        /// Prompt file.
        file: String,
        /// Parser error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// Failures of a move generator.
///
/// These never escape the input phase: they are logged and the player
/// submits no moves for the turn.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The generator process could not be started or talked to.
    #[error("move generator I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The generator did not answer in time.
    #[error("move generator timed out after {0:?}")]
    Timeout(Duration),

    /// The generator process failed.
    #[error("move generator exited with {status}: {stderr}")]
    ExitStatus {
        /// Exit status of the child process.
        status: ExitStatus,
        /// Captured standard error.
        stderr: String,
    },

    /// The answer was not a valid move list.
    #[error("malformed move response: {0}")]
    MalformedResponse(String),

    /// The prompt could not be built.
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// The board view could not be serialized for the prompt.
    #[error("could not serialize board view: {0}")]
    View(#[from] serde_yaml::Error),
}

/// Errors raised by the experiment runner.
#[derive(Debug, Error)]
pub enum ExperimentError {
    /// Bad configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Pairwise matchups need at least two players.
    #[error("experiment needs at least two player configs, got {0}")]
    TooFewPlayers(usize),

    /// Writing results failed.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        /// File or directory that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization of results failed.
    #[error("yaml serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization of results failed.
    #[error("json serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
