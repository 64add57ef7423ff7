//! Game, player and experiment configuration.
//!
//! Configuration is YAML. Every field has the default the game was designed
//! around, so an empty document is a valid 5x5, 10-turn game between two
//! idle players.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{BoardShape, EndCriteria};

/// Default side length of the square board.
pub const DEFAULT_BOARD_SIZE: u16 = 5;

/// Default turn limit.
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Default (and only supported) number of players.
pub const DEFAULT_NUM_PLAYERS: u8 = 2;

/// Turn limit used by experiments that do not set one.
pub const DEFAULT_EXPERIMENT_MAX_TURNS: u32 = 5;

const fn default_board_size() -> u16 {
    DEFAULT_BOARD_SIZE
}

const fn default_max_turns() -> u32 {
    DEFAULT_MAX_TURNS
}

const fn default_num_players() -> u8 {
    DEFAULT_NUM_PLAYERS
}

const fn default_iterations() -> u32 {
    1
}

const fn default_move_chance() -> f64 {
    0.5
}

fn default_player_name() -> String {
    "player".to_string()
}

fn default_prompts_dir() -> PathBuf {
    PathBuf::from("prompts")
}

fn default_experiment_game() -> GameConfig {
    GameConfig {
        max_turns: DEFAULT_EXPERIMENT_MAX_TURNS,
        ..GameConfig::default()
    }
}

/// Read a file, keeping its path in the error.
fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Configuration of a single game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of a square board; ignored when `board` is set.
    #[serde(default = "default_board_size")]
    pub board_size: u16,
    /// Explicit board shape.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<BoardShape>,
    /// Turn limit.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,
    /// Number of players.
    #[serde(default = "default_num_players")]
    pub num_players: u8,
    /// How the game can end besides the turn limit.
    #[serde(default)]
    pub end_criteria: EndCriteria,
    /// Seed for combat dice and seeded agents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// West-side player.
    #[serde(default)]
    pub player_one_config: PlayerConfig,
    /// East-side player.
    #[serde(default)]
    pub player_two_config: PlayerConfig,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            board_size: DEFAULT_BOARD_SIZE,
            board: None,
            max_turns: DEFAULT_MAX_TURNS,
            num_players: DEFAULT_NUM_PLAYERS,
            end_criteria: EndCriteria::default(),
            seed: None,
            player_one_config: PlayerConfig::named("player_one"),
            player_two_config: PlayerConfig::named("player_two"),
        }
    }
}

impl GameConfig {
    /// The board shape this config describes.
    #[must_use]
    pub fn shape(&self) -> BoardShape {
        self.board.unwrap_or(BoardShape::square(self.board_size))
    }

    /// Check that a game can be built from this config.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot hold two distinct starting
    /// stacks, the player count is not 2, or an agent is unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_players != DEFAULT_NUM_PLAYERS {
            return Err(ConfigError::UnsupportedPlayerCount(self.num_players));
        }
        if self.shape().starting_positions().is_none() {
            return Err(ConfigError::InvalidBoard(format!(
                "{:?} cannot hold two separate starting stacks",
                self.shape()
            )));
        }
        self.player_one_config.validate()?;
        self.player_two_config.validate()?;
        Ok(())
    }

    /// Parse and validate a YAML document.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or the config is invalid.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&read(path)?)
    }
}

/// One seat's configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Display name, also used for result file names.
    #[serde(default = "default_player_name")]
    pub name: String,
    /// Move generator driving this player.
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: default_player_name(),
            agent: AgentConfig::default(),
        }
    }
}

impl PlayerConfig {
    /// An idle player with the given name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent: AgentConfig::Idle,
        }
    }

    /// Replace the agent.
    #[must_use]
    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agent = agent;
        self
    }

    /// Check the agent settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidAgent`] if the agent cannot be built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidAgent {
            player: self.name.clone(),
            reason: reason.to_string(),
        };
        match &self.agent {
            AgentConfig::Idle | AgentConfig::Scripted { .. } => Ok(()),
            AgentConfig::Random { move_chance, .. } => {
                if (0.0..=1.0).contains(move_chance) {
                    Ok(())
                } else {
                    Err(invalid("move_chance must be between 0 and 1"))
                }
            }
            AgentConfig::Command(command) => {
                if command.program.trim().is_empty() {
                    Err(invalid("command agent needs a program"))
                } else if command.timeout_secs == Some(0) {
                    Err(invalid("timeout_secs must be positive"))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Which move generator drives a player.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AgentConfig {
    /// Never moves.
    #[default]
    Idle,
    /// Seeded random baseline.
    Random {
        /// Seed; derived from the game seed when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
        /// Chance that any given stack moves this turn.
        #[serde(default = "default_move_chance")]
        move_chance: f64,
    },
    /// Canned generator responses, one per turn.
    Scripted {
        /// Raw response text for turn 1, 2, ...
        #[serde(default)]
        responses: Vec<String>,
    },
    /// External program that turns a prompt into a move response.
    Command(CommandConfig),
}

/// Settings for an external move-generator program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program to run.
    pub program: String,
    /// Arguments passed to the program.
    #[serde(default)]
    pub args: Vec<String>,
    /// Kill the program if it has not answered after this many seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Directory prompt files are resolved against.
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: PathBuf,
    /// Prompt files composed, in order, into the message chain.
    #[serde(default)]
    pub turn_prompt_config: Vec<PromptSource>,
}

/// One prompt file and its template parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptSource {
    /// File name relative to the prompts directory.
    pub prompt_filepath: String,
    /// Values for `{name}` placeholders.
    #[serde(default)]
    pub template_params: BTreeMap<String, serde_yaml::Value>,
}

/// Shape of a player config file referenced by an experiment.
#[derive(Debug, Deserialize)]
struct PlayerConfigFile {
    #[serde(default)]
    player_configs: Vec<PlayerConfig>,
}

/// Configuration of a batch of games.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Name used for the results directory.
    pub experiment_name: String,
    /// Games per matchup.
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Extra files holding `player_configs` lists, relative to this config.
    #[serde(default)]
    pub player_config_files: Vec<PathBuf>,
    /// Competing players; every pair plays `iterations` games.
    #[serde(default)]
    pub player_configs: Vec<PlayerConfig>,
    /// Game settings shared by every match. Player seats are overwritten.
    #[serde(default = "default_experiment_game")]
    pub game: GameConfig,
}

impl ExperimentConfig {
    /// Parse an experiment document without resolving player files.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load an experiment file and the player files it references.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_yaml_str(&read(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        for file in &config.player_config_files {
            let parsed: PlayerConfigFile = serde_yaml::from_str(&read(&base.join(file))?)?;
            config.player_configs.extend(parsed.player_configs);
        }
        config.validate()?;
        Ok(config)
    }

    /// Check the shared game settings and every player.
    ///
    /// Player names key the result files and totals, so they must be unique.
    ///
    /// # Errors
    ///
    /// Returns an error if the game settings or any player are invalid, or
    /// two players share a name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.game.validate()?;
        let mut seen = BTreeSet::new();
        for player in &self.player_configs {
            player.validate()?;
            if !seen.insert(player.name.as_str()) {
                return Err(ConfigError::DuplicatePlayerName(player.name.clone()));
            }
        }
        Ok(())
    }
}
