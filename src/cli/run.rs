//! Run command implementation.

use super::output::JsonGameResult;
use super::{CliError, OutputFormat};
use skirmish::render::{render_state, render_summary};
use skirmish::{Engine, GameConfig, GameState, GameSummary};
use std::fs;
use std::path::{Path, PathBuf};

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the config is invalid or the state cannot be saved.
#[allow(clippy::too_many_arguments)]
pub(crate) fn execute(
    config_path: &Path,
    seed: Option<u64>,
    max_turns: Option<u32>,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
    color: bool,
) -> Result<(), CliError> {
    let mut config = GameConfig::load(config_path)?;
    if let Some(turns) = max_turns {
        config.max_turns = turns;
    }
    let seed = seed.or(config.seed).unwrap_or_else(rand::random);
    config.seed = Some(seed);

    let mut engine = Engine::from_config(&config)?;
    let state = GameState::from_config(&config)?;

    let verbose = format == OutputFormat::Text && !quiet;
    if verbose {
        println!("Running game with seed {seed}...");
        println!(
            "Players: {}, {}",
            config.player_one_config.name, config.player_two_config.name
        );
        println!();
        println!("{}", render_state(&state, color));
    }

    let end = engine.play_with(state, |s| {
        if verbose {
            println!("{}", render_state(s, color));
        }
    });

    if let Some(save_path) = save {
        let json = serde_json::to_string_pretty(&end)?;
        fs::write(&save_path, json).map_err(|e| {
            CliError::new(format!("Failed to save state to {}: {e}", save_path.display()))
        })?;
        if verbose {
            println!("State saved to: {}", save_path.display());
            println!();
        }
    }

    let summary = GameSummary::from_state(&end);
    match format {
        OutputFormat::Text => {
            print!("{}", render_summary(&summary));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonGameResult {
                seed,
                summary: &summary,
            })?;
            println!("{json}");
        }
    }

    Ok(())
}
