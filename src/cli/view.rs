//! View command implementation.

use super::{CliError, ViewFormat};
use skirmish::agent::PlayerView;
use skirmish::game::{PLAYER_ONE, PLAYER_TWO};
use skirmish::{GameConfig, GameState};
use std::path::Path;

/// Execute the view command.
///
/// # Errors
///
/// Returns an error if the config is invalid or the player does not exist.
pub(crate) fn execute(config_path: &Path, player: u8, format: ViewFormat) -> Result<(), CliError> {
    if player != PLAYER_ONE && player != PLAYER_TWO {
        return Err(CliError::new(format!(
            "Invalid player {player} (expected {PLAYER_ONE} or {PLAYER_TWO})"
        )));
    }

    let config = GameConfig::load(config_path)?;
    let state = GameState::from_config(&config)?;
    let view = PlayerView::new(&state, player);

    match format {
        ViewFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        ViewFormat::Yaml => print!("{}", serde_yaml::to_string(&view)?),
    }

    Ok(())
}
