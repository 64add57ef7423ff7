//! Config validation command implementation.

use super::CliError;
use skirmish::{ExperimentConfig, GameConfig};
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or is invalid.
pub(crate) fn execute(config_path: &Path, experiment: bool) -> Result<(), CliError> {
    println!("Validating: {}", config_path.display());
    println!();

    if experiment {
        validate_experiment(config_path)
    } else {
        validate_game(config_path)
    }
}

fn validate_game(config_path: &Path) -> Result<(), CliError> {
    let config = GameConfig::load(config_path);
    print_check("YAML parses", config.is_ok());
    let config = config?;

    let valid = config.validate();
    print_check("Game settings", valid.is_ok());
    valid?;

    println!();
    println!("Summary:");
    println!("  Board:        {:?} ({} cells)", config.shape(), config.shape().cell_count());
    println!("  Max turns:    {}", config.max_turns);
    println!("  Player one:   {}", config.player_one_config.name);
    println!("  Player two:   {}", config.player_two_config.name);
    println!();
    println!("Validation successful!");

    Ok(())
}

fn validate_experiment(config_path: &Path) -> Result<(), CliError> {
    let config = ExperimentConfig::load(config_path);
    print_check("Experiment and player files load", config.is_ok());
    let config = config?;

    let enough = config.player_configs.len() >= 2;
    print_check("At least two players", enough);
    if !enough {
        return Err(CliError::new("Experiment needs at least two player configs"));
    }

    println!();
    println!("Summary:");
    println!("  Experiment:   {}", config.experiment_name);
    println!("  Iterations:   {}", config.iterations);
    let names: Vec<&str> = config.player_configs.iter().map(|p| p.name.as_str()).collect();
    println!("  Players:      {}", names.join(", "));
    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
