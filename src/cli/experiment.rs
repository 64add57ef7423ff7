//! Experiment command implementation.

use super::CliError;
use super::output::format_experiment_text;
use indicatif::{ProgressBar, ProgressStyle};
use skirmish::ExperimentConfig;
use skirmish::experiment::{matchups, run_experiment};
use std::path::Path;
use std::time::Instant;

/// Execute the experiment command.
///
/// # Errors
///
/// Returns an error if the config is invalid or results cannot be written.
pub(crate) fn execute(
    config_path: &Path,
    results_dir: &Path,
    seed: Option<u64>,
    threads: Option<usize>,
    progress: bool,
) -> Result<(), CliError> {
    let config = ExperimentConfig::load(config_path)?;

    // Set thread pool size if specified
    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = seed.or(config.game.seed).unwrap_or_else(rand::random);
    let games = u64::try_from(matchups(config.player_configs.len()).len())
        .unwrap_or(u64::MAX)
        .saturating_mul(u64::from(config.iterations));

    let pb = if progress {
        let pb = ProgressBar::new(games);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
                .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();
    let results = run_experiment(&config, base_seed, |_| {
        if let Some(pb) = &pb {
            pb.inc(1);
        }
    })?;
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    let duration = start.elapsed();

    let dir = results.save(results_dir)?;

    println!();
    print!("{}", format_experiment_text(&results));
    println!();
    println!("Duration: {:.2}s", duration.as_secs_f64());
    println!("Results written to: {}", dir.display());

    Ok(())
}
