//! Skirmish CLI - play games, run experiments and inspect configurations.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Skirmish - a turn-based two-player grid strategy engine
#[derive(Parser, Debug)]
#[command(name = "skirmish")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Also write JSON-lines event logs into this directory
    #[arg(long, global = true, value_name = "DIR")]
    log_json: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play a single game
    Run {
        /// Game config file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Random seed (overrides the config; default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum turns (overrides the config)
        #[arg(short = 't', long)]
        max_turns: Option<u32>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Save the final game state as JSON
        #[arg(long)]
        save: Option<PathBuf>,

        /// Suppress turn-by-turn output
        #[arg(short, long)]
        quiet: bool,

        /// Disable ANSI colors in the board
        #[arg(long)]
        no_color: bool,
    },

    /// Play every pairing of an experiment's player configs
    Experiment {
        /// Experiment config file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Directory the experiment's results directory is created in
        #[arg(short, long, default_value = "results")]
        results_dir: PathBuf,

        /// Base seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Print a player's view of the opening position
    View {
        /// Game config file (YAML)
        #[arg(short, long)]
        config: PathBuf,

        /// Player whose view to print (1 or 2)
        #[arg(short, long, default_value = "1")]
        player: u8,

        /// Output format: json or yaml
        #[arg(short, long, default_value = "yaml")]
        format: cli::ViewFormat,
    },

    /// Load and validate a config file
    Validate {
        /// Config file (YAML)
        #[arg(required = true)]
        config: PathBuf,

        /// Treat the file as an experiment config
        #[arg(short, long)]
        experiment: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    let _guard = match cli::logging::init(args.log_json.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match args.command {
        Commands::Run {
            config,
            seed,
            max_turns,
            format,
            save,
            quiet,
            no_color,
        } => cli::run::execute(&config, seed, max_turns, format, save, quiet, !no_color),

        Commands::Experiment {
            config,
            results_dir,
            seed,
            threads,
            progress,
        } => cli::experiment::execute(&config, &results_dir, seed, threads, progress),

        Commands::View {
            config,
            player,
            format,
        } => cli::view::execute(&config, player, format),

        Commands::Validate { config, experiment } => cli::validate::execute(&config, experiment),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
