//! Batch runner over player-config matchups.
//!
//! Every unordered pair of player configs plays `iterations` games with the
//! experiment's shared game settings. Games are independent, so they run in
//! parallel with rayon; each game is still played sequentially.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{ExperimentConfig, GameConfig, PlayerConfig};
use crate::engine::{GameSummary, run_game};
use crate::error::ExperimentError;
use crate::game::{PLAYER_ONE, PLAYER_TWO, PlayerId};

/// Index pairs `(i, j)` with `i < j`, in lexicographic order.
#[must_use]
pub fn matchups(players: usize) -> Vec<(usize, usize)> {
    (0..players)
        .flat_map(|i| (i + 1..players).map(move |j| (i, j)))
        .collect()
}

/// Game config for one match: shared settings with the two players seated.
#[must_use]
pub fn seat_players(
    game: &GameConfig,
    player_one: &PlayerConfig,
    player_two: &PlayerConfig,
    seed: u64,
) -> GameConfig {
    GameConfig {
        player_one_config: player_one.clone(),
        player_two_config: player_two.clone(),
        seed: Some(seed),
        ..game.clone()
    }
}

/// Outcome of one experiment game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// 1-based iteration within the matchup.
    pub iteration: u32,
    /// Seed the game ran with.
    pub seed: u64,
    /// Seat one.
    pub player_one_name: String,
    /// Seat two.
    pub player_two_name: String,
    /// Final units per player.
    pub final_scores: BTreeMap<PlayerId, u32>,
    /// Full game summary.
    pub summary: GameSummary,
}

/// All games of one pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchupResult {
    /// Seat one.
    pub player_one_name: String,
    /// Seat two.
    pub player_two_name: String,
    /// Games in iteration order.
    pub games: Vec<GameResult>,
}

impl MatchupResult {
    /// File name the matchup is saved under.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}_vs_{}.yaml", self.player_one_name, self.player_two_name)
    }
}

/// Aggregate numbers for one player name across the experiment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerTotals {
    /// Games played.
    pub games: u32,
    /// Games that ended with this player eliminated.
    pub eliminated: u32,
    /// Sum of units left at the end of each game.
    pub units_left: u64,
}

/// Everything an experiment produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentResults {
    /// Name of the experiment.
    pub experiment_name: String,
    /// Base seed the per-game seeds derive from.
    pub base_seed: u64,
    /// Games played in total.
    pub games: usize,
    /// Per-pairing results in matchup order.
    pub matchups: Vec<MatchupResult>,
    /// Per-player aggregates keyed by name.
    pub totals: BTreeMap<String, PlayerTotals>,
}

impl ExperimentResults {
    fn from_matchups(experiment_name: &str, base_seed: u64, matchups: Vec<MatchupResult>) -> Self {
        let mut totals: BTreeMap<String, PlayerTotals> = BTreeMap::new();
        for game in matchups.iter().flat_map(|m| &m.games) {
            for (seat, name) in [(PLAYER_ONE, &game.player_one_name), (PLAYER_TWO, &game.player_two_name)] {
                let entry = totals.entry(name.clone()).or_default();
                entry.games += 1;
                if game.summary.eliminated.contains(&seat) {
                    entry.eliminated += 1;
                }
                entry.units_left += u64::from(game.final_scores.get(&seat).copied().unwrap_or(0));
            }
        }
        Self {
            experiment_name: experiment_name.to_string(),
            base_seed,
            games: matchups.iter().map(|m| m.games.len()).sum(),
            matchups,
            totals,
        }
    }

    /// Write `<p1>_vs_<p2>.yaml` per matchup and `summary.json` into
    /// `results_dir/<experiment_name>`, returning that directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or a file cannot be written.
    pub fn save(&self, results_dir: &Path) -> Result<PathBuf, ExperimentError> {
        let dir = results_dir.join(&self.experiment_name);
        fs::create_dir_all(&dir).map_err(|source| ExperimentError::Io {
            path: dir.clone(),
            source,
        })?;

        for matchup in &self.matchups {
            let yaml = serde_yaml::to_string(&matchup.games)?;
            write_file(&dir.join(matchup.file_name()), &yaml)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        write_file(&dir.join("summary.json"), &json)?;

        tracing::info!(dir = %dir.display(), matchups = self.matchups.len(), "experiment results saved");
        Ok(dir)
    }
}

fn write_file(path: &Path, contents: &str) -> Result<(), ExperimentError> {
    fs::write(path, contents).map_err(|source| ExperimentError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Play every matchup of `config`.
///
/// Game `k` (counting over matchups, then iterations) runs with seed
/// `base_seed + k`, so results do not depend on thread scheduling.
/// `on_game` is called from worker threads as games finish.
///
/// # Errors
///
/// Returns an error if the config is invalid or names fewer than two players.
pub fn run_experiment(
    config: &ExperimentConfig,
    base_seed: u64,
    on_game: impl Fn(&GameResult) + Sync,
) -> Result<ExperimentResults, ExperimentError> {
    config.validate()?;
    let players = &config.player_configs;
    if players.len() < 2 {
        return Err(ExperimentError::TooFewPlayers(players.len()));
    }

    let pairs = matchups(players.len());
    let jobs: Vec<(usize, u32)> = (0..pairs.len())
        .flat_map(|pair| (1..=config.iterations).map(move |iteration| (pair, iteration)))
        .collect();

    tracing::info!(
        experiment = %config.experiment_name,
        players = players.len(),
        matchups = pairs.len(),
        games = jobs.len(),
        base_seed,
        "experiment start"
    );

    let results = jobs
        .into_par_iter()
        .enumerate()
        .map(|(k, (pair, iteration))| {
            let (i, j) = pairs[pair];
            let seed = base_seed.wrapping_add(u64::try_from(k).unwrap_or(u64::MAX));
            let game = seat_players(&config.game, &players[i], &players[j], seed);
            let state = run_game(&game)?;
            let summary = GameSummary::from_state(&state);
            let result = GameResult {
                iteration,
                seed,
                player_one_name: players[i].name.clone(),
                player_two_name: players[j].name.clone(),
                final_scores: summary.units.clone(),
                summary,
            };
            tracing::debug!(
                player_one = %result.player_one_name,
                player_two = %result.player_two_name,
                iteration,
                seed,
                "experiment game done"
            );
            on_game(&result);
            Ok((pair, result))
        })
        .collect::<Result<Vec<_>, ExperimentError>>()?;

    let mut grouped: Vec<MatchupResult> = pairs
        .iter()
        .map(|&(i, j)| MatchupResult {
            player_one_name: players[i].name.clone(),
            player_two_name: players[j].name.clone(),
            games: Vec::new(),
        })
        .collect();
    for (pair, result) in results {
        grouped[pair].games.push(result);
    }

    let results = ExperimentResults::from_matchups(&config.experiment_name, base_seed, grouped);
    tracing::info!(experiment = %results.experiment_name, games = results.games, "experiment done");
    Ok(results)
}
