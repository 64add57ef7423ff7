//! Output formatting utilities for CLI.

#![allow(clippy::format_push_string)]

use serde::Serialize;
use skirmish::GameSummary;
use skirmish::experiment::ExperimentResults;

/// JSON-serializable game result.
#[derive(Debug, Serialize)]
pub(super) struct JsonGameResult<'a> {
    /// Random seed used.
    pub(super) seed: u64,
    /// Game summary.
    #[serde(flatten)]
    pub(super) summary: &'a GameSummary,
}

/// Format experiment results as human-readable text.
pub(super) fn format_experiment_text(results: &ExperimentResults) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Experiment '{}' (base seed: {})\n",
        results.experiment_name, results.base_seed
    ));
    output.push_str(&format!("  Games: {}\n\n", results.games));

    for matchup in &results.matchups {
        output.push_str(&format!(
            "  {} vs {}:\n",
            matchup.player_one_name, matchup.player_two_name
        ));
        for game in &matchup.games {
            let scores: Vec<String> = game
                .final_scores
                .iter()
                .map(|(player, units)| format!("P{player}={units}"))
                .collect();
            output.push_str(&format!(
                "    #{} seed {}: {} ({})\n",
                game.iteration,
                game.seed,
                scores.join(" "),
                game.summary.end_reason().unwrap_or("unfinished")
            ));
        }
    }

    output.push_str("\n  Totals:\n");
    for (name, totals) in &results.totals {
        output.push_str(&format!(
            "    {name}: {} games, {} eliminated, {} units left\n",
            totals.games, totals.eliminated, totals.units_left
        ));
    }

    output
}
