//! Text reports: per-turn logs, game state and final summary.

#![allow(clippy::format_push_string)]

use crate::engine::GameSummary;
use crate::game::{GameState, TurnRecord};
use crate::render::render_world;

/// Render the moves, spawns and combats of one turn as tab-separated tables.
#[must_use]
pub fn render_turn(record: &TurnRecord) -> String {
    let mut output = String::new();
    render_moves(&mut output, record);
    render_spawns(&mut output, record);
    render_combats(&mut output, record);
    output
}

/// Render the game header, the last completed turn's logs and the board.
#[must_use]
pub fn render_state(state: &GameState, color: bool) -> String {
    let mut output = String::from("Game Status\n");
    output.push_str(&format!("Status: {}\n", state.status.as_str()));
    output.push_str(&format!("Turn: {}/{}\n\n", state.current_turn, state.max_turns));

    let last = state
        .turns
        .range(..=state.current_turn)
        .next_back()
        .map(|(_, record)| record)
        .filter(|record| !record.input_moves.is_empty() || !record.spawn_log.is_empty());
    if let Some(record) = last {
        output.push_str(&format!("Turn {}:\n", record.turn_number));
        output.push_str(&render_turn(record));
        output.push('\n');
    }

    output.push_str("World:\n");
    output.push_str(&render_world(&state.world, color));
    output
}

/// Render a finished (or interrupted) game's summary.
#[must_use]
pub fn render_summary(summary: &GameSummary) -> String {
    let mut output = String::from("=== Game Summary ===\n");
    for (player, name) in &summary.players {
        let units = summary.units.get(player).copied().unwrap_or(0);
        output.push_str(&format!("Player {player} ({name}): {units} units\n"));
    }
    output.push_str(&format!(
        "Turns played: {}/{}\n",
        summary.turns_played, summary.max_turns
    ));
    output.push_str(&format!(
        "Moves: {}  Combats: {}  Spawns: {}\n",
        summary.moves, summary.combats, summary.spawns
    ));
    match summary.end_reason() {
        Some(reason) => output.push_str(&format!("Ended by: {reason}\n")),
        None => output.push_str("Game still in progress\n"),
    }
    if !summary.eliminated.is_empty() {
        let ids: Vec<String> = summary.eliminated.iter().map(ToString::to_string).collect();
        output.push_str(&format!("Eliminated: {}\n", ids.join(", ")));
    }
    output
}

fn render_moves(output: &mut String, record: &TurnRecord) {
    output.push_str("Moves this turn:\n");
    if record.move_log.is_empty() {
        output.push_str("No moves\n");
    } else {
        output.push_str("p_id\tsrc\tdest\tunits\n");
        for m in &record.move_log {
            output.push_str(&format!(
                "{}\t{}\t{}\t{}\n",
                m.player_id, m.source, m.destination, m.unit_count
            ));
        }
    }
    let skipped = record.input_moves.len().saturating_sub(record.move_log.len());
    if skipped > 0 {
        output.push_str(&format!("({skipped} planned moves skipped)\n"));
    }
}

fn render_spawns(output: &mut String, record: &TurnRecord) {
    output.push_str("Spawns this turn:\n");
    if record.spawn_log.is_empty() {
        output.push_str("No spawns\n");
        return;
    }
    output.push_str("p_id\tpos\n");
    for s in &record.spawn_log {
        output.push_str(&format!("{}\t{}\n", s.player_id, s.position));
    }
}

fn render_combats(output: &mut String, record: &TurnRecord) {
    output.push_str("Combats this turn:\n");
    if record.combat_log.is_empty() {
        output.push_str("No combats\n");
        return;
    }
    output.push_str("pos\tp1_cas\tp2_cas\n");
    for c in &record.combat_log {
        output.push_str(&format!(
            "{}\t{}\t{}\n",
            c.position,
            c.player_1_casualties(),
            c.player_2_casualties()
        ));
    }
}
