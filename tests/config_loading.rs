//! Loading configuration files from disk.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use skirmish::config::AgentConfig;
use skirmish::experiment::run_experiment;
use skirmish::{
    BoardShape, ConfigError, ExperimentConfig, ExperimentError, GameConfig, run_game,
};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_game_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "game.yaml",
        "board: {shape: rectangular, width: 7, height: 3}\n\
         max_turns: 4\n\
         seed: 11\n\
         player_one_config: {name: expander, agent: {kind: random, move_chance: 1.0}}\n\
         player_two_config: {name: sitter}\n",
    );

    let config = GameConfig::load(&path).unwrap();
    assert_eq!(
        config.shape(),
        BoardShape::Rectangular {
            width: 7,
            height: 3
        }
    );
    assert_eq!(config.player_two_config.agent, AgentConfig::Idle);

    let end = run_game(&config).unwrap();
    assert!(end.is_game_over());
    assert_eq!(end.world.len(), 21);
}

#[test]
fn test_missing_file_reports_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.yaml");
    match GameConfig::load(&missing) {
        Err(ConfigError::Io { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected an I/O error, got {other:?}"),
    }
}

#[test]
fn test_malformed_yaml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "bad.yaml", "max_turns: [not, a, number]\n");
    assert!(matches!(GameConfig::load(&path), Err(ConfigError::Yaml(_))));
}

#[test]
fn test_experiment_resolves_player_files() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "players/baselines.yaml",
        "player_configs:\n\
         \x20 - {name: idle}\n\
         \x20 - {name: random, agent: {kind: random, seed: 4}}\n",
    );
    let path = write(
        dir.path(),
        "experiments/exp.yaml",
        "experiment_name: baseline\n\
         iterations: 2\n\
         player_config_files: [../players/baselines.yaml]\n\
         player_configs:\n\
         \x20 - {name: inline}\n\
         game: {max_turns: 3, seed: 8}\n",
    );

    let config = ExperimentConfig::load(&path).unwrap();
    let names: Vec<&str> = config.player_configs.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["inline", "idle", "random"]);
    assert_eq!(config.game.max_turns, 3);

    let results = run_experiment(&config, 8, |_| {}).unwrap();
    assert_eq!(results.games, 6);

    let out = results.save(&dir.path().join("results")).unwrap();
    assert!(out.join("inline_vs_idle.yaml").exists());
    assert!(out.join("idle_vs_random.yaml").exists());
    assert!(out.join("summary.json").exists());
}

#[test]
fn test_experiment_with_invalid_player_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "exp.yaml",
        "experiment_name: broken\n\
         player_configs:\n\
         \x20 - {name: bad, agent: {kind: command, program: ''}}\n",
    );
    assert!(matches!(
        ExperimentConfig::load(&path),
        Err(ConfigError::InvalidAgent { .. })
    ));
}

#[test]
fn test_experiment_with_unnamed_players_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "exp.yaml",
        "experiment_name: anonymous\n\
         player_configs:\n\
         \x20 - {agent: {kind: random}}\n\
         \x20 - {agent: {kind: random}}\n\
         \x20 - {agent: {kind: idle}}\n",
    );
    assert!(matches!(
        ExperimentConfig::load(&path),
        Err(ConfigError::DuplicatePlayerName(_))
    ));

    // Bypassing the loader does not bypass the check.
    let config = ExperimentConfig::from_yaml_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(matches!(
        run_experiment(&config, 1, |_| {}),
        Err(ExperimentError::Config(ConfigError::DuplicatePlayerName(_)))
    ));
}
